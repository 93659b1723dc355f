use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::diagnosis::RankingConfig;

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    /// Log level used when `OSHI_LOG_LEVEL` is unset.
    pub const fn default_log_level(self) -> &'static str {
        match self {
            Self::Development => "info",
            Self::Test | Self::Production => "warn",
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub data: DataConfig,
    pub ranking: RankingConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("OSHI_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let data_dir = env::var("OSHI_DATA_DIR").unwrap_or_else(|_| "data".to_string());
        let log_level = env::var("OSHI_LOG_LEVEL")
            .unwrap_or_else(|_| environment.default_log_level().to_string());

        let defaults = RankingConfig::default();
        let ranking = RankingConfig {
            battle_win_weight: env_f64("OSHI_BATTLE_WIN_WEIGHT", defaults.battle_win_weight)?,
            jp_support_bonus: env_f64("OSHI_JP_SUPPORT_BONUS", defaults.jp_support_bonus)?,
            language_gap_bonus: env_f64("OSHI_LANGUAGE_GAP_BONUS", defaults.language_gap_bonus)?,
        };
        ranking
            .validate()
            .map_err(|err| ConfigError::InvalidWeight {
                name: err.name,
                value: err.value,
            })?;

        Ok(Self {
            environment,
            data: DataConfig {
                dir: PathBuf::from(data_dir),
            },
            ranking,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn env_f64(key: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse::<f64>().map_err(|_| ConfigError::InvalidNumber {
            key,
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

/// Where the catalog JSON files live.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub dir: PathBuf,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { key: &'static str, value: String },
    InvalidWeight { name: &'static str, value: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a number (got '{value}')")
            }
            ConfigError::InvalidWeight { name, value } => {
                write!(f, "{name} must be finite and non-negative (got {value})")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
