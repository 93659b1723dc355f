use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::debug;
use oshi_diagnosis::config::AppConfig;
use oshi_diagnosis::diagnosis::{Catalog, DiagnosisEngine, Locale};
use oshi_diagnosis::error::AppError;
use oshi_diagnosis::telemetry;

use crate::play::run_play;
use crate::render::render_catalog;
use crate::replay::{run_replay, ReplayArgs};

#[derive(Parser, Debug)]
#[command(
    name = "oshi-checker",
    about = "Find your K-pop oshi with a short survey and a round of head-to-head picks",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Take the diagnosis interactively on the terminal
    Play(PlayArgs),
    /// Run a scripted session from a JSON file and print the result
    Replay(ReplayArgs),
    /// Validate the catalog files and print a summary
    Catalog(DataArgs),
}

#[derive(Args, Debug, Default, Clone)]
pub(crate) struct DataArgs {
    /// Directory holding members.json, groups.json and questions.json
    /// (defaults to OSHI_DATA_DIR, then ./data)
    #[arg(long)]
    pub(crate) data: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct PlayArgs {
    #[command(flatten)]
    pub(crate) data: DataArgs,
    /// Display language for names and questions (ja, ko, en)
    #[arg(long, default_value = "ja", value_parser = parse_locale)]
    pub(crate) locale: Locale,
}

pub(crate) fn parse_locale(raw: &str) -> Result<Locale, String> {
    Locale::parse(raw).ok_or_else(|| format!("unsupported locale '{raw}' (expected ja, ko or en)"))
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(environment = ?config.environment, "configuration loaded");

    match cli.command {
        Command::Play(args) => {
            let engine = load_engine(&config, &args.data)?;
            run_play(&engine, args.locale)
        }
        Command::Replay(args) => {
            let engine = load_engine(&config, &args.data)?;
            run_replay(&engine, &args)
        }
        Command::Catalog(args) => {
            let catalog = Catalog::from_dir(data_dir(&config, &args))?;
            let stdout = std::io::stdout();
            render_catalog(&mut stdout.lock(), &catalog)?;
            Ok(())
        }
    }
}

fn data_dir(config: &AppConfig, args: &DataArgs) -> PathBuf {
    args.data.clone().unwrap_or_else(|| config.data.dir.clone())
}

fn load_engine(config: &AppConfig, args: &DataArgs) -> Result<DiagnosisEngine, AppError> {
    let catalog = Catalog::from_dir(data_dir(config, args))?;
    Ok(DiagnosisEngine::new(catalog, config.ranking.clone())?)
}
