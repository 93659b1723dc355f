use serde::{Deserialize, Serialize};

/// Weights the finalizer uses to blend survey, battle, and language signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Points per battle win. Large enough that a won battle outweighs a
    /// mild survey lead.
    pub battle_win_weight: f64,
    /// Full bonus for a member with `ok` Japanese support when the user asked
    /// to prioritise Japanese support.
    pub jp_support_bonus: f64,
    /// Full bonus for a member with `ok` Japanese support when the user's
    /// Korean is beginner level or below.
    pub language_gap_bonus: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            battle_win_weight: 10.0,
            jp_support_bonus: 4.0,
            language_gap_bonus: 2.0,
        }
    }
}

impl RankingConfig {
    pub fn validate(&self) -> Result<(), InvalidWeight> {
        for (name, value) in [
            ("battle_win_weight", self.battle_win_weight),
            ("jp_support_bonus", self.jp_support_bonus),
            ("language_gap_bonus", self.language_gap_bonus),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(InvalidWeight { name, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("ranking weight {name} must be a finite, non-negative number (got {value})")]
pub struct InvalidWeight {
    pub name: &'static str,
    pub value: f64,
}
