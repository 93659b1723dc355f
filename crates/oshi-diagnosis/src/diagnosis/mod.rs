//! Survey, battle, and ranking pipeline behind the oshi diagnosis.

pub mod battle;
pub mod catalog;
pub mod cover;
pub mod domain;
pub mod engine;
pub mod ranking;
pub mod report;
pub mod scoring;
pub mod selector;
pub mod state;

#[cfg(test)]
mod tests;

pub use battle::{BattleError, BattlePairing};
pub use catalog::{Catalog, CatalogError};
pub use domain::{
    BattleRecord, CandidateMember, CoverContribution, Group, GroupId, JpSupportLevel,
    KoreanLevel, Locale, Member, MemberId, Question, QuestionKind, QuestionOption, ScoreMap,
    BATTLE_ROUNDS, CANDIDATE_COUNT, RESULT_COUNT,
};
pub use engine::{DiagnosisEngine, EngineError};
pub use ranking::RankingConfig;
pub use report::{DiagnosisReport, RankedMemberView};
pub use scoring::ScoringError;
pub use selector::SelectionError;
pub use state::{DiagnosisAction, DiagnosisError, DiagnosisPhase, DiagnosisState};
