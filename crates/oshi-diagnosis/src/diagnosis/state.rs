//! The diagnosis session aggregate and the actions that move it forward.
//!
//! [`DiagnosisState::apply`] never mutates its receiver: it returns a new
//! state value or an error, so a rejected action leaves the caller's state
//! untouched.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::battle::{self, BattleError, BattlePairing};
use super::domain::{
    BattleRecord, CandidateMember, KoreanLevel, MemberId, QuestionOption, ScoreMap,
    CANDIDATE_COUNT,
};
use super::scoring::{self, ScoringError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisPhase {
    SurveyInProgress,
    CandidatesSelected,
    BattleInProgress,
    ResultReady,
}

impl DiagnosisPhase {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SurveyInProgress => "survey in progress",
            Self::CandidatesSelected => "candidates selected",
            Self::BattleInProgress => "battle in progress",
            Self::ResultReady => "result ready",
        }
    }
}

impl fmt::Display for DiagnosisPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosisAction {
    AnswerQuestion { option: QuestionOption },
    AnswerMulti { options: Vec<QuestionOption> },
    AnswerKoreanLevel { level: KoreanLevel },
    SetKoreanLevel { level: KoreanLevel },
    SetPreferJpSupport { value: bool },
    SetCandidates { candidates: Vec<CandidateMember> },
    RecordBattle { record: BattleRecord },
    SetFinalRanking { ranking: Vec<CandidateMember> },
    Reset,
}

impl DiagnosisAction {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AnswerQuestion { .. } => "ANSWER_QUESTION",
            Self::AnswerMulti { .. } => "ANSWER_MULTI",
            Self::AnswerKoreanLevel { .. } => "ANSWER_KOREAN_LEVEL",
            Self::SetKoreanLevel { .. } => "SET_KOREAN_LEVEL",
            Self::SetPreferJpSupport { .. } => "SET_PREFER_JP_SUPPORT",
            Self::SetCandidates { .. } => "SET_CANDIDATES",
            Self::RecordBattle { .. } => "RECORD_BATTLE",
            Self::SetFinalRanking { .. } => "SET_FINAL_RANKING",
            Self::Reset => "RESET",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DiagnosisError {
    #[error("{action} is not allowed while {phase}")]
    InvalidPhase {
        action: &'static str,
        phase: DiagnosisPhase,
    },
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Battle(#[from] BattleError),
    #[error("expected {expected} candidates, got {actual}")]
    CandidateCount { expected: usize, actual: usize },
    #[error("candidate '{0}' is listed more than once")]
    DuplicateCandidate(MemberId),
    #[error("candidate '{0}' already carries battle or ranking results")]
    CandidateNotFresh(MemberId),
    #[error("final ranking must contain exactly the current candidates")]
    RankingMismatch,
    #[error("candidate '{0}' has no final score")]
    Unscored(MemberId),
    #[error("only {recorded} battle rounds recorded; the ranking needs all of them")]
    BattleIncomplete { recorded: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisState {
    pub current_question_index: usize,
    pub survey_scores: ScoreMap,
    pub cover_scores: ScoreMap,
    pub korean_level: KoreanLevel,
    pub prefer_japanese_support: bool,
    pub candidates: Vec<CandidateMember>,
    pub battle_records: Vec<BattleRecord>,
    pub current_battle_round: usize,
    pub final_ranking: Vec<CandidateMember>,
}

impl Default for DiagnosisState {
    fn default() -> Self {
        Self {
            current_question_index: 0,
            survey_scores: ScoreMap::new(),
            cover_scores: ScoreMap::new(),
            korean_level: KoreanLevel::default(),
            prefer_japanese_support: false,
            candidates: Vec::new(),
            battle_records: Vec::new(),
            current_battle_round: 0,
            final_ranking: Vec::new(),
        }
    }
}

impl DiagnosisState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DiagnosisPhase {
        if !self.final_ranking.is_empty() {
            DiagnosisPhase::ResultReady
        } else if self.candidates.is_empty() {
            DiagnosisPhase::SurveyInProgress
        } else if self.battle_records.is_empty() {
            DiagnosisPhase::CandidatesSelected
        } else {
            DiagnosisPhase::BattleInProgress
        }
    }

    pub fn is_battle_complete(&self) -> bool {
        !self.candidates.is_empty() && battle::is_complete(&self.battle_records)
    }

    /// The pairing the next `RecordBattle` must use, if any rounds remain.
    pub fn next_battle(&self) -> Option<BattlePairing> {
        match self.phase() {
            DiagnosisPhase::CandidatesSelected | DiagnosisPhase::BattleInProgress => {
                battle::next_pairing(&self.candidates, &self.battle_records)
            }
            DiagnosisPhase::SurveyInProgress | DiagnosisPhase::ResultReady => None,
        }
    }

    pub fn candidate(&self, id: &MemberId) -> Option<&CandidateMember> {
        self.candidates.iter().find(|candidate| candidate.id() == id)
    }

    /// Produce the state that results from `action`.
    ///
    /// Answers advance `current_question_index` without an upper bound: the
    /// state holds no catalog, so [`DiagnosisEngine::answer`] is what stops a
    /// session from answering past the last question.
    ///
    /// [`DiagnosisEngine::answer`]: super::engine::DiagnosisEngine::answer
    pub fn apply(&self, action: DiagnosisAction) -> Result<DiagnosisState, DiagnosisError> {
        let phase = self.phase();
        let name = action.name();
        let mut next = self.clone();

        match action {
            DiagnosisAction::AnswerQuestion { option } => {
                self.require(name, &[DiagnosisPhase::SurveyInProgress])?;
                next.survey_scores = scoring::score_option(&option, &self.survey_scores)?;
                next.cover_scores =
                    scoring::cover_increments(std::slice::from_ref(&option), &self.cover_scores);
                next.current_question_index += 1;
            }
            DiagnosisAction::AnswerMulti { options } => {
                self.require(name, &[DiagnosisPhase::SurveyInProgress])?;
                next.survey_scores = scoring::score_options(&options, &self.survey_scores)?;
                next.cover_scores = scoring::cover_increments(&options, &self.cover_scores);
                next.current_question_index += 1;
            }
            DiagnosisAction::AnswerKoreanLevel { level } => {
                self.require(name, &[DiagnosisPhase::SurveyInProgress])?;
                next.korean_level = level;
                next.current_question_index += 1;
            }
            DiagnosisAction::SetKoreanLevel { level } => {
                self.reject_result(name)?;
                next.korean_level = level;
            }
            DiagnosisAction::SetPreferJpSupport { value } => {
                self.reject_result(name)?;
                next.prefer_japanese_support = value;
            }
            DiagnosisAction::SetCandidates { candidates } => {
                self.require(name, &[DiagnosisPhase::SurveyInProgress])?;
                validate_candidates(&candidates)?;
                next.candidates = candidates;
                next.battle_records.clear();
                next.current_battle_round = 1;
            }
            DiagnosisAction::RecordBattle { record } => {
                self.require(
                    name,
                    &[
                        DiagnosisPhase::CandidatesSelected,
                        DiagnosisPhase::BattleInProgress,
                    ],
                )?;
                battle::record_round(&mut next.candidates, &mut next.battle_records, record)?;
                next.current_battle_round = next.battle_records.len() + 1;
            }
            DiagnosisAction::SetFinalRanking { ranking } => {
                self.require(
                    name,
                    &[
                        DiagnosisPhase::CandidatesSelected,
                        DiagnosisPhase::BattleInProgress,
                    ],
                )?;
                if !self.is_battle_complete() {
                    return Err(DiagnosisError::BattleIncomplete {
                        recorded: self.battle_records.len(),
                    });
                }
                validate_ranking(&self.candidates, &ranking)?;
                next.final_ranking = ranking;
            }
            DiagnosisAction::Reset => {
                next = DiagnosisState::default();
            }
        }

        debug!(
            action = name,
            from = phase.label(),
            to = next.phase().label(),
            "diagnosis action applied"
        );
        if next.phase() != phase {
            info!(from = phase.label(), to = next.phase().label(), "diagnosis phase changed");
        }

        Ok(next)
    }

    fn require(
        &self,
        action: &'static str,
        allowed: &[DiagnosisPhase],
    ) -> Result<(), DiagnosisError> {
        let phase = self.phase();
        if allowed.contains(&phase) {
            Ok(())
        } else {
            Err(DiagnosisError::InvalidPhase { action, phase })
        }
    }

    fn reject_result(&self, action: &'static str) -> Result<(), DiagnosisError> {
        self.require(
            action,
            &[
                DiagnosisPhase::SurveyInProgress,
                DiagnosisPhase::CandidatesSelected,
                DiagnosisPhase::BattleInProgress,
            ],
        )
    }
}

fn validate_candidates(candidates: &[CandidateMember]) -> Result<(), DiagnosisError> {
    if candidates.len() != CANDIDATE_COUNT {
        return Err(DiagnosisError::CandidateCount {
            expected: CANDIDATE_COUNT,
            actual: candidates.len(),
        });
    }

    let mut seen = HashSet::with_capacity(candidates.len());
    for candidate in candidates {
        if !seen.insert(candidate.id()) {
            return Err(DiagnosisError::DuplicateCandidate(candidate.id().clone()));
        }
        let fresh = candidate.appearance_count == 0
            && candidate.win_count == 0
            && candidate.preference_score.is_none()
            && candidate.language_bonus.is_none()
            && candidate.final_score.is_none();
        if !fresh {
            return Err(DiagnosisError::CandidateNotFresh(candidate.id().clone()));
        }
    }

    Ok(())
}

fn validate_ranking(
    candidates: &[CandidateMember],
    ranking: &[CandidateMember],
) -> Result<(), DiagnosisError> {
    if ranking.len() != candidates.len() {
        return Err(DiagnosisError::RankingMismatch);
    }

    let expected: HashMap<&MemberId, &CandidateMember> = candidates
        .iter()
        .map(|candidate| (candidate.id(), candidate))
        .collect();
    let mut seen = HashSet::with_capacity(ranking.len());
    for entry in ranking {
        let candidate = expected
            .get(entry.id())
            .ok_or(DiagnosisError::RankingMismatch)?;
        if !seen.insert(entry.id()) {
            return Err(DiagnosisError::RankingMismatch);
        }
        // Tallies must match the recorded battles.
        if entry.win_count != candidate.win_count
            || entry.appearance_count != candidate.appearance_count
            || entry.survey_score.to_bits() != candidate.survey_score.to_bits()
        {
            return Err(DiagnosisError::RankingMismatch);
        }
        if entry.final_score.is_none() {
            return Err(DiagnosisError::Unscored(entry.id().clone()));
        }
    }

    let ordered = ranking
        .windows(2)
        .all(|pair| pair[0].final_score >= pair[1].final_score);
    if !ordered {
        return Err(DiagnosisError::RankingMismatch);
    }

    Ok(())
}
