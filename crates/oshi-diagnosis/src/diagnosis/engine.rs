use tracing::info;

use super::battle::BattlePairing;
use super::catalog::Catalog;
use super::cover::apply_cover_scores;
use super::domain::{KoreanLevel, Locale, MemberId, Question, QuestionKind, CANDIDATE_COUNT};
use super::ranking::{self, InvalidWeight, RankingConfig};
use super::report::DiagnosisReport;
use super::selector::{self, SelectionError};
use super::state::{DiagnosisAction, DiagnosisError, DiagnosisPhase, DiagnosisState};

/// Stateless driver that validates caller input against the catalog and
/// turns it into state-machine actions.
#[derive(Debug, Clone)]
pub struct DiagnosisEngine {
    catalog: Catalog,
    config: RankingConfig,
}

impl DiagnosisEngine {
    pub fn new(catalog: Catalog, config: RankingConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { catalog, config })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    pub fn start(&self) -> DiagnosisState {
        DiagnosisState::default()
    }

    pub fn reset(&self, state: &DiagnosisState) -> Result<DiagnosisState, EngineError> {
        Ok(state.apply(DiagnosisAction::Reset)?)
    }

    /// The question awaiting an answer, or `None` once the survey is done.
    pub fn current_question<'a>(&'a self, state: &DiagnosisState) -> Option<&'a Question> {
        if state.phase() != DiagnosisPhase::SurveyInProgress {
            return None;
        }
        self.catalog.question(state.current_question_index)
    }

    pub fn survey_complete(&self, state: &DiagnosisState) -> bool {
        state.current_question_index >= self.catalog.questions().len()
    }

    /// Answer the current question with the given option ids.
    pub fn answer(
        &self,
        state: &DiagnosisState,
        option_ids: &[&str],
    ) -> Result<DiagnosisState, EngineError> {
        let question = self
            .current_question(state)
            .ok_or(EngineError::NoPendingQuestion)?;

        let (min, max) = question.selection_bounds();
        if option_ids.len() < min || option_ids.len() > max {
            return Err(EngineError::SelectionCount {
                question: question.id.clone(),
                min,
                max,
                actual: option_ids.len(),
            });
        }

        let mut chosen = Vec::with_capacity(option_ids.len());
        for id in option_ids {
            let option = question
                .option(id)
                .ok_or_else(|| EngineError::UnknownOption {
                    question: question.id.clone(),
                    option: id.to_string(),
                })?;
            if chosen.contains(&option) {
                return Err(EngineError::RepeatedOption {
                    question: question.id.clone(),
                    option: id.to_string(),
                });
            }
            chosen.push(option);
        }

        let action = match question.kind {
            QuestionKind::Single => DiagnosisAction::AnswerQuestion {
                option: chosen[0].clone(),
            },
            QuestionKind::Multi => DiagnosisAction::AnswerMulti {
                options: chosen.into_iter().cloned().collect(),
            },
            QuestionKind::KoreanLevel => DiagnosisAction::AnswerKoreanLevel {
                level: chosen[0].korean_level.unwrap_or_default(),
            },
        };

        Ok(state.apply(action)?)
    }

    pub fn set_korean_level(
        &self,
        state: &DiagnosisState,
        level: KoreanLevel,
    ) -> Result<DiagnosisState, EngineError> {
        Ok(state.apply(DiagnosisAction::SetKoreanLevel { level })?)
    }

    pub fn set_prefer_jp_support(
        &self,
        state: &DiagnosisState,
        value: bool,
    ) -> Result<DiagnosisState, EngineError> {
        Ok(state.apply(DiagnosisAction::SetPreferJpSupport { value })?)
    }

    /// Shortlist candidates once every question has been answered.
    pub fn select_candidates(&self, state: &DiagnosisState) -> Result<DiagnosisState, EngineError> {
        if !self.survey_complete(state) {
            return Err(EngineError::SurveyIncomplete {
                answered: state.current_question_index,
                total: self.catalog.questions().len(),
            });
        }

        let mut candidates = selector::select_candidates(
            self.catalog.members(),
            &state.survey_scores,
            CANDIDATE_COUNT,
        )?;
        apply_cover_scores(&mut candidates, &state.cover_scores);

        Ok(state.apply(DiagnosisAction::SetCandidates { candidates })?)
    }

    pub fn next_battle(&self, state: &DiagnosisState) -> Option<BattlePairing> {
        state.next_battle()
    }

    /// Record the user's pick for the pending pairing.
    pub fn pick(
        &self,
        state: &DiagnosisState,
        winner_id: &MemberId,
    ) -> Result<DiagnosisState, EngineError> {
        let pairing = state.next_battle().ok_or(EngineError::NoPendingBattle)?;
        let record = pairing.record(winner_id.clone());
        Ok(state.apply(DiagnosisAction::RecordBattle { record })?)
    }

    /// Rank the candidates and move the session to its result.
    pub fn finalize(&self, state: &DiagnosisState) -> Result<DiagnosisState, EngineError> {
        let ranking = ranking::finalize(
            &state.candidates,
            state.korean_level,
            state.prefer_japanese_support,
            &self.config,
        );
        let next = state.apply(DiagnosisAction::SetFinalRanking { ranking })?;
        info!(
            candidates = next.final_ranking.len(),
            battles = next.battle_records.len(),
            "diagnosis finalized"
        );
        Ok(next)
    }

    pub fn report(
        &self,
        state: &DiagnosisState,
        locale: Locale,
    ) -> Result<DiagnosisReport, EngineError> {
        if state.phase() != DiagnosisPhase::ResultReady {
            return Err(EngineError::ResultNotReady(state.phase()));
        }
        Ok(DiagnosisReport::build(state, &self.catalog, locale))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Diagnosis(#[from] DiagnosisError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Config(#[from] InvalidWeight),
    #[error("no survey question is awaiting an answer")]
    NoPendingQuestion,
    #[error("question '{question}' needs between {min} and {max} selections, got {actual}")]
    SelectionCount {
        question: String,
        min: usize,
        max: usize,
        actual: usize,
    },
    #[error("question '{question}' has no option '{option}'")]
    UnknownOption { question: String, option: String },
    #[error("option '{option}' was selected more than once for question '{question}'")]
    RepeatedOption { question: String, option: String },
    #[error("survey incomplete: {answered} of {total} questions answered")]
    SurveyIncomplete { answered: usize, total: usize },
    #[error("no battle is pending")]
    NoPendingBattle,
    #[error("result is not ready while {0}")]
    ResultNotReady(DiagnosisPhase),
}
