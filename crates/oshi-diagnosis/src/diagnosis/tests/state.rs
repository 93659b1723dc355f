use proptest::prelude::*;

use super::common::*;
use crate::diagnosis::domain::{KoreanLevel, MemberId, QuestionOption, CANDIDATE_COUNT};
use crate::diagnosis::ranking::{finalize, RankingConfig};
use crate::diagnosis::scoring::ScoringError;
use crate::diagnosis::state::{DiagnosisAction, DiagnosisError, DiagnosisPhase, DiagnosisState};

fn finished_battles() -> DiagnosisState {
    play_battles(state_with_candidates(), |a, _| a.clone())
}

fn ranked(state: &DiagnosisState) -> DiagnosisState {
    let ranking = finalize(
        &state.candidates,
        state.korean_level,
        state.prefer_japanese_support,
        &RankingConfig::default(),
    );
    state
        .apply(DiagnosisAction::SetFinalRanking { ranking })
        .expect("ranking installs")
}

#[test]
fn initial_state_is_empty_survey() {
    let state = DiagnosisState::new();
    assert_eq!(state.phase(), DiagnosisPhase::SurveyInProgress);
    assert_eq!(state.current_question_index, 0);
    assert!(state.candidates.is_empty());
    assert!(state.final_ranking.is_empty());
    assert_eq!(state.korean_level, KoreanLevel::None);
    assert!(!state.prefer_japanese_support);
}

#[test]
fn answers_accumulate_and_advance() {
    let state = DiagnosisState::new()
        .apply(DiagnosisAction::AnswerQuestion {
            option: keyed_option("a", "cute", Some(3.0)),
        })
        .and_then(|state| {
            state.apply(DiagnosisAction::AnswerMulti {
                options: vec![
                    keyed_option("d", "cute", None),
                    keyed_option("x", "cool", Some(2.0)),
                ],
            })
        })
        .and_then(|state| state.apply(DiagnosisAction::AnswerKoreanLevel {
            level: KoreanLevel::Beginner,
        }))
        .expect("survey answers apply");

    assert_eq!(state.current_question_index, 3);
    assert_eq!(state.survey_scores.get("cute"), 4.0);
    assert_eq!(state.survey_scores.get("cool"), 2.0);
    assert_eq!(state.korean_level, KoreanLevel::Beginner);
}

#[test]
fn failed_answer_leaves_state_unchanged() {
    let state = DiagnosisState::new()
        .apply(DiagnosisAction::AnswerQuestion {
            option: keyed_option("a", "cute", None),
        })
        .expect("first answer");
    let blank = QuestionOption {
        id: Some("blank".to_string()),
        text: "blank".to_string(),
        ..QuestionOption::default()
    };

    let result = state.apply(DiagnosisAction::AnswerMulti {
        options: vec![keyed_option("b", "cool", None), blank],
    });

    assert_eq!(
        result,
        Err(DiagnosisError::Scoring(ScoringError::MissingScoreMapping(
            "blank".to_string()
        )))
    );
    assert_eq!(state.current_question_index, 1);
    assert_eq!(state.survey_scores.get("cool"), 0.0);
}

#[test]
fn battle_before_candidates_is_rejected() {
    let state = DiagnosisState::new();
    let pairing_record = crate::diagnosis::domain::BattleRecord {
        round: 1,
        member_a: MemberId::new("m01"),
        member_b: MemberId::new("m02"),
        winner_id: MemberId::new("m01"),
    };

    let result = state.apply(DiagnosisAction::RecordBattle {
        record: pairing_record,
    });

    assert_eq!(
        result,
        Err(DiagnosisError::InvalidPhase {
            action: "RECORD_BATTLE",
            phase: DiagnosisPhase::SurveyInProgress,
        })
    );
}

#[test]
fn candidates_move_the_session_to_battles() {
    let state = state_with_candidates();
    assert_eq!(state.phase(), DiagnosisPhase::CandidatesSelected);
    assert_eq!(state.candidates.len(), CANDIDATE_COUNT);
    assert_eq!(state.current_battle_round, 1);

    let answer = state.apply(DiagnosisAction::AnswerQuestion {
        option: keyed_option("a", "cute", None),
    });
    assert!(matches!(
        answer,
        Err(DiagnosisError::InvalidPhase {
            action: "ANSWER_QUESTION",
            ..
        })
    ));

    let again = state.apply(DiagnosisAction::SetCandidates {
        candidates: candidates(),
    });
    assert!(matches!(again, Err(DiagnosisError::InvalidPhase { .. })));
}

#[test]
fn shortlist_size_and_uniqueness_are_enforced() {
    let mut short = candidates();
    short.pop();
    assert_eq!(
        DiagnosisState::new().apply(DiagnosisAction::SetCandidates { candidates: short }),
        Err(DiagnosisError::CandidateCount {
            expected: CANDIDATE_COUNT,
            actual: CANDIDATE_COUNT - 1,
        })
    );

    let mut duplicated = candidates();
    duplicated[7] = duplicated[0].clone();
    assert_eq!(
        DiagnosisState::new().apply(DiagnosisAction::SetCandidates {
            candidates: duplicated,
        }),
        Err(DiagnosisError::DuplicateCandidate(MemberId::new("m01")))
    );
}

#[test]
fn shortlist_must_not_carry_results() {
    let mut played = candidates();
    played[0].win_count = 5;
    assert_eq!(
        DiagnosisState::new().apply(DiagnosisAction::SetCandidates { candidates: played }),
        Err(DiagnosisError::CandidateNotFresh(MemberId::new("m01")))
    );

    let mut appeared = candidates();
    appeared[3].appearance_count = 1;
    assert!(matches!(
        DiagnosisState::new().apply(DiagnosisAction::SetCandidates {
            candidates: appeared,
        }),
        Err(DiagnosisError::CandidateNotFresh(_))
    ));

    let mut scored = candidates();
    scored[7].final_score = Some(12.0);
    assert!(matches!(
        DiagnosisState::new().apply(DiagnosisAction::SetCandidates { candidates: scored }),
        Err(DiagnosisError::CandidateNotFresh(_))
    ));
}

#[test]
fn ranking_requires_completed_battles() {
    let state = state_with_candidates();
    let ranking = finalize(
        &state.candidates,
        KoreanLevel::None,
        false,
        &RankingConfig::default(),
    );

    assert_eq!(
        state.apply(DiagnosisAction::SetFinalRanking { ranking }),
        Err(DiagnosisError::BattleIncomplete { recorded: 0 })
    );
}

#[test]
fn ranking_must_match_the_shortlist() {
    let state = finished_battles();
    let mut ranking = finalize(
        &state.candidates,
        KoreanLevel::None,
        false,
        &RankingConfig::default(),
    );
    ranking[7] = ranking[0].clone();
    assert_eq!(
        state.apply(DiagnosisAction::SetFinalRanking { ranking }),
        Err(DiagnosisError::RankingMismatch)
    );

    assert_eq!(
        state.apply(DiagnosisAction::SetFinalRanking {
            ranking: state.candidates.clone(),
        }),
        Err(DiagnosisError::Unscored(state.candidates[0].member.id.clone()))
    );

    let ranking = finalize(
        &state.candidates,
        KoreanLevel::None,
        false,
        &RankingConfig::default(),
    );

    let mut reversed = ranking.clone();
    reversed.reverse();
    assert_eq!(
        state.apply(DiagnosisAction::SetFinalRanking { ranking: reversed }),
        Err(DiagnosisError::RankingMismatch)
    );

    let mut edited = ranking.clone();
    let winner = edited
        .iter_mut()
        .find(|entry| entry.win_count > 0)
        .expect("someone won a battle");
    winner.win_count = 0;
    assert_eq!(
        state.apply(DiagnosisAction::SetFinalRanking { ranking: edited }),
        Err(DiagnosisError::RankingMismatch)
    );

    let mut inflated = ranking;
    inflated[4].survey_score += 1.0;
    assert_eq!(
        state.apply(DiagnosisAction::SetFinalRanking { ranking: inflated }),
        Err(DiagnosisError::RankingMismatch)
    );
}

#[test]
fn result_ready_freezes_everything_but_reset() {
    let state = ranked(&finished_battles());
    assert_eq!(state.phase(), DiagnosisPhase::ResultReady);
    assert_eq!(state.final_ranking.len(), CANDIDATE_COUNT);
    assert!(state.next_battle().is_none());

    for action in [
        DiagnosisAction::SetKoreanLevel {
            level: KoreanLevel::Native,
        },
        DiagnosisAction::SetPreferJpSupport { value: true },
        DiagnosisAction::SetFinalRanking {
            ranking: state.final_ranking.clone(),
        },
    ] {
        assert!(matches!(
            state.apply(action),
            Err(DiagnosisError::InvalidPhase {
                phase: DiagnosisPhase::ResultReady,
                ..
            })
        ));
    }

    let reset = state.apply(DiagnosisAction::Reset).expect("reset always applies");
    assert_eq!(reset, DiagnosisState::default());
}

#[test]
fn language_inputs_can_change_during_battles() {
    let state = state_with_candidates()
        .apply(DiagnosisAction::SetPreferJpSupport { value: true })
        .and_then(|state| {
            state.apply(DiagnosisAction::SetKoreanLevel {
                level: KoreanLevel::Intermediate,
            })
        })
        .expect("language inputs apply");

    assert!(state.prefer_japanese_support);
    assert_eq!(state.korean_level, KoreanLevel::Intermediate);
    assert_eq!(state.phase(), DiagnosisPhase::CandidatesSelected);
}

fn session_prefix(steps: usize) -> DiagnosisState {
    let mut state = DiagnosisState::new()
        .apply(DiagnosisAction::SetPreferJpSupport { value: true })
        .expect("toggle applies");
    if steps == 0 {
        return state;
    }
    state = state
        .apply(DiagnosisAction::AnswerQuestion {
            option: keyed_option("a", "cute", Some(2.0)),
        })
        .expect("answer applies");
    if steps == 1 {
        return state;
    }
    state = state
        .apply(DiagnosisAction::SetCandidates {
            candidates: candidates(),
        })
        .expect("candidates apply");
    if steps == 2 {
        return state;
    }
    state = play_battles(state, |_, b| b.clone());
    if steps == 3 {
        return state;
    }
    ranked(&state)
}

proptest! {
    /// Property: reset returns the exact initial state from any phase, and
    /// resetting twice changes nothing.
    #[test]
    fn reset_is_total_and_idempotent(steps in 0usize..5) {
        let state = session_prefix(steps);
        let once = state.apply(DiagnosisAction::Reset).expect("reset applies");
        let twice = once.apply(DiagnosisAction::Reset).expect("reset applies");

        prop_assert_eq!(&once, &DiagnosisState::default());
        prop_assert_eq!(once, twice);
    }
}
