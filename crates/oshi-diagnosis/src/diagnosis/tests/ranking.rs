use std::collections::HashSet;

use super::common::*;
use crate::diagnosis::domain::{CandidateMember, JpSupportLevel, KoreanLevel};
use crate::diagnosis::ranking::{finalize, RankingConfig};

fn equal_survey_candidates() -> Vec<CandidateMember> {
    member_pool()
        .into_iter()
        .take(8)
        .enumerate()
        .map(|(index, member)| CandidateMember::new(member, index, 10.0))
        .collect()
}

#[test]
fn unbeaten_candidate_outranks_winless_peers() {
    let mut shortlist = equal_survey_candidates();
    shortlist[5].appearance_count = 3;
    shortlist[5].win_count = 3;
    for candidate in shortlist.iter_mut().take(4) {
        candidate.appearance_count = 2;
    }

    let ranking = finalize(
        &shortlist,
        KoreanLevel::Native,
        false,
        &RankingConfig::default(),
    );

    let leader = &ranking[0];
    assert_eq!(leader.member.id.as_str(), "m06");
    for other in ranking.iter().filter(|c| c.win_count == 0) {
        assert!(leader.final_score > other.final_score);
    }
}

#[test]
fn scores_combine_survey_wins_and_covers() {
    let mut shortlist = equal_survey_candidates();
    shortlist[0].win_count = 2;
    shortlist[0].appearance_count = 3;
    shortlist[0].q2_artist_score = Some(1.5);

    let ranking = finalize(
        &shortlist,
        KoreanLevel::Advanced,
        false,
        &RankingConfig::default(),
    );

    let first = &ranking[0];
    assert_eq!(first.member.id.as_str(), "m01");
    assert_eq!(first.preference_score, Some(10.0 + 2.0 * 10.0 + 1.5));
    assert_eq!(first.language_bonus, Some(0.0));
    assert_eq!(first.final_score, Some(31.5));
}

#[test]
fn language_bonus_follows_support_level_and_user_inputs() {
    let config = RankingConfig::default();
    let mut shortlist = equal_survey_candidates();
    shortlist[0].member.jp_support = JpSupportLevel::Ok;
    shortlist[1].member.jp_support = JpSupportLevel::Some;
    shortlist[2].member.jp_support = JpSupportLevel::No;

    let bonus_of = |ranking: &[CandidateMember], id: &str| {
        ranking
            .iter()
            .find(|c| c.member.id.as_str() == id)
            .and_then(|c| c.language_bonus)
            .expect("bonus computed")
    };

    let both = finalize(&shortlist, KoreanLevel::None, true, &config);
    assert_eq!(bonus_of(&both, "m01"), 6.0);
    assert_eq!(bonus_of(&both, "m02"), 3.0);
    assert_eq!(bonus_of(&both, "m03"), 0.0);

    let prefer_only = finalize(&shortlist, KoreanLevel::Native, true, &config);
    assert_eq!(bonus_of(&prefer_only, "m01"), 4.0);

    let gap_only = finalize(&shortlist, KoreanLevel::Beginner, false, &config);
    assert_eq!(bonus_of(&gap_only, "m01"), 2.0);
    assert_eq!(bonus_of(&gap_only, "m02"), 1.0);

    let neither = finalize(&shortlist, KoreanLevel::Intermediate, false, &config);
    assert!(neither.iter().all(|c| c.language_bonus == Some(0.0)));
}

#[test]
fn ties_fall_back_to_wins_then_survey_then_catalog_order() {
    let config = RankingConfig {
        battle_win_weight: 0.0,
        ..RankingConfig::default()
    };
    let mut shortlist = equal_survey_candidates();
    shortlist[7].win_count = 1;
    shortlist[7].appearance_count = 1;

    let ranking = finalize(&shortlist, KoreanLevel::Native, false, &config);
    let order: Vec<&str> = ranking.iter().map(|c| c.member.id.as_str()).collect();

    assert_eq!(
        order,
        vec!["m08", "m01", "m02", "m03", "m04", "m05", "m06", "m07"]
    );
}

#[test]
fn played_session_ranking_is_sorted_permutation() {
    let state = play_battles(state_with_candidates(), |a, _| a.clone());
    let ranking = finalize(
        &state.candidates,
        KoreanLevel::None,
        true,
        &RankingConfig::default(),
    );

    assert_eq!(ranking.len(), state.candidates.len());
    let ranked: HashSet<&str> = ranking.iter().map(|c| c.member.id.as_str()).collect();
    let shortlisted: HashSet<&str> = state.candidates.iter().map(|c| c.member.id.as_str()).collect();
    assert_eq!(ranked, shortlisted);

    for pair in ranking.windows(2) {
        assert!(pair[0].final_score >= pair[1].final_score);
    }
}

#[test]
fn default_weights_validate_and_negative_weights_do_not() {
    assert!(RankingConfig::default().validate().is_ok());
    let bad = RankingConfig {
        jp_support_bonus: -1.0,
        ..RankingConfig::default()
    };
    let err = bad.validate().expect_err("negative bonus rejected");
    assert_eq!(err.name, "jp_support_bonus");
}
