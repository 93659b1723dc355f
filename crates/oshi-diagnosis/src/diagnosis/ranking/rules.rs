use super::super::domain::{CandidateMember, KoreanLevel};
use super::config::RankingConfig;

pub(crate) fn preference_score(candidate: &CandidateMember, config: &RankingConfig) -> f64 {
    candidate.survey_score
        + f64::from(candidate.win_count) * config.battle_win_weight
        + candidate.q2_artist_score.unwrap_or(0.0)
}

pub(crate) fn language_bonus(
    candidate: &CandidateMember,
    korean_level: KoreanLevel,
    prefer_jp_support: bool,
    config: &RankingConfig,
) -> f64 {
    let factor = candidate.member.jp_support.bonus_factor();
    let mut bonus = 0.0;

    if prefer_jp_support {
        bonus += config.jp_support_bonus * factor;
    }
    if korean_level.is_low() {
        bonus += config.language_gap_bonus * factor;
    }

    bonus
}
