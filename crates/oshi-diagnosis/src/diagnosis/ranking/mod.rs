mod config;
mod rules;

pub use config::{InvalidWeight, RankingConfig};

use std::cmp::Ordering;

use tracing::info;

use super::domain::{CandidateMember, KoreanLevel};

/// Score every candidate and order them into the final ranking.
///
/// The output is a permutation of the input. Ties on final score fall back to
/// wins, then survey affinity, then catalog order.
pub fn finalize(
    candidates: &[CandidateMember],
    korean_level: KoreanLevel,
    prefer_jp_support: bool,
    config: &RankingConfig,
) -> Vec<CandidateMember> {
    let mut ranking: Vec<CandidateMember> = candidates
        .iter()
        .cloned()
        .map(|mut candidate| {
            let preference = rules::preference_score(&candidate, config);
            let bonus = rules::language_bonus(&candidate, korean_level, prefer_jp_support, config);
            candidate.preference_score = Some(preference);
            candidate.language_bonus = Some(bonus);
            candidate.final_score = Some(preference + bonus);
            candidate
        })
        .collect();

    ranking.sort_by(compare_ranked);

    if let Some(winner) = ranking.first() {
        info!(
            winner = %winner.member.id,
            final_score = winner.final_score.unwrap_or_default(),
            korean_level = korean_level.label(),
            prefer_jp_support,
            "final ranking computed"
        );
    }

    ranking
}

fn compare_ranked(a: &CandidateMember, b: &CandidateMember) -> Ordering {
    let score_a = a.final_score.unwrap_or(f64::NEG_INFINITY);
    let score_b = b.final_score.unwrap_or(f64::NEG_INFINITY);

    score_b
        .total_cmp(&score_a)
        .then_with(|| b.win_count.cmp(&a.win_count))
        .then_with(|| b.survey_score.total_cmp(&a.survey_score))
        .then_with(|| a.catalog_index.cmp(&b.catalog_index))
}
