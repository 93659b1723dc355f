use super::domain::{CandidateMember, CoverContribution, ScoreMap};

const TOP_CONTRIBUTIONS: usize = 3;

/// Fill in each candidate's cover ("artist") score from the cover keys the
/// user picked. Members without cover data, or a user who picked none, keep
/// `q2_artist_score` unset.
pub fn apply_cover_scores(candidates: &mut [CandidateMember], cover_scores: &ScoreMap) {
    for candidate in candidates.iter_mut() {
        let covers = match candidate.member.covers.as_ref() {
            Some(covers) if !covers.is_empty() && !cover_scores.is_empty() => covers,
            _ => {
                candidate.q2_artist_score = None;
                candidate.q2_used_top3.clear();
                continue;
            }
        };

        let mut contributions: Vec<CoverContribution> = covers
            .iter()
            .map(|(key, weight)| CoverContribution {
                key: key.to_string(),
                value: weight * cover_scores.get(key),
            })
            .filter(|contribution| contribution.value > 0.0)
            .collect();

        candidate.q2_artist_score = Some(covers.dot(cover_scores));

        contributions.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.key.cmp(&b.key)));
        contributions.truncate(TOP_CONTRIBUTIONS);
        candidate.q2_used_top3 = contributions;
    }
}
