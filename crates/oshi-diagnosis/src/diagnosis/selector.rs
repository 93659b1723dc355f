use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use super::domain::{CandidateMember, Member, MemberId, ScoreMap};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectionError {
    #[error("catalog holds {available} members but {required} candidates are required")]
    InsufficientMembers { required: usize, available: usize },
    #[error("member '{0}' appears more than once in the catalog")]
    DuplicateMember(MemberId),
}

/// Survey affinity of one member: the dot product of its attribute weights
/// with the user's accumulated survey totals.
pub fn affinity(member: &Member, survey_scores: &ScoreMap) -> f64 {
    member.scores.dot(survey_scores)
}

/// Shortlist the `count` members with the highest survey affinity.
///
/// Ties keep catalog order, so identical inputs always produce the same
/// shortlist.
pub fn select_candidates(
    members: &[Member],
    survey_scores: &ScoreMap,
    count: usize,
) -> Result<Vec<CandidateMember>, SelectionError> {
    if members.len() < count {
        return Err(SelectionError::InsufficientMembers {
            required: count,
            available: members.len(),
        });
    }

    let mut seen = HashSet::with_capacity(members.len());
    for member in members {
        if !seen.insert(&member.id) {
            return Err(SelectionError::DuplicateMember(member.id.clone()));
        }
    }

    let mut scored: Vec<(usize, f64)> = members
        .iter()
        .enumerate()
        .map(|(index, member)| (index, affinity(member, survey_scores)))
        .collect();

    scored.sort_by(|(index_a, score_a), (index_b, score_b)| {
        match score_b.total_cmp(score_a) {
            Ordering::Equal => index_a.cmp(index_b),
            other => other,
        }
    });

    let candidates: Vec<CandidateMember> = scored
        .into_iter()
        .take(count)
        .map(|(index, score)| CandidateMember::new(members[index].clone(), index, score))
        .collect();

    debug!(
        pool = members.len(),
        shortlisted = candidates.len(),
        top = candidates.first().map(|c| c.member.id.as_str()).unwrap_or(""),
        "candidates selected"
    );

    Ok(candidates)
}
