//! Survey scoring: folds chosen options into running per-attribute totals.
//!
//! Every function here is pure. Totals live in a `BTreeMap`-backed
//! [`ScoreMap`], so the order in which options are folded never changes the
//! result.

use super::domain::{QuestionOption, ScoreMap};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("option '{0}' carries no score mapping")]
    MissingScoreMapping(String),
}

fn option_label(option: &QuestionOption) -> String {
    option.id.clone().unwrap_or_else(|| option.text.clone())
}

/// Attribute increments an option contributes.
///
/// A non-empty `scores` mapping wins; otherwise `scoreKey` is applied with
/// `scoreValue`, defaulting to 1. Options that only carry cover keys
/// contribute nothing here.
pub fn resolve_increments(option: &QuestionOption) -> Result<ScoreMap, ScoringError> {
    if let Some(scores) = option.scores.as_ref().filter(|scores| !scores.is_empty()) {
        return Ok(scores.clone());
    }

    if let Some(key) = option.score_key.as_deref().filter(|key| !key.is_empty()) {
        let mut increments = ScoreMap::new();
        increments.add(key, option.score_value.unwrap_or(1.0));
        return Ok(increments);
    }

    if option.covers.as_ref().is_some_and(|covers| !covers.is_empty()) {
        return Ok(ScoreMap::new());
    }

    Err(ScoringError::MissingScoreMapping(option_label(option)))
}

pub fn score_option(option: &QuestionOption, current: &ScoreMap) -> Result<ScoreMap, ScoringError> {
    let mut updated = current.clone();
    updated.merge(&resolve_increments(option)?);
    Ok(updated)
}

/// Sum the increments of every option chosen for one multi-select question.
pub fn score_options(
    options: &[QuestionOption],
    current: &ScoreMap,
) -> Result<ScoreMap, ScoringError> {
    options
        .iter()
        .try_fold(current.clone(), |totals, option| score_option(option, &totals))
}

/// Fold the cover keys of the chosen options into the running cover totals.
pub fn cover_increments(options: &[QuestionOption], current: &ScoreMap) -> ScoreMap {
    let mut updated = current.clone();
    for covers in options.iter().filter_map(|option| option.covers.as_ref()) {
        updated.merge(covers);
    }
    updated
}
