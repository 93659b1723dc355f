use serde::Serialize;

use super::catalog::Catalog;
use super::domain::{
    BattleRecord, CandidateMember, CoverContribution, JpSupportLevel, Locale, MemberId,
    RESULT_COUNT,
};
use super::state::DiagnosisState;

/// Presentation-ready line for one ranked member.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedMemberView {
    pub rank: usize,
    pub member_id: MemberId,
    pub name: String,
    pub group_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_blog_url: Option<String>,
    pub photo_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_url: Option<String>,
    pub jp_support: JpSupportLevel,
    pub survey_score: f64,
    pub win_count: u32,
    pub appearance_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_score: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub top_covers: Vec<CoverContribution>,
    pub preference_score: f64,
    pub language_bonus: f64,
    pub final_score: f64,
}

impl RankedMemberView {
    fn from_candidate(
        rank: usize,
        candidate: &CandidateMember,
        catalog: &Catalog,
        locale: Locale,
    ) -> Self {
        let member = &candidate.member;
        let group = catalog.group(&member.group_id);

        Self {
            rank,
            member_id: member.id.clone(),
            name: member.localized_name(locale).to_string(),
            group_name: group
                .map(|group| group.localized_name(locale).to_string())
                .unwrap_or_default(),
            group_color: group.and_then(|group| group.color.clone()),
            group_blog_url: group.and_then(|group| group.blog_url.clone()),
            photo_url: member.photo_url.clone(),
            x_url: member.x_url.clone(),
            jp_support: member.jp_support,
            survey_score: candidate.survey_score,
            win_count: candidate.win_count,
            appearance_count: candidate.appearance_count,
            cover_score: candidate.q2_artist_score,
            top_covers: candidate.q2_used_top3.clone(),
            preference_score: candidate.preference_score.unwrap_or_default(),
            language_bonus: candidate.language_bonus.unwrap_or_default(),
            final_score: candidate.final_score.unwrap_or_default(),
        }
    }
}

/// The result screen: headline picks, the rest of the shortlist, and the
/// battle log that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisReport {
    pub locale: Locale,
    pub top: Vec<RankedMemberView>,
    pub remaining: Vec<RankedMemberView>,
    pub battles: Vec<BattleRecord>,
}

impl DiagnosisReport {
    pub(crate) fn build(state: &DiagnosisState, catalog: &Catalog, locale: Locale) -> Self {
        let mut views = state
            .final_ranking
            .iter()
            .enumerate()
            .map(|(index, candidate)| {
                RankedMemberView::from_candidate(index + 1, candidate, catalog, locale)
            });

        let top = views.by_ref().take(RESULT_COUNT).collect();
        let remaining = views.collect();

        Self {
            locale,
            top,
            remaining,
            battles: state.battle_records.clone(),
        }
    }

    pub fn winner(&self) -> Option<&RankedMemberView> {
        self.top.first()
    }
}
