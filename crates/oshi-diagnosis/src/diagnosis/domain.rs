use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of pairwise battles played per session.
pub const BATTLE_ROUNDS: usize = 10;
/// Size of the shortlist carried into the battle phase.
pub const CANDIDATE_COUNT: usize = 8;
/// Number of members shown on the headline result cards.
pub const RESULT_COUNT: usize = 3;

/// Identifier wrapper for catalog members.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(pub String);

impl MemberId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for catalog groups.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(pub String);

impl GroupId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attribute key to weight mapping. Keys missing from the map weigh zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreMap(BTreeMap<String, f64>);

impl ScoreMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> f64 {
        self.0.get(key).copied().unwrap_or(0.0)
    }

    pub fn add(&mut self, key: &str, value: f64) {
        *self.0.entry(key.to_owned()).or_insert(0.0) += value;
    }

    pub fn merge(&mut self, other: &ScoreMap) {
        for (key, value) in other.iter() {
            self.add(key, value);
        }
    }

    /// Sum of products over the keys both maps carry.
    pub fn dot(&self, other: &ScoreMap) -> f64 {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .iter()
            .map(|(key, value)| value * large.get(key))
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(key, value)| (key.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ScoreMap {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut map = ScoreMap::new();
        for (key, value) in iter {
            let key: String = key.into();
            map.add(&key, value);
        }
        map
    }
}

/// How well a member handles Japanese-speaking fans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JpSupportLevel {
    Ok,
    Some,
    Unknown,
    No,
}

impl JpSupportLevel {
    /// Share of a language bonus this level earns.
    pub const fn bonus_factor(self) -> f64 {
        match self {
            Self::Ok => 1.0,
            Self::Some => 0.5,
            Self::Unknown | Self::No => 0.0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "Japanese OK",
            Self::Some => "Some Japanese",
            Self::Unknown => "Unknown",
            Self::No => "No Japanese",
        }
    }
}

/// The user's self-reported Korean proficiency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KoreanLevel {
    Native,
    Advanced,
    Intermediate,
    Beginner,
    #[default]
    None,
}

impl KoreanLevel {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Native,
            Self::Advanced,
            Self::Intermediate,
            Self::Beginner,
            Self::None,
        ]
    }

    pub const fn is_low(self) -> bool {
        matches!(self, Self::Beginner | Self::None)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Advanced => "advanced",
            Self::Intermediate => "intermediate",
            Self::Beginner => "beginner",
            Self::None => "none",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|level| level.label().eq_ignore_ascii_case(raw.trim()))
    }
}

/// Display locale. Never influences scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    Ja,
    Ko,
    En,
}

impl Locale {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ja" => Some(Self::Ja),
            "ko" => Some(Self::Ko),
            "en" => Some(Self::En),
            _ => None,
        }
    }

    /// Pick the localized variant, falling back to the primary text.
    pub fn pick<'a>(
        self,
        primary: &'a str,
        ja: Option<&'a str>,
        ko: Option<&'a str>,
        en: Option<&'a str>,
    ) -> &'a str {
        let localized = match self {
            Self::Ja => ja,
            Self::Ko => ko,
            Self::En => en,
        };
        localized.filter(|text| !text.is_empty()).unwrap_or(primary)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    #[serde(default)]
    pub name_ja: Option<String>,
    #[serde(default)]
    pub name_ko: Option<String>,
    #[serde(default)]
    pub name_en: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub blog_url: Option<String>,
}

impl Group {
    pub fn localized_name(&self, locale: Locale) -> &str {
        locale.pick(
            &self.name,
            self.name_ja.as_deref(),
            self.name_ko.as_deref(),
            self.name_en.as_deref(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    #[serde(default)]
    pub name_ko: Option<String>,
    #[serde(default)]
    pub name_en: Option<String>,
    pub group_id: GroupId,
    #[serde(default)]
    pub x_url: Option<String>,
    pub photo_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub scores: ScoreMap,
    pub jp_support: JpSupportLevel,
    #[serde(default)]
    pub covers: Option<ScoreMap>,
}

impl Member {
    pub fn localized_name(&self, locale: Locale) -> &str {
        locale.pick(
            &self.name,
            None,
            self.name_ko.as_deref(),
            self.name_en.as_deref(),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    #[default]
    Single,
    Multi,
    KoreanLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub text_ko: Option<String>,
    #[serde(default)]
    pub text_en: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: QuestionKind,
    #[serde(default)]
    pub min_select: Option<usize>,
    #[serde(default)]
    pub max_select: Option<usize>,
    pub options: Vec<QuestionOption>,
}

impl Question {
    pub fn localized_text(&self, locale: Locale) -> &str {
        locale.pick(
            &self.text,
            None,
            self.text_ko.as_deref(),
            self.text_en.as_deref(),
        )
    }

    /// Inclusive number of options a valid answer selects.
    pub fn selection_bounds(&self) -> (usize, usize) {
        match self.kind {
            QuestionKind::Multi => (
                self.min_select.unwrap_or(1),
                self.max_select.unwrap_or(self.options.len()),
            ),
            QuestionKind::Single | QuestionKind::KoreanLevel => (1, 1),
        }
    }

    pub fn option(&self, option_id: &str) -> Option<&QuestionOption> {
        self.options
            .iter()
            .find(|option| option.id.as_deref() == Some(option_id))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub text_ko: Option<String>,
    #[serde(default)]
    pub text_en: Option<String>,
    #[serde(default)]
    pub score_key: Option<String>,
    #[serde(default)]
    pub score_value: Option<f64>,
    #[serde(default)]
    pub scores: Option<ScoreMap>,
    #[serde(default)]
    pub covers: Option<ScoreMap>,
    #[serde(default)]
    pub korean_level: Option<KoreanLevel>,
}

impl QuestionOption {
    pub fn localized_text(&self, locale: Locale) -> &str {
        locale.pick(
            &self.text,
            None,
            self.text_ko.as_deref(),
            self.text_en.as_deref(),
        )
    }
}

/// A single cover key's share of a member's cover score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverContribution {
    pub key: String,
    pub value: f64,
}

/// Shortlisted member carried through the battle phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateMember {
    pub member: Member,
    pub catalog_index: usize,
    pub survey_score: f64,
    pub appearance_count: u32,
    pub win_count: u32,
    pub q2_artist_score: Option<f64>,
    pub q2_used_top3: Vec<CoverContribution>,
    pub preference_score: Option<f64>,
    pub language_bonus: Option<f64>,
    pub final_score: Option<f64>,
}

impl CandidateMember {
    pub fn new(member: Member, catalog_index: usize, survey_score: f64) -> Self {
        Self {
            member,
            catalog_index,
            survey_score,
            appearance_count: 0,
            win_count: 0,
            q2_artist_score: None,
            q2_used_top3: Vec::new(),
            preference_score: None,
            language_bonus: None,
            final_score: None,
        }
    }

    pub fn id(&self) -> &MemberId {
        &self.member.id
    }
}

/// One entry of the append-only battle log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRecord {
    pub round: usize,
    pub member_a: MemberId,
    pub member_b: MemberId,
    pub winner_id: MemberId,
}
