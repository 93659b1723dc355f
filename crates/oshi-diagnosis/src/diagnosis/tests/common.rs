use crate::diagnosis::catalog::Catalog;
use crate::diagnosis::domain::{
    CandidateMember, Group, GroupId, JpSupportLevel, KoreanLevel, Member, MemberId, Question,
    QuestionKind, QuestionOption, ScoreMap, CANDIDATE_COUNT,
};
use crate::diagnosis::engine::DiagnosisEngine;
use crate::diagnosis::ranking::RankingConfig;
use crate::diagnosis::selector::select_candidates;
use crate::diagnosis::state::{DiagnosisAction, DiagnosisState};

pub(crate) fn score_map(entries: &[(&str, f64)]) -> ScoreMap {
    entries.iter().map(|(key, value)| (*key, *value)).collect()
}

pub(crate) fn member(id: &str, scores: &[(&str, f64)]) -> Member {
    Member {
        id: MemberId::new(id),
        name: format!("メンバー{id}"),
        name_ko: None,
        name_en: Some(format!("Member {id}")),
        group_id: GroupId(if id < "m06" { "g1" } else { "g2" }.to_string()),
        x_url: None,
        photo_url: format!("/img/{id}.jpg"),
        tags: Vec::new(),
        scores: score_map(scores),
        jp_support: JpSupportLevel::Unknown,
        covers: None,
    }
}

pub(crate) fn member_with_covers(id: &str, covers: &[(&str, f64)]) -> Member {
    let mut member = member(id, &[("cute", 1.0)]);
    member.covers = Some(score_map(covers));
    member
}

/// Ten members whose affinity with `{cute: 5, cool: 1}` is, in catalog order:
/// 25, 10, 21, 4, 18, 10, 25, 6, 1, 12.
pub(crate) fn member_pool() -> Vec<Member> {
    vec![
        member("m01", &[("cute", 5.0)]),
        member("m02", &[("cute", 1.0), ("cool", 5.0)]),
        member("m03", &[("cute", 4.0), ("cool", 1.0)]),
        member("m04", &[("cool", 4.0)]),
        member("m05", &[("cute", 3.0), ("cool", 3.0)]),
        member("m06", &[("cute", 2.0)]),
        member("m07", &[("cute", 5.0)]),
        member("m08", &[("cute", 1.0), ("cool", 1.0)]),
        member("m09", &[("cool", 1.0)]),
        member("m10", &[("cute", 2.0), ("cool", 2.0)]),
    ]
}

pub(crate) fn groups() -> Vec<Group> {
    vec![
        Group {
            id: GroupId("g1".to_string()),
            name: "ぴゅあぱれっと".to_string(),
            name_ja: None,
            name_ko: Some("퓨어팔레트".to_string()),
            name_en: Some("Pure Palette".to_string()),
            color: Some("#FF5A5F".to_string()),
            blog_url: Some("https://example.com/g1".to_string()),
        },
        Group {
            id: GroupId("g2".to_string()),
            name: "ネオンノート".to_string(),
            name_ja: None,
            name_ko: None,
            name_en: Some("Neon Note".to_string()),
            color: None,
            blog_url: None,
        },
    ]
}

pub(crate) fn keyed_option(id: &str, key: &str, value: Option<f64>) -> QuestionOption {
    QuestionOption {
        id: Some(id.to_string()),
        text: id.to_string(),
        score_key: Some(key.to_string()),
        score_value: value,
        ..QuestionOption::default()
    }
}

/// Answering `a` then `c` + `d` accumulates exactly `{cute: 5, cool: 1}`.
pub(crate) fn questions() -> Vec<Question> {
    vec![
        Question {
            id: "q1".to_string(),
            text: "好きな雰囲気は？".to_string(),
            text_ko: None,
            text_en: Some("Which vibe do you like?".to_string()),
            kind: QuestionKind::Single,
            min_select: None,
            max_select: None,
            options: vec![
                keyed_option("a", "cute", Some(3.0)),
                keyed_option("b", "cool", Some(3.0)),
            ],
        },
        Question {
            id: "q2".to_string(),
            text: "好きな曲は？".to_string(),
            text_ko: None,
            text_en: None,
            kind: QuestionKind::Multi,
            min_select: Some(1),
            max_select: Some(2),
            options: vec![
                QuestionOption {
                    id: Some("c".to_string()),
                    text: "c".to_string(),
                    scores: Some(score_map(&[("cute", 1.0), ("cool", 1.0)])),
                    ..QuestionOption::default()
                },
                keyed_option("d", "cute", None),
                QuestionOption {
                    id: Some("e".to_string()),
                    text: "e".to_string(),
                    covers: Some(score_map(&[("artist_x", 2.0)])),
                    ..QuestionOption::default()
                },
            ],
        },
        Question {
            id: "q3".to_string(),
            text: "韓国語はどのくらい？".to_string(),
            text_ko: None,
            text_en: None,
            kind: QuestionKind::KoreanLevel,
            min_select: None,
            max_select: None,
            options: vec![
                QuestionOption {
                    id: Some("k-none".to_string()),
                    text: "全く".to_string(),
                    korean_level: Some(KoreanLevel::None),
                    ..QuestionOption::default()
                },
                QuestionOption {
                    id: Some("k-native".to_string()),
                    text: "ネイティブ".to_string(),
                    korean_level: Some(KoreanLevel::Native),
                    ..QuestionOption::default()
                },
            ],
        },
    ]
}

pub(crate) fn catalog() -> Catalog {
    Catalog::new(member_pool(), groups(), questions()).expect("fixture catalog is valid")
}

pub(crate) fn engine() -> DiagnosisEngine {
    DiagnosisEngine::new(catalog(), RankingConfig::default()).expect("default weights are valid")
}

pub(crate) fn survey_scores() -> ScoreMap {
    score_map(&[("cute", 5.0), ("cool", 1.0)])
}

pub(crate) fn candidates() -> Vec<CandidateMember> {
    select_candidates(&member_pool(), &survey_scores(), CANDIDATE_COUNT)
        .expect("pool is large enough")
}

/// A state with the fixture shortlist installed and no battles played.
pub(crate) fn state_with_candidates() -> DiagnosisState {
    DiagnosisState::default()
        .apply(DiagnosisAction::SetCandidates {
            candidates: candidates(),
        })
        .expect("candidates install")
}

/// Play every remaining round, letting `choose` pick the winner of each
/// proposed pairing.
pub(crate) fn play_battles<F>(mut state: DiagnosisState, mut choose: F) -> DiagnosisState
where
    F: FnMut(&MemberId, &MemberId) -> MemberId,
{
    while let Some(pairing) = state.next_battle() {
        let winner = choose(&pairing.member_a, &pairing.member_b);
        state = state
            .apply(DiagnosisAction::RecordBattle {
                record: pairing.record(winner),
            })
            .expect("proposed pairing records");
    }
    state
}
