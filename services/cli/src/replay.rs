use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use clap::Args;
use oshi_diagnosis::diagnosis::{
    BattlePairing, DiagnosisEngine, DiagnosisReport, KoreanLevel, Locale, MemberId,
};
use oshi_diagnosis::error::AppError;
use serde::Deserialize;
use tracing::info;

use crate::cli::{parse_locale, DataArgs};
use crate::render::{render_json, render_report};

#[derive(Args, Debug)]
pub(crate) struct ReplayArgs {
    #[command(flatten)]
    pub(crate) data: DataArgs,
    /// JSON script with answers, toggles and battle favorites
    #[arg(long)]
    pub(crate) script: PathBuf,
    /// Display language for names (ja, ko, en)
    #[arg(long, default_value = "ja", value_parser = parse_locale)]
    pub(crate) locale: Locale,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

/// A recorded session: one list of option ids per question, plus the
/// preferences used to decide every battle.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReplayScript {
    pub(crate) answers: Vec<Vec<String>>,
    /// Overrides whatever the Korean-level question recorded.
    #[serde(default)]
    pub(crate) korean_level: Option<KoreanLevel>,
    #[serde(default)]
    pub(crate) prefer_jp_support: bool,
    #[serde(default)]
    pub(crate) favorites: Vec<String>,
}

impl ReplayScript {
    pub(crate) fn load(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    fn favorite_rank(&self, id: &MemberId) -> usize {
        self.favorites
            .iter()
            .position(|favorite| favorite == id.as_str())
            .unwrap_or(usize::MAX)
    }

    /// Earlier favorites beat later ones and unlisted members; a pair the
    /// list cannot separate goes to the first member shown.
    pub(crate) fn choose(&self, pairing: &BattlePairing) -> MemberId {
        if self.favorite_rank(&pairing.member_b) < self.favorite_rank(&pairing.member_a) {
            pairing.member_b.clone()
        } else {
            pairing.member_a.clone()
        }
    }
}

pub(crate) fn run_replay(engine: &DiagnosisEngine, args: &ReplayArgs) -> Result<(), AppError> {
    let script = ReplayScript::load(&args.script)?;
    let report = replay(engine, &script, args.locale)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        render_json(&mut out, &report)?;
    } else {
        render_report(&mut out, &report)?;
    }
    Ok(())
}

pub(crate) fn replay(
    engine: &DiagnosisEngine,
    script: &ReplayScript,
    locale: Locale,
) -> Result<DiagnosisReport, AppError> {
    let questions = engine.catalog().questions().len();
    if script.answers.len() != questions {
        return Err(AppError::Script(format!(
            "script answers {} questions but the catalog has {}",
            script.answers.len(),
            questions
        )));
    }

    let mut state = engine.start();
    state = engine.set_prefer_jp_support(&state, script.prefer_jp_support)?;
    for answer in &script.answers {
        let option_ids: Vec<&str> = answer.iter().map(String::as_str).collect();
        state = engine.answer(&state, &option_ids)?;
    }
    if let Some(level) = script.korean_level {
        state = engine.set_korean_level(&state, level)?;
    }

    state = engine.select_candidates(&state)?;
    while let Some(pairing) = engine.next_battle(&state) {
        let winner = script.choose(&pairing);
        state = engine.pick(&state, &winner)?;
    }
    state = engine.finalize(&state)?;

    let report = engine.report(&state, locale)?;
    if let Some(winner) = report.winner() {
        info!(winner = %winner.member_id, locale = ?locale, "replay finished");
    }
    Ok(report)
}
