use std::collections::HashMap;
use std::io::{self, Write};

use chrono::{DateTime, Utc};
use oshi_diagnosis::diagnosis::{Catalog, DiagnosisReport, Locale, QuestionKind, RankedMemberView};
use serde::Serialize;

/// JSON envelope for `replay --json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportResponse<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    report: &'a DiagnosisReport,
}

pub(crate) fn render_json<W: Write>(out: &mut W, report: &DiagnosisReport) -> io::Result<()> {
    let response = ReportResponse {
        generated_at: Utc::now(),
        report,
    };
    serde_json::to_writer_pretty(&mut *out, &response)?;
    writeln!(out)
}

pub(crate) fn render_report<W: Write>(out: &mut W, report: &DiagnosisReport) -> io::Result<()> {
    if let Some(winner) = report.winner() {
        writeln!(out, "Your oshi: {} ({})", winner.name, winner.group_name)?;
        if let Some(x_url) = &winner.x_url {
            writeln!(out, "  X: {x_url}")?;
        }
        if let Some(blog_url) = &winner.group_blog_url {
            writeln!(out, "  Blog: {blog_url}")?;
        }
    }

    writeln!(out, "\nTop picks")?;
    for view in &report.top {
        render_line(out, view)?;
    }

    if !report.remaining.is_empty() {
        writeln!(out, "\nAlso on your shortlist")?;
        for view in &report.remaining {
            render_line(out, view)?;
        }
    }

    let names: HashMap<&str, &str> = report
        .top
        .iter()
        .chain(report.remaining.iter())
        .map(|view| (view.member_id.as_str(), view.name.as_str()))
        .collect();
    let name_of = |id: &str| names.get(id).copied().unwrap_or(id).to_string();

    writeln!(out, "\nBattles")?;
    for battle in &report.battles {
        writeln!(
            out,
            "  Round {:>2}: {} vs {} -> {}",
            battle.round,
            name_of(battle.member_a.as_str()),
            name_of(battle.member_b.as_str()),
            name_of(battle.winner_id.as_str()),
        )?;
    }

    Ok(())
}

fn render_line<W: Write>(out: &mut W, view: &RankedMemberView) -> io::Result<()> {
    write!(
        out,
        "  {}. {} / {} | score {:.1} (survey {:.1}, wins {}/{}",
        view.rank,
        view.name,
        view.group_name,
        view.final_score,
        view.survey_score,
        view.win_count,
        view.appearance_count,
    )?;
    if let Some(cover_score) = view.cover_score {
        write!(out, ", covers {cover_score:.1}")?;
    }
    if view.language_bonus > 0.0 {
        write!(out, ", language +{:.1}", view.language_bonus)?;
    }
    writeln!(out, ", jp {})", view.jp_support.label())
}

pub(crate) fn render_catalog<W: Write>(out: &mut W, catalog: &Catalog) -> io::Result<()> {
    writeln!(
        out,
        "Catalog: {} members, {} groups, {} questions",
        catalog.members().len(),
        catalog.groups().len(),
        catalog.questions().len()
    )?;

    writeln!(out, "Groups:")?;
    for group in catalog.groups() {
        let members = catalog
            .members()
            .iter()
            .filter(|member| member.group_id == group.id)
            .count();
        writeln!(
            out,
            "  - {} ({}): {} members",
            group.id,
            group.localized_name(Locale::En),
            members
        )?;
    }

    writeln!(out, "Questions:")?;
    for (index, question) in catalog.questions().iter().enumerate() {
        let (min, max) = question.selection_bounds();
        write!(
            out,
            "  {}. {} [{}] {} options",
            index + 1,
            question.id,
            kind_label(question.kind),
            question.options.len()
        )?;
        if question.kind == QuestionKind::Multi {
            write!(out, ", pick {min}-{max}")?;
        }
        writeln!(out)?;
    }

    Ok(())
}

fn kind_label(kind: QuestionKind) -> &'static str {
    match kind {
        QuestionKind::Single => "single",
        QuestionKind::Multi => "multi",
        QuestionKind::KoreanLevel => "korean_level",
    }
}
