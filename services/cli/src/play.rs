use std::io::{self, BufRead, Write};

use oshi_diagnosis::diagnosis::{
    DiagnosisEngine, DiagnosisReport, DiagnosisState, Locale, MemberId, Question, QuestionKind,
    BATTLE_ROUNDS,
};
use oshi_diagnosis::error::AppError;

use crate::render::render_report;

pub(crate) fn run_play(engine: &DiagnosisEngine, locale: Locale) -> Result<(), AppError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut input = stdin.lock();
    let mut out = stdout.lock();

    let report = play(engine, locale, &mut input, &mut out)?;
    writeln!(out)?;
    render_report(&mut out, &report)?;
    Ok(())
}

/// Drive one full session over line-based input.
pub(crate) fn play<R: BufRead, W: Write>(
    engine: &DiagnosisEngine,
    locale: Locale,
    input: &mut R,
    out: &mut W,
) -> Result<DiagnosisReport, AppError> {
    let mut state = engine.start();

    let answer = prompt(input, out, "Prefer members who speak Japanese? [y/N] ")?;
    let prefer = matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes");
    state = engine.set_prefer_jp_support(&state, prefer)?;

    while let Some(question) = engine.current_question(&state) {
        state = ask_question(engine, &state, question, locale, input, out)?;
    }

    state = engine.select_candidates(&state)?;
    writeln!(out, "\nYour shortlist:")?;
    for candidate in &state.candidates {
        writeln!(out, "  - {}", candidate.member.localized_name(locale))?;
    }

    while let Some(pairing) = engine.next_battle(&state) {
        let name = |id: &MemberId| {
            state
                .candidate(id)
                .map(|candidate| candidate.member.localized_name(locale).to_string())
                .unwrap_or_else(|| id.to_string())
        };
        writeln!(
            out,
            "\nRound {}/{}: [1] {}  vs  [2] {}",
            pairing.round,
            BATTLE_ROUNDS,
            name(&pairing.member_a),
            name(&pairing.member_b)
        )?;

        let winner = loop {
            match prompt(input, out, "Who do you like more? ")?.as_str() {
                "1" => break pairing.member_a.clone(),
                "2" => break pairing.member_b.clone(),
                _ => writeln!(out, "  please answer 1 or 2")?,
            }
        };
        state = engine.pick(&state, &winner)?;
    }

    state = engine.finalize(&state)?;
    Ok(engine.report(&state, locale)?)
}

fn ask_question<R: BufRead, W: Write>(
    engine: &DiagnosisEngine,
    state: &DiagnosisState,
    question: &Question,
    locale: Locale,
    input: &mut R,
    out: &mut W,
) -> Result<DiagnosisState, AppError> {
    writeln!(out, "\n{}", question.localized_text(locale))?;
    for (index, option) in question.options.iter().enumerate() {
        writeln!(out, "  {}. {}", index + 1, option.localized_text(locale))?;
    }

    let (min, max) = question.selection_bounds();
    let message = match question.kind {
        QuestionKind::Multi => format!("Choose {min}-{max} (space separated): "),
        QuestionKind::Single | QuestionKind::KoreanLevel => "Choose one: ".to_string(),
    };

    loop {
        let line = prompt(input, out, &message)?;
        let option_ids = match parse_choices(&line, question) {
            Some(ids) => ids,
            None => {
                writeln!(
                    out,
                    "  enter option numbers between 1 and {}",
                    question.options.len()
                )?;
                continue;
            }
        };

        match engine.answer(state, &option_ids) {
            Ok(next) => return Ok(next),
            Err(err) => writeln!(out, "  {err}")?,
        }
    }
}

/// Map 1-based option numbers to option ids.
fn parse_choices<'q>(line: &str, question: &'q Question) -> Option<Vec<&'q str>> {
    line.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            let number: usize = token.parse().ok()?;
            question
                .options
                .get(number.checked_sub(1)?)
                .and_then(|option| option.id.as_deref())
        })
        .collect()
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, message: &str) -> io::Result<String> {
    write!(out, "{message}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input ended before the diagnosis finished",
        ));
    }
    Ok(line.trim().to_string())
}
