//! Text renderers for a [`QuizSession`]. One session, several interchangeable skins.

use std::fmt::Write;

use time::OffsetDateTime;
use tracing::warn;

use crate::client::{
    machine::{QuizSession, SessionPhase},
    summary::{ScoreSummary, format_countdown, share_text, time_until_next_quiz},
};

/// Renders the current state of a session as plain text.
pub trait Skin: Send + Sync {
    /// Name the skin is configured by.
    fn name(&self) -> &'static str;
    /// Full screen for the current phase, notice included.
    fn render(&self, session: &QuizSession, now: OffsetDateTime) -> String;
}

/// Multi-line layout with headers, option lists and the full score summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicSkin;

/// One or two lines per screen, for narrow terminals and logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactSkin;

/// Skin registered under `name`; unknown names fall back to the classic skin.
pub fn skin_by_name(name: &str) -> Box<dyn Skin> {
    match name {
        "classic" => Box::new(ClassicSkin),
        "compact" => Box::new(CompactSkin),
        other => {
            warn!(skin = other, "unknown skin; using classic");
            Box::new(ClassicSkin)
        }
    }
}

impl Skin for ClassicSkin {
    fn name(&self) -> &'static str {
        "classic"
    }

    fn render(&self, session: &QuizSession, now: OffsetDateTime) -> String {
        let mut out = String::new();
        match session.phase() {
            SessionPhase::Loading => out.push_str("Loading games...\n"),
            SessionPhase::Selection => {
                out.push_str("⚽ FutQuiz - Daily Football Trivia\n\n");
                for (i, game) in session.catalog().iter().enumerate() {
                    let badge = if game.available { "" } else { " (coming soon)" };
                    let _ = writeln!(out, "  {}. {}{badge}", i + 1, game.name);
                    let _ = writeln!(out, "     {}", game.description);
                }
            }
            SessionPhase::Locked => {
                let name = session.game().map_or("the quiz", |game| game.name.as_str());
                let _ = writeln!(out, "Loading {name}...");
            }
            SessionPhase::Playing => render_question(&mut out, session),
            SessionPhase::Completed => render_completed(&mut out, session, now),
        }

        if let Some(notice) = session.notice() {
            let _ = writeln!(out, "\n! {notice}");
        }
        out
    }
}

fn render_question(out: &mut String, session: &QuizSession) {
    let total = session.quiz().map_or(0, |quiz| quiz.questions.len());
    let Some(question) = session.current_question() else {
        return;
    };

    render_last_answer(out, session);

    let _ = writeln!(
        out,
        "Question {} of {}    Score: {}/{}",
        session.index() + 1,
        total,
        session.score(),
        session.index()
    );
    if let Some(remaining) = session.remaining_seconds() {
        let _ = writeln!(out, "⏱ {remaining}s");
    }
    let _ = writeln!(out, "\n{}\n", question.question);
    for (i, option) in question.options.iter().enumerate() {
        let marker = if session.selected() == Some(option.as_str()) {
            "[x]"
        } else {
            "[ ]"
        };
        let _ = writeln!(out, "  {marker} {}. {option}", i + 1);
    }
    let action = if session.index() + 1 == total {
        "Finish Quiz"
    } else {
        "Next Question"
    };
    let _ = writeln!(out, "\n(enter) {action}");
}

/// Verdict and explanation of the most recently confirmed question.
fn render_last_answer(out: &mut String, session: &QuizSession) {
    let Some(last) = session.last_answer() else {
        return;
    };
    if last.is_correct() {
        out.push_str("✅ Correct!\n");
    } else {
        let _ = writeln!(out, "❌ Incorrect, the answer was {}", last.correct);
    }
    let explanation = session
        .quiz()
        .and_then(|quiz| quiz.questions.iter().find(|q| q.id == last.question_id))
        .and_then(|q| q.explanation.as_deref());
    if let Some(explanation) = explanation {
        let _ = writeln!(out, "   {explanation}");
    }
    out.push('\n');
}

fn render_completed(out: &mut String, session: &QuizSession, now: OffsetDateTime) {
    let Some(completion) = session.completion() else {
        return;
    };
    let summary = ScoreSummary::from(completion);

    if session.answers().is_empty() {
        let _ = writeln!(
            out,
            "You've already completed {} today!",
            completion.game_name
        );
        out.push_str("New challenges are released daily at midnight.\n\n");
    } else {
        render_last_answer(out, session);
        out.push_str("🏆 Quiz Complete!\n\n");
    }

    let _ = writeln!(
        out,
        "Score: {}/{} ({}%)  {}",
        summary.score,
        summary.total,
        summary.percentage,
        summary.rating.message()
    );
    if let Some(seconds) = completion.timer_seconds.filter(|_| completion.timer_used) {
        let _ = writeln!(out, "Timed mode: {seconds}s per question");
    }
    let _ = writeln!(out, "\n{}", share_text(completion));
    let _ = writeln!(
        out,
        "\nNext quiz in: {}",
        format_countdown(time_until_next_quiz(now))
    );
    if session.allow_replay() {
        out.push_str("(r) Play again  ");
    }
    out.push_str("(b) Back to games\n");
}

impl Skin for CompactSkin {
    fn name(&self) -> &'static str {
        "compact"
    }

    fn render(&self, session: &QuizSession, now: OffsetDateTime) -> String {
        let mut out = match session.phase() {
            SessionPhase::Loading => "loading".to_owned(),
            SessionPhase::Selection => session
                .catalog()
                .iter()
                .enumerate()
                .map(|(i, game)| {
                    if game.available {
                        format!("{}:{}", i + 1, game.name)
                    } else {
                        format!("{}:{}(soon)", i + 1, game.name)
                    }
                })
                .collect::<Vec<_>>()
                .join(" | "),
            SessionPhase::Locked => "fetching quiz...".to_owned(),
            SessionPhase::Playing => match session.current_question() {
                Some(question) => {
                    let timer = session
                        .remaining_seconds()
                        .map(|s| format!(" {s}s"))
                        .unwrap_or_default();
                    let options = question
                        .options
                        .iter()
                        .enumerate()
                        .map(|(i, option)| {
                            if session.selected() == Some(option.as_str()) {
                                format!("*{}){option}", i + 1)
                            } else {
                                format!("{}){option}", i + 1)
                            }
                        })
                        .collect::<Vec<_>>()
                        .join(" ");
                    format!(
                        "Q{} [{}]{timer} {} {options}",
                        session.index() + 1,
                        session.score(),
                        question.question
                    )
                }
                None => String::new(),
            },
            SessionPhase::Completed => match session.completion() {
                Some(completion) => {
                    let summary = ScoreSummary::from(completion);
                    format!(
                        "{} {}/{} {}% next in {}",
                        completion.game_name,
                        summary.score,
                        summary.total,
                        summary.percentage,
                        format_countdown(time_until_next_quiz(now))
                    )
                }
                None => String::new(),
            },
        };

        if let Some(notice) = session.notice() {
            let _ = write!(out, " !{notice}");
        }
        out.push('\n');
        out
    }
}
