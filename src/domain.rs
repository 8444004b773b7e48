//! Domain types shared by the quiz server, the session state machine and the
//! render layer.

use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};
use utoipa::ToSchema;

/// Calendar date format used for quiz dates and completion keys.
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Format `date` as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| format!("{}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day()))
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value, DATE_FORMAT).ok()
}

/// Difficulty tag attached to a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Warm-up question.
    Easy,
    /// Regular question.
    Medium,
    /// Only for the die-hards.
    Hard,
}

/// A single multiple-choice question as played by a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Stable identifier, also used when reporting answers to the server.
    pub id: String,
    /// Prompt shown to the player.
    pub question: String,
    /// Options in display order.
    pub options: Vec<String>,
    /// Literal value of the correct option.
    pub correct_answer: String,
    /// Optional explanation revealed after answering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Optional difficulty tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    /// Optional category tag (e.g. "World Cup").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Question {
    /// Whether `option` is one of the options offered by this question.
    pub fn offers(&self, option: &str) -> bool {
        self.options.iter().any(|candidate| candidate == option)
    }

    /// Exact, case-sensitive comparison against the correct answer. An empty
    /// selection never counts.
    pub fn is_correct(&self, selected: &str) -> bool {
        !selected.is_empty() && selected == self.correct_answer
    }
}

/// A dated quiz made of an ordered, non-empty list of questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    /// Quiz identifier.
    pub id: String,
    /// Calendar date (`YYYY-MM-DD`) the quiz is scheduled for, empty when undated.
    #[serde(default)]
    pub date: String,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Optional longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Questions in play order.
    pub questions: Vec<Question>,
}

/// Entry of the static game catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameType {
    /// Identifier, also used as the completion storage key suffix.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short pitch shown on the selection screen.
    pub description: String,
    /// Client route of the game.
    #[serde(default)]
    pub route: String,
    /// Icon name.
    #[serde(default)]
    pub icon: String,
    /// Unavailable games are listed as "coming soon" and cannot be selected.
    pub available: bool,
}

/// Durable record that a game was finished on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionData {
    /// Identifier of the completed game.
    pub game_id: String,
    /// Display name of the completed game.
    pub game_name: String,
    /// Number of correct answers.
    pub score: u32,
    /// Number of questions in the quiz.
    pub total_questions: u32,
    /// RFC 3339 completion timestamp.
    pub completed_at: String,
    /// Calendar day (`YYYY-MM-DD`) the record counts for.
    pub date: String,
    /// Whether the countdown was enabled for this run.
    #[serde(default)]
    pub timer_used: bool,
    /// Countdown duration per question when the timer was used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_seconds: Option<u32>,
}

/// One graded question of a session, in question order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    /// Identifier of the graded question.
    pub question_id: String,
    /// Locked-in selection, empty when nothing was chosen.
    pub selected: String,
    /// The question's correct answer.
    pub correct: String,
}

impl AnswerRecord {
    /// Whether the locked-in selection matched the correct answer.
    pub fn is_correct(&self) -> bool {
        !self.selected.is_empty() && self.selected == self.correct
    }
}

/// Built-in catalog used when no configuration overrides it.
pub fn default_catalog() -> Vec<GameType> {
    vec![
        GameType {
            id: "daily-trivia".into(),
            name: "Daily Trivia".into(),
            description: "Test your general football knowledge with challenging questions covering all aspects of the beautiful game.".into(),
            route: "/daily-trivia".into(),
            icon: "trophy".into(),
            available: true,
        },
        GameType {
            id: "player-guess".into(),
            name: "Player Guess".into(),
            description: "Can you identify famous football players from clues about their career, achievements, and playing style?".into(),
            route: "/player-guess".into(),
            icon: "users".into(),
            available: true,
        },
        GameType {
            id: "club-quiz".into(),
            name: "Club Quiz".into(),
            description: "How well do you know football clubs? Team history, stadiums, and achievements.".into(),
            route: "/club-quiz".into(),
            icon: "target".into(),
            available: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question {
            id: "q1".into(),
            question: "Who won the 2022 World Cup?".into(),
            options: vec!["Brazil".into(), "Argentina".into()],
            correct_answer: "Argentina".into(),
            explanation: None,
            difficulty: Some(Difficulty::Easy),
            category: None,
        }
    }

    #[test]
    fn dates_round_trip_as_iso_days() {
        let date = parse_date("2026-03-07").unwrap();
        assert_eq!(format_date(date), "2026-03-07");
        assert!(parse_date("07/03/2026").is_none());
        assert!(parse_date("2026-02-30").is_none());
    }

    #[test]
    fn grading_is_exact_and_case_sensitive() {
        let q = question();
        assert!(q.is_correct("Argentina"));
        assert!(!q.is_correct("argentina"));
        assert!(!q.is_correct("Argentina "));
        assert!(!q.is_correct(""));
    }

    #[test]
    fn empty_selection_never_correct_even_if_answer_is_empty() {
        let record = AnswerRecord {
            question_id: "q".into(),
            selected: String::new(),
            correct: String::new(),
        };
        assert!(!record.is_correct());
    }

    #[test]
    fn completion_uses_camel_case_on_disk() {
        let data = CompletionData {
            game_id: "daily-trivia".into(),
            game_name: "Daily Trivia".into(),
            score: 3,
            total_questions: 5,
            completed_at: "2026-10-18T10:00:00Z".into(),
            date: "2026-10-18".into(),
            timer_used: false,
            timer_seconds: None,
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["gameId"], "daily-trivia");
        assert_eq!(json["totalQuestions"], 5);
        assert!(json.get("timerSeconds").is_none());
    }

    #[test]
    fn default_catalog_marks_club_quiz_unavailable() {
        let catalog = default_catalog();
        let club = catalog.iter().find(|g| g.id == "club-quiz").unwrap();
        assert!(!club.available);
        assert!(catalog.iter().filter(|g| g.available).count() >= 2);
    }
}
