use std::{cmp::Ordering, time::SystemTime};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Difficulty;

/// Quiz aggregate persisted by the storage layer, questions included.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizEntity {
    /// Primary key of the quiz.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Scheduled calendar date (`YYYY-MM-DD`); undated quizzes sort last.
    pub date: Option<String>,
    /// Catalog game this quiz belongs to, if any.
    pub game_id: Option<String>,
    /// Creation timestamp, used as tie-breaker between quizzes of the same date.
    pub created_at: SystemTime,
    /// Questions in play order.
    pub questions: Vec<QuestionEntity>,
}

/// Question row belonging to a quiz.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntity {
    /// Primary key of the question.
    pub id: Uuid,
    /// Owning quiz.
    pub quiz_id: Uuid,
    /// Prompt text.
    pub text: String,
    /// Options in display order.
    pub options: Vec<String>,
    /// Literal value of the correct option.
    pub correct: String,
    /// Optional explanation.
    pub explanation: Option<String>,
    /// Optional difficulty tag.
    pub difficulty: Option<Difficulty>,
    /// Optional category tag.
    pub category: Option<String>,
}

impl QuizEntity {
    /// Ordering that puts the quiz to serve first: latest date, then most recently created.
    pub fn newest_first(a: &QuizEntity, b: &QuizEntity) -> Ordering {
        match (&a.date, &b.date) {
            (Some(left), Some(right)) => right.cmp(left),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| b.created_at.cmp(&a.created_at))
    }

    /// Whether this quiz is served for the given game filter.
    pub fn matches_game(&self, game_id: Option<&str>) -> bool {
        match game_id {
            Some(wanted) => self.game_id.as_deref() == Some(wanted),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn quiz(date: Option<&str>, created_offset_secs: u64) -> QuizEntity {
        QuizEntity {
            id: Uuid::new_v4(),
            title: "quiz".into(),
            date: date.map(Into::into),
            game_id: None,
            created_at: SystemTime::UNIX_EPOCH + Duration::from_secs(created_offset_secs),
            questions: Vec::new(),
        }
    }

    #[test]
    fn newest_first_orders_by_date_then_creation() {
        let mut quizzes = vec![
            quiz(None, 500),
            quiz(Some("2026-10-17"), 400),
            quiz(Some("2026-10-18"), 100),
            quiz(Some("2026-10-18"), 200),
        ];
        quizzes.sort_by(QuizEntity::newest_first);

        let keys: Vec<_> = quizzes
            .iter()
            .map(|q| (q.date.clone(), q.created_at))
            .collect();
        assert_eq!(keys[0].0.as_deref(), Some("2026-10-18"));
        assert!(keys[0].1 > keys[1].1);
        assert_eq!(keys[2].0.as_deref(), Some("2026-10-17"));
        assert_eq!(keys[3].0, None);
    }
}
