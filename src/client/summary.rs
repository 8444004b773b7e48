//! Score summary helpers shown once a game is completed.

use time::{Duration, OffsetDateTime, Time};

use crate::domain::CompletionData;

/// Verdict attached to a final percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    /// 90% and above.
    Outstanding,
    /// 80% to 89%.
    Excellent,
    /// 70% to 79%.
    GreatJob,
    /// 60% to 69%.
    GoodEffort,
    /// 50% to 59%.
    NotBad,
    /// Below 50%.
    KeepPracticing,
}

impl Rating {
    /// Rating for a 0..=100 percentage.
    pub fn for_percentage(percentage: u32) -> Self {
        match percentage {
            90.. => Rating::Outstanding,
            80..=89 => Rating::Excellent,
            70..=79 => Rating::GreatJob,
            60..=69 => Rating::GoodEffort,
            50..=59 => Rating::NotBad,
            _ => Rating::KeepPracticing,
        }
    }

    /// Line shown next to the score.
    pub fn message(self) -> &'static str {
        match self {
            Rating::Outstanding => "Outstanding! ⭐",
            Rating::Excellent => "Excellent! 🎉",
            Rating::GreatJob => "Great job! 👏",
            Rating::GoodEffort => "Good effort! 👍",
            Rating::NotBad => "Not bad! 💪",
            Rating::KeepPracticing => "Keep practicing! ⚽",
        }
    }
}

/// `score / total` as a percentage rounded half up. An empty quiz scores 0.
pub fn percentage(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let score = u64::from(score.min(total));
    let total = u64::from(total);
    ((score * 200 + total) / (2 * total)) as u32
}

/// Text a player can paste to brag about today's result.
pub fn share_text(data: &CompletionData) -> String {
    format!(
        "I scored {}/{} ({}%) on today's FutQuiz! ⚽ Can you beat my score?",
        data.score,
        data.total_questions,
        percentage(data.score, data.total_questions)
    )
}

/// Time left until the next midnight in `now`'s offset, when a new quiz unlocks.
pub fn time_until_next_quiz(now: OffsetDateTime) -> Duration {
    let next_day = now.date().next_day().unwrap_or(now.date());
    let midnight = next_day.with_time(Time::MIDNIGHT).assume_offset(now.offset());
    midnight - now
}

/// `"{h}h {m}m"`, truncating seconds.
pub fn format_countdown(remaining: Duration) -> String {
    let minutes = remaining.whole_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Everything the completed screen shows about a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSummary {
    /// Correct answers.
    pub score: u32,
    /// Questions in the quiz.
    pub total: u32,
    /// Rounded percentage.
    pub percentage: u32,
    /// Verdict for `percentage`.
    pub rating: Rating,
}

impl From<&CompletionData> for ScoreSummary {
    fn from(data: &CompletionData) -> Self {
        let percentage = percentage(data.score, data.total_questions);
        Self {
            score: data.score,
            total: data.total_questions,
            percentage,
            rating: Rating::for_percentage(percentage),
        }
    }
}
