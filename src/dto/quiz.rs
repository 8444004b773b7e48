//! Wire types of the quiz REST API, shared by the server routes and the HTTP gateway.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    dao::models::{QuestionEntity, QuizEntity},
    domain::{Difficulty, Question, Quiz},
    dto::{
        format_system_time,
        validation::{validate_options, validate_question},
    },
};

/// Optional filters accepted by `GET /quiz`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct QuizQuery {
    /// Only serve quizzes of this catalog game.
    pub game: Option<String>,
}

/// Active quiz as served to players.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    /// Quiz identifier.
    pub quiz_id: String,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Scheduled day (`YYYY-MM-DD`).
    #[serde(default)]
    pub date: Option<String>,
    /// Questions in play order.
    pub questions: Vec<QuestionPayload>,
}

/// A question of [`QuizResponse`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    /// Question identifier (UUID).
    pub id: String,
    /// Prompt.
    pub question: String,
    /// Options in display order.
    pub options: Vec<String>,
    /// Literal value of the correct option.
    pub correct_answer: String,
    /// Shown after answering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Difficulty tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    /// Category tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Body of `POST /quiz/answer`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    /// Question being answered.
    pub question_id: String,
    /// Option chosen by the player.
    pub selected_option: String,
}

/// Grading result of `POST /quiz/answer`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnswerResponse {
    /// Whether the option is the correct answer.
    pub correct: bool,
}

/// One line of the answer key returned by `GET /quiz/answers`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnswerKeyEntry {
    /// Question prompt.
    pub question: String,
    /// Its correct option.
    pub answer: String,
}

/// Body of `POST /quiz/upload`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadQuizRequest {
    /// Display title.
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    /// Calendar date (`YYYY-MM-DD`) the quiz is scheduled for.
    #[serde(default)]
    pub date: Option<String>,
    /// Catalog game the quiz belongs to.
    #[serde(default)]
    pub game_id: Option<String>,
    #[validate(length(min = 1, message = "a quiz needs at least one question"), nested)]
    /// Questions in play order.
    pub questions: Vec<UploadQuestionInput>,
}

/// Question definition inside [`UploadQuizRequest`].
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_question"))]
pub struct UploadQuestionInput {
    /// Prompt.
    #[validate(length(min = 1, message = "question text must not be empty"))]
    pub question: String,
    /// At least two distinct, non-blank options.
    #[validate(custom(function = "validate_options"))]
    pub options: Vec<String>,
    /// Must be one of `options`.
    pub correct_answer: String,
    /// Shown after answering.
    #[serde(default)]
    pub explanation: Option<String>,
    /// Difficulty tag.
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    /// Category tag.
    #[serde(default)]
    pub category: Option<String>,
}

/// Result of a successful upload or seed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadQuizResponse {
    /// Always `true`; failures are reported as errors.
    pub success: bool,
    /// Identifier of the stored quiz.
    pub quiz_id: String,
    /// RFC 3339 creation time.
    pub created_at: String,
}

impl From<QuestionEntity> for QuestionPayload {
    fn from(question: QuestionEntity) -> Self {
        Self {
            id: question.id.to_string(),
            question: question.text,
            options: question.options,
            correct_answer: question.correct,
            explanation: question.explanation,
            difficulty: question.difficulty,
            category: question.category,
        }
    }
}

impl From<QuizEntity> for QuizResponse {
    fn from(quiz: QuizEntity) -> Self {
        Self {
            quiz_id: quiz.id.to_string(),
            title: quiz.title,
            date: quiz.date,
            questions: quiz.questions.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&QuizEntity> for UploadQuizResponse {
    fn from(quiz: &QuizEntity) -> Self {
        Self {
            success: true,
            quiz_id: quiz.id.to_string(),
            created_at: format_system_time(quiz.created_at),
        }
    }
}

impl From<QuestionPayload> for Question {
    fn from(payload: QuestionPayload) -> Self {
        Self {
            id: payload.id,
            question: payload.question,
            options: payload.options,
            correct_answer: payload.correct_answer,
            explanation: payload.explanation,
            difficulty: payload.difficulty,
            category: payload.category,
        }
    }
}

impl From<QuizResponse> for Quiz {
    fn from(response: QuizResponse) -> Self {
        Self {
            id: response.quiz_id,
            date: response.date.unwrap_or_default(),
            title: response.title,
            description: None,
            questions: response.questions.into_iter().map(Into::into).collect(),
        }
    }
}
