use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::MongoDaoError;
use crate::{
    dao::models::{QuestionEntity, QuizEntity},
    domain::Difficulty,
};

/// Quiz document, questions embedded in play order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoQuizDocument {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    game_id: Option<String>,
    created_at: DateTime,
    questions: Vec<MongoQuestionDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoQuestionDocument {
    id: String,
    text: String,
    options: Vec<String>,
    correct: String,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    difficulty: Option<Difficulty>,
    #[serde(default)]
    category: Option<String>,
}

impl From<QuizEntity> for MongoQuizDocument {
    fn from(value: QuizEntity) -> Self {
        Self {
            id: value.id.to_string(),
            title: value.title,
            date: value.date,
            game_id: value.game_id,
            created_at: DateTime::from_system_time(value.created_at),
            questions: value
                .questions
                .into_iter()
                .map(|question| MongoQuestionDocument {
                    id: question.id.to_string(),
                    text: question.text,
                    options: question.options,
                    correct: question.correct,
                    explanation: question.explanation,
                    difficulty: question.difficulty,
                    category: question.category,
                })
                .collect(),
        }
    }
}

impl TryFrom<MongoQuizDocument> for QuizEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoQuizDocument) -> Result<Self, Self::Error> {
        let id = parse_id(&value.id)?;
        let questions = value
            .questions
            .into_iter()
            .map(|question| {
                Ok(QuestionEntity {
                    id: parse_id(&question.id)?,
                    quiz_id: id,
                    text: question.text,
                    options: question.options,
                    correct: question.correct,
                    explanation: question.explanation,
                    difficulty: question.difficulty,
                    category: question.category,
                })
            })
            .collect::<Result<Vec<_>, MongoDaoError>>()?;

        Ok(Self {
            id,
            title: value.title,
            date: value.date,
            game_id: value.game_id,
            created_at: value.created_at.to_system_time(),
            questions,
        })
    }
}

fn parse_id(raw: &str) -> Result<Uuid, MongoDaoError> {
    Uuid::parse_str(raw).map_err(|_| MongoDaoError::Malformed {
        id: raw.to_owned(),
        reason: "identifier is not a UUID",
    })
}

pub fn question_filter(id: Uuid) -> Document {
    doc! {"questions.id": id.to_string()}
}

pub fn game_filter(game_id: Option<&str>) -> Document {
    match game_id {
        Some(game_id) => doc! {"game_id": game_id},
        None => doc! {},
    }
}
