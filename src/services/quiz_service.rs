//! Business logic behind the quiz REST routes: serving the latest quiz,
//! grading answers, and accepting new content.

use std::time::SystemTime;

use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{QuestionEntity, QuizEntity},
    domain::{Difficulty, GameType, format_date, parse_date},
    dto::quiz::{
        AnswerKeyEntry, AnswerRequest, AnswerResponse, QuizResponse, UploadQuestionInput,
        UploadQuizRequest, UploadQuizResponse,
    },
    error::ServiceError,
    state::SharedState,
};

/// Game the seeded sample quiz is filed under.
const SEED_GAME_ID: &str = "daily-trivia";

async fn latest_entity(
    state: &SharedState,
    game_id: Option<String>,
) -> Result<QuizEntity, ServiceError> {
    let store = state.require_quiz_store().await?;
    let filter = game_id.clone();
    store.latest_quiz(filter).await?.ok_or_else(|| match game_id {
        Some(game) => ServiceError::NotFound(format!("no quiz available for game `{game}`")),
        None => ServiceError::NotFound("no quiz available".into()),
    })
}

/// Latest quiz, optionally restricted to one catalog game.
pub async fn latest_quiz(
    state: &SharedState,
    game_id: Option<String>,
) -> Result<QuizResponse, ServiceError> {
    let quiz = latest_entity(state, game_id).await?;
    debug!(quiz_id = %quiz.id, questions = quiz.questions.len(), "serving latest quiz");
    Ok(quiz.into())
}

/// Grade `selected_option` against the stored correct answer.
pub async fn check_answer(
    state: &SharedState,
    request: AnswerRequest,
) -> Result<AnswerResponse, ServiceError> {
    let id = Uuid::parse_str(&request.question_id).map_err(|_| {
        ServiceError::InvalidInput(format!(
            "`{}` is not a valid question id",
            request.question_id
        ))
    })?;

    let store = state.require_quiz_store().await?;
    let question = store
        .find_question(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("question `{id}` not found")))?;

    let correct = !request.selected_option.is_empty() && question.correct == request.selected_option;
    debug!(question_id = %id, correct, "graded answer");
    Ok(AnswerResponse { correct })
}

/// Question/answer pairs of the latest quiz.
pub async fn answer_key(state: &SharedState) -> Result<Vec<AnswerKeyEntry>, ServiceError> {
    let quiz = latest_entity(state, None).await?;
    Ok(quiz
        .questions
        .into_iter()
        .map(|question| AnswerKeyEntry {
            question: question.text,
            answer: question.correct,
        })
        .collect())
}

/// Validate and store an uploaded quiz.
pub async fn upload_quiz(
    state: &SharedState,
    payload: UploadQuizRequest,
) -> Result<UploadQuizResponse, ServiceError> {
    payload.validate()?;

    if let Some(date) = payload.date.as_deref() {
        if parse_date(date).is_none() {
            return Err(ServiceError::InvalidInput(format!(
                "date `{date}` is not a valid YYYY-MM-DD day"
            )));
        }
    }
    if let Some(game_id) = payload.game_id.as_deref() {
        ensure_known_game(state, game_id)?;
    }

    let quiz = build_entity(
        payload.title,
        payload.date,
        payload.game_id,
        payload.questions,
    );
    store_quiz(state, quiz).await
}

/// Insert a small football quiz dated today.
pub async fn seed_quiz(state: &SharedState) -> Result<UploadQuizResponse, ServiceError> {
    let today = format_date(OffsetDateTime::now_utc().date());
    let quiz = build_entity(
        "Quiz de hoy".into(),
        Some(today),
        Some(SEED_GAME_ID.into()),
        sample_questions(),
    );
    store_quiz(state, quiz).await
}

/// Configured game catalog in display order.
pub fn list_games(state: &SharedState) -> Vec<GameType> {
    state.config().games()
}

fn ensure_known_game(state: &SharedState, game_id: &str) -> Result<(), ServiceError> {
    if state.config().game(game_id).is_some() {
        Ok(())
    } else {
        Err(ServiceError::InvalidInput(format!(
            "game `{game_id}` is not part of the catalog"
        )))
    }
}

async fn store_quiz(
    state: &SharedState,
    quiz: QuizEntity,
) -> Result<UploadQuizResponse, ServiceError> {
    let store = state.require_quiz_store().await?;
    let response = UploadQuizResponse::from(&quiz);
    let (id, questions) = (quiz.id, quiz.questions.len());
    store.insert_quiz(quiz).await?;
    info!(quiz_id = %id, questions, "stored quiz");
    Ok(response)
}

fn build_entity(
    title: String,
    date: Option<String>,
    game_id: Option<String>,
    questions: Vec<UploadQuestionInput>,
) -> QuizEntity {
    let quiz_id = Uuid::new_v4();
    QuizEntity {
        id: quiz_id,
        title,
        date,
        game_id,
        created_at: SystemTime::now(),
        questions: questions
            .into_iter()
            .map(|input| QuestionEntity {
                id: Uuid::new_v4(),
                quiz_id,
                text: input.question,
                options: input.options,
                correct: input.correct_answer,
                explanation: input.explanation,
                difficulty: input.difficulty,
                category: input.category,
            })
            .collect(),
    }
}

fn sample_questions() -> Vec<UploadQuestionInput> {
    fn question(
        text: &str,
        options: [&str; 4],
        correct: &str,
        explanation: &str,
        difficulty: Difficulty,
        category: &str,
    ) -> UploadQuestionInput {
        UploadQuestionInput {
            question: text.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer: correct.into(),
            explanation: Some(explanation.into()),
            difficulty: Some(difficulty),
            category: Some(category.into()),
        }
    }

    vec![
        question(
            "¿Quién ganó el clásico?",
            ["Brasil", "Perú", "Empate", "Otro"],
            "Brasil",
            "Brasil se impuso en el último clásico sudamericano.",
            Difficulty::Easy,
            "Fútbol",
        ),
        question(
            "Which country won the 2022 FIFA World Cup?",
            ["France", "Argentina", "Croatia", "Morocco"],
            "Argentina",
            "Argentina beat France on penalties in the final in Lusail.",
            Difficulty::Easy,
            "World Cup",
        ),
        question(
            "Which club has won the most UEFA Champions League titles?",
            ["AC Milan", "Bayern Munich", "Real Madrid", "Liverpool"],
            "Real Madrid",
            "Real Madrid have lifted the European Cup more than any other club.",
            Difficulty::Medium,
            "Club football",
        ),
        question(
            "Who is the all-time top scorer of the Premier League?",
            ["Wayne Rooney", "Alan Shearer", "Harry Kane", "Thierry Henry"],
            "Alan Shearer",
            "Alan Shearer scored 260 Premier League goals.",
            Difficulty::Hard,
            "Records",
        ),
    ]
}
