use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};

use crate::{
    domain::GameType,
    dto::quiz::{
        AnswerKeyEntry, AnswerRequest, AnswerResponse, QuizQuery, QuizResponse,
        UploadQuizRequest, UploadQuizResponse,
    },
    error::AppError,
    services::quiz_service,
    state::SharedState,
};

/// Quiz retrieval, grading and content routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/quiz", get(latest_quiz))
        .route("/quiz/answer", post(check_answer))
        .route("/quiz/answers", get(answer_key))
        .route("/quiz/upload", post(upload_quiz))
        .route("/seed", post(seed_quiz))
        .route("/games", get(list_games))
}

/// Return the quiz to play right now.
#[utoipa::path(
    get,
    path = "/quiz",
    tag = "quiz",
    params(QuizQuery),
    responses(
        (status = 200, description = "Latest quiz", body = QuizResponse),
        (status = 404, description = "No quiz available"),
        (status = 503, description = "Quiz store unavailable")
    )
)]
pub async fn latest_quiz(
    State(state): State<SharedState>,
    Query(query): Query<QuizQuery>,
) -> Result<Json<QuizResponse>, AppError> {
    Ok(Json(quiz_service::latest_quiz(&state, query.game).await?))
}

/// Grade one selected option.
#[utoipa::path(
    post,
    path = "/quiz/answer",
    tag = "quiz",
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Grading result", body = AnswerResponse),
        (status = 400, description = "Malformed question id"),
        (status = 404, description = "Unknown question")
    )
)]
pub async fn check_answer(
    State(state): State<SharedState>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    Ok(Json(quiz_service::check_answer(&state, payload).await?))
}

/// Answer key of the latest quiz.
#[utoipa::path(
    get,
    path = "/quiz/answers",
    tag = "quiz",
    responses(
        (status = 200, description = "Question and answer pairs", body = [AnswerKeyEntry]),
        (status = 404, description = "No quiz available")
    )
)]
pub async fn answer_key(
    State(state): State<SharedState>,
) -> Result<Json<Vec<AnswerKeyEntry>>, AppError> {
    Ok(Json(quiz_service::answer_key(&state).await?))
}

/// Store a new quiz.
#[utoipa::path(
    post,
    path = "/quiz/upload",
    tag = "content",
    request_body = UploadQuizRequest,
    responses(
        (status = 200, description = "Quiz stored", body = UploadQuizResponse),
        (status = 400, description = "Invalid quiz definition")
    )
)]
pub async fn upload_quiz(
    State(state): State<SharedState>,
    Json(payload): Json<UploadQuizRequest>,
) -> Result<Json<UploadQuizResponse>, AppError> {
    Ok(Json(quiz_service::upload_quiz(&state, payload).await?))
}

/// Insert a sample football quiz dated today.
#[utoipa::path(
    post,
    path = "/seed",
    tag = "content",
    responses((status = 200, description = "Sample quiz stored", body = UploadQuizResponse))
)]
pub async fn seed_quiz(
    State(state): State<SharedState>,
) -> Result<Json<UploadQuizResponse>, AppError> {
    Ok(Json(quiz_service::seed_quiz(&state).await?))
}

/// Game catalog.
#[utoipa::path(
    get,
    path = "/games",
    tag = "quiz",
    responses((status = 200, description = "Configured games", body = [GameType]))
)]
pub async fn list_games(State(state): State<SharedState>) -> Json<Vec<GameType>> {
    Json(quiz_service::list_games(&state))
}
