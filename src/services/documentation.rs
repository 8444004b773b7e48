use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI document for the FutQuiz server.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::quiz::latest_quiz,
        crate::routes::quiz::check_answer,
        crate::routes::quiz::answer_key,
        crate::routes::quiz::upload_quiz,
        crate::routes::quiz::seed_quiz,
        crate::routes::quiz::list_games,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::quiz::QuizResponse,
            crate::dto::quiz::QuestionPayload,
            crate::dto::quiz::AnswerRequest,
            crate::dto::quiz::AnswerResponse,
            crate::dto::quiz::AnswerKeyEntry,
            crate::dto::quiz::UploadQuizRequest,
            crate::dto::quiz::UploadQuestionInput,
            crate::dto::quiz::UploadQuizResponse,
            crate::domain::GameType,
            crate::domain::Difficulty,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "quiz", description = "Daily quiz retrieval and grading"),
        (name = "content", description = "Quiz upload and seeding"),
    )
)]
pub struct ApiDoc;
