use std::sync::Arc;

use tokio::net::TcpListener;

use futquiz::{
    build_router,
    client::gateway::{GatewayError, HttpQuizGateway, QuizGateway},
    config::AppConfig,
    dao::quiz_store::memory::MemoryQuizStore,
    services::quiz_service,
    state::{AppState, SharedState},
};

async fn serve() -> (SharedState, String) {
    let state = AppState::with_store(AppConfig::default(), Arc::new(MemoryQuizStore::new())).await;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });
    (state, format!("http://{addr}"))
}

#[tokio::test]
async fn gateway_reports_missing_quiz_as_not_found() {
    let (_state, url) = serve().await;
    let gateway = HttpQuizGateway::new(url).unwrap();

    let err = gateway.fetch_quiz(None).await.unwrap_err();

    assert!(matches!(err, GatewayError::NotFound(_)));
}

#[tokio::test]
async fn gateway_plays_against_a_live_server() {
    let (state, url) = serve().await;
    quiz_service::seed_quiz(&state).await.unwrap();
    let gateway = HttpQuizGateway::new(url).unwrap();

    let catalog = gateway.fetch_catalog().await.unwrap();
    assert_eq!(catalog[0].id, "daily-trivia");

    let quiz = gateway.fetch_quiz(Some("daily-trivia".into())).await.unwrap();
    assert_eq!(quiz.title, "Quiz de hoy");
    let question = &quiz.questions[0];
    assert!(
        gateway
            .submit_answer(question.id.clone(), question.correct_answer.clone())
            .await
            .unwrap()
    );

    let err = gateway
        .submit_answer("not-a-uuid".into(), "Brasil".into())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Status { status: 400, .. }));
}
