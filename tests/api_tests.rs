mod common;

use axum::{body::Body, http::{Request, StatusCode}};
use serde_json::json;
use tower::ServiceExt;

use common::{create_test_app, get, json_body, post_json};

#[tokio::test]
async fn healthcheck_reports_ok_with_a_store() {
    let app = create_test_app().await;

    let response = app.oneshot(get("/healthcheck")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn quiz_is_not_found_before_any_upload() {
    let app = create_test_app().await;

    let response = app.oneshot(get("/quiz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(json_body(response).await["message"].is_string());
}

#[tokio::test]
async fn seeded_quiz_is_served_and_graded() {
    let app = create_test_app().await;

    let seeded = app.clone().oneshot(post_json("/seed", json!({}))).await.unwrap();
    assert_eq!(seeded.status(), StatusCode::OK);
    let seeded = json_body(seeded).await;
    assert_eq!(seeded["success"], true);

    let response = app.clone().oneshot(get("/quiz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let quiz = json_body(response).await;
    assert_eq!(quiz["quizId"], seeded["quizId"]);
    assert_eq!(quiz["title"], "Quiz de hoy");
    let question = &quiz["questions"][0];
    assert!(
        question["options"]
            .as_array()
            .unwrap()
            .contains(&question["correctAnswer"])
    );

    let correct = app
        .clone()
        .oneshot(post_json(
            "/quiz/answer",
            json!({
                "questionId": question["id"],
                "selectedOption": question["correctAnswer"],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(correct.status(), StatusCode::OK);
    assert_eq!(json_body(correct).await["correct"], true);

    let empty = app
        .oneshot(post_json(
            "/quiz/answer",
            json!({ "questionId": question["id"], "selectedOption": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(json_body(empty).await["correct"], false);
}

#[tokio::test]
async fn answer_for_malformed_or_unknown_question_is_rejected() {
    let app = create_test_app().await;

    let malformed = app
        .clone()
        .oneshot(post_json(
            "/quiz/answer",
            json!({ "questionId": "not-a-uuid", "selectedOption": "Brasil" }),
        ))
        .await
        .unwrap();
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

    let unknown = app
        .oneshot(post_json(
            "/quiz/answer",
            json!({
                "questionId": "0b5f5d4e-6f0e-4c4b-9a55-6c2f1d3c7a10",
                "selectedOption": "Brasil",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn uploaded_quiz_becomes_the_latest_and_exposes_its_answer_key() {
    let app = create_test_app().await;
    let payload = json!({
        "title": "Copa América",
        "date": "2026-10-18",
        "gameId": "daily-trivia",
        "questions": [{
            "question": "Who won the 2024 Copa América?",
            "options": ["Argentina", "Colombia", "Uruguay"],
            "correctAnswer": "Argentina",
            "explanation": "Lautaro Martínez scored in extra time.",
            "difficulty": "easy",
            "category": "Copa América"
        }]
    });

    let uploaded = app.clone().oneshot(post_json("/quiz/upload", payload)).await.unwrap();
    assert_eq!(uploaded.status(), StatusCode::OK);

    let latest = json_body(app.clone().oneshot(get("/quiz")).await.unwrap()).await;
    assert_eq!(latest["title"], "Copa América");
    assert_eq!(latest["questions"][0]["explanation"], "Lautaro Martínez scored in extra time.");

    let key = json_body(app.oneshot(get("/quiz/answers")).await.unwrap()).await;
    assert_eq!(
        key,
        json!([{ "question": "Who won the 2024 Copa América?", "answer": "Argentina" }])
    );
}

#[tokio::test]
async fn upload_rejects_inconsistent_quizzes() {
    let app = create_test_app().await;
    let cases = [
        json!({ "title": "Empty", "questions": [] }),
        json!({
            "title": "Missing answer",
            "questions": [{
                "question": "Who won?",
                "options": ["Brasil", "Perú"],
                "correctAnswer": "Empate"
            }]
        }),
        json!({
            "title": "Bad date",
            "date": "18/10/2026",
            "questions": [{
                "question": "Who won?",
                "options": ["Brasil", "Perú"],
                "correctAnswer": "Brasil"
            }]
        }),
        json!({
            "title": "Unknown game",
            "gameId": "penalty-shootout",
            "questions": [{
                "question": "Who won?",
                "options": ["Brasil", "Perú"],
                "correctAnswer": "Brasil"
            }]
        }),
    ];

    for payload in cases {
        let response = app
            .clone()
            .oneshot(post_json("/quiz/upload", payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let latest = app.oneshot(get("/quiz")).await.unwrap();
    assert_eq!(latest.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn games_lists_the_catalog() {
    let app = create_test_app().await;

    let games = json_body(app.oneshot(get("/games")).await.unwrap()).await;

    let ids: Vec<_> = games
        .as_array()
        .unwrap()
        .iter()
        .map(|game| game["id"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(ids, ["daily-trivia", "player-guess", "club-quiz"]);
    assert_eq!(games[2]["available"], false);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = create_test_app().await;

    let response = app
        .oneshot(Request::builder().uri("/api-doc/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let doc = json_body(response).await;
    assert!(doc["paths"]["/quiz/upload"].is_object());
}
