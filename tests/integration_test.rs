mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request};
use common::{app, chat_response, send, FakeUpstream, TWO_QUESTIONS};
use mock_test_generator::UpstreamResponse;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn generate_test_returns_questions_and_caches_them() {
    let upstream = FakeUpstream::always(chat_response(TWO_QUESTIONS));
    let app = app(upstream.clone());
    let body = json!({ "topic": "Data Structures", "difficulty": "easy", "numQuestions": 2 });

    let (status, first) = send(&app, Method::POST, "/api/generate-test", Some(body.clone())).await;
    assert_eq!(status, 200);
    assert_eq!(first["questions"].as_array().map(Vec::len), Some(2));
    assert_eq!(first["questions"][0]["question"], "What is LIFO?");
    assert!(first.get("note").is_none());

    let (_, second) = send(&app, Method::POST, "/api/generate-test", Some(body)).await;
    assert_eq!(first, second);
    assert_eq!(upstream.calls(), 1);

    let (_, health) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["cachedQuizzes"], 1);
    assert!(health["timestamp"].is_string());
}

#[tokio::test]
async fn generate_test_accepts_question_count_as_string() {
    let app = app(FakeUpstream::always(chat_response(TWO_QUESTIONS)));
    let body = json!({ "topic": "Stacks", "difficulty": "Medium", "numQuestions": "2" });

    let (status, value) = send(&app, Method::POST, "/api/generate-test", Some(body)).await;

    assert_eq!(status, 200);
    assert!(value["questions"].is_array());
}

#[tokio::test]
async fn generate_test_rejects_invalid_input() {
    let upstream = FakeUpstream::always(chat_response(TWO_QUESTIONS));
    let app = app(upstream.clone());

    let cases = [
        json!({ "difficulty": "easy", "numQuestions": 5 }),
        json!({ "topic": "Stacks", "numQuestions": 5 }),
        json!({ "topic": "Stacks", "difficulty": "easy" }),
        json!({ "topic": "Stacks", "difficulty": "easy", "numQuestions": 0 }),
        json!({ "topic": "Stacks", "difficulty": "easy", "numQuestions": 51 }),
        json!({ "topic": "Stacks", "difficulty": "easy", "numQuestions": "lots" }),
    ];

    for body in cases {
        let (status, value) = send(&app, Method::POST, "/api/generate-test", Some(body.clone())).await;
        assert_eq!(status, 400, "expected 400 for {body}");
        assert!(value["error"].is_string(), "expected error message for {body}");
    }
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn generate_test_serves_backup_questions_when_upstream_fails() {
    let upstream = FakeUpstream::always(UpstreamResponse::new(500, "boom"));
    let app = app(upstream.clone());
    let body = json!({ "topic": "Graphs", "difficulty": "hard", "numQuestions": 3 });

    let (status, value) = send(&app, Method::POST, "/api/generate-test", Some(body)).await;

    assert_eq!(status, 200);
    assert_eq!(value["note"], "Backup Mode");
    assert!(!value["questions"].as_array().unwrap().is_empty());
    assert_eq!(upstream.calls(), 3);

    let (_, health) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(health["cachedQuizzes"], 0);
}

#[tokio::test]
async fn register_then_login() {
    let app = app(FakeUpstream::always(chat_response(TWO_QUESTIONS)));
    let alice = json!({ "username": "alice", "password": "s3cret" });

    let (status, value) = send(&app, Method::POST, "/api/register", Some(alice.clone())).await;
    assert_eq!(status, 200);
    assert_eq!(value["success"], true);

    let (status, value) = send(&app, Method::POST, "/api/register", Some(alice.clone())).await;
    assert_eq!(status, 400);
    assert_eq!(value["error"], "Username already exists");

    let (status, value) = send(&app, Method::POST, "/api/login", Some(alice)).await;
    assert_eq!(status, 200);
    assert_eq!(value["username"], "alice");

    let wrong = json!({ "username": "alice", "password": "guess" });
    let (status, value) = send(&app, Method::POST, "/api/login", Some(wrong)).await;
    assert_eq!(status, 400);
    assert_eq!(value["error"], "Invalid password");

    let unknown = json!({ "username": "bob", "password": "x" });
    let (_, value) = send(&app, Method::POST, "/api/login", Some(unknown)).await;
    assert_eq!(value["error"], "User not found");

    let (status, value) = send(&app, Method::POST, "/api/register", Some(json!({ "username": "carol" }))).await;
    assert_eq!(status, 400);
    assert_eq!(value["error"], "Missing fields");
}

#[tokio::test]
async fn saved_results_are_listed_newest_first() {
    let app = app(FakeUpstream::always(chat_response(TWO_QUESTIONS)));

    for (topic, score) in [("Stacks", 3), ("Queues", 4)] {
        let body = json!({ "username": "alice", "topic": topic, "score": score, "total": 5 });
        let (status, value) = send(&app, Method::POST, "/api/save-result", Some(body)).await;
        assert_eq!(status, 200);
        assert_eq!(value["success"], true);
    }
    let other = json!({ "username": "bob", "topic": "Trees", "score": 1, "total": 5 });
    send(&app, Method::POST, "/api/save-result", Some(other)).await;

    let (status, value) = send(&app, Method::GET, "/api/results?username=alice", None).await;
    assert_eq!(status, 200);
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["topic"], "Queues");
    assert_eq!(rows[1]["topic"], "Stacks");

    let (status, _) = send(&app, Method::GET, "/api/results", None).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn save_result_rejects_missing_fields() {
    let app = app(FakeUpstream::always(chat_response(TWO_QUESTIONS)));
    let body = json!({ "username": "", "topic": "Stacks", "score": 1, "total": 2 });

    let (status, value) = send(&app, Method::POST, "/api/save-result", Some(body)).await;

    assert_eq!(status, 400);
    assert_eq!(value["error"], "Missing fields");
}

#[tokio::test]
async fn grade_test_scores_and_saves_in_background() {
    let app = app(FakeUpstream::always(chat_response(TWO_QUESTIONS)));
    let body = json!({
        "questions": [
            { "question": "Capital of France?", "options": ["Paris", "Lyon"], "correct": "A", "explanation": "" },
            { "question": "Capital of Spain?", "options": ["Madrid", "Rome"], "correct": "Madrid", "explanation": "" }
        ],
        "submissions": [
            { "questionIndex": 0, "selectedText": "Paris" },
            { "questionIndex": 1, "selectedText": null }
        ],
        "username": "alice",
        "topic": "Capitals"
    });

    let (status, value) = send(&app, Method::POST, "/api/grade-test", Some(body)).await;

    assert_eq!(status, 200);
    assert_eq!(value["score"], 1);
    assert_eq!(value["total"], 2);
    assert_eq!(value["percentage"], 50);
    assert_eq!(value["verdicts"][0]["matchStrategy"], "letterIndex");
    assert_eq!(value["verdicts"][1]["isCorrect"], false);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let (_, history) = send(&app, Method::GET, "/api/results?username=alice", None).await;
    assert_eq!(history[0]["topic"], "Capitals");
    assert_eq!(history[0]["score"], 1);
}

#[tokio::test]
async fn cross_origin_preflight_is_allowed() {
    let app = app(FakeUpstream::always(chat_response(TWO_QUESTIONS)));
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/generate-test")
        .header("origin", "http://localhost:8080")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert!(response.headers().contains_key("access-control-allow-methods"));

    let (status, value) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, 200);
    assert_eq!(value["status"], "ok");
}
