// tests/router_tests.rs

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use quiz_backend::{
    config::Config,
    engine::{ExamEngine, ExamSettings},
    routes,
    seed::parse_seed,
    state::AppState,
    store::{MemoryStore, QuestionBank},
};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app() -> Router {
    let store = MemoryStore::new();
    let bank = parse_seed(
        r#"[{"id": "R1", "questionText": "Pick a", "options": [{"id": "a", "text": "a"}, {"id": "b", "text": "b"}], "correctOptionIds": ["a"]}]"#,
    )
    .unwrap();
    store.insert_questions(bank).await.unwrap();

    let config = Config::default();
    let engine = ExamEngine::new(Arc::new(store), ExamSettings::from(&config));
    routes::create_router(AppState::new(engine, config))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// The `sq_uid` value of the response's `Set-Cookie`, if any.
fn cookie_id(response: &axum::response::Response) -> Option<String> {
    let value = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    let pair = value.split(';').next()?;
    pair.strip_prefix("sq_uid=").map(String::from)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn start_with_malformed_body_is_rejected() {
    let response = app()
        .await
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/exams")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["kind"], "invalid_input");
}

#[tokio::test]
async fn oversized_count_is_clamped_to_bank() {
    let response = app()
        .await
        .oneshot(post_json(
            "/api/v1/exams",
            json!({ "count": 100000, "durationSeconds": 99999999, "seed": 42 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["orderedQuestions"].as_array().unwrap().len(), 1);
    assert_eq!(body["durationSec"], 99999999);
}

#[tokio::test]
async fn non_positive_count_uses_default() {
    let response = app()
        .await
        .oneshot(post_json("/api/v1/exams", json!({ "count": 0, "durationSeconds": -5 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["orderedQuestions"].as_array().unwrap().len(), 1);
    assert_eq!(body["durationSec"], 10800);
}

#[tokio::test]
async fn evaluate_without_content_type_is_bad_request() {
    let response = app()
        .await
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/learn/answer")
                .body(Body::from(r#"{"questionId": "R1", "selectedOptionKeys": ["a"]}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_public_id_gets_a_fresh_one() {
    let long = "x".repeat(65);
    let response = app()
        .await
        .oneshot(
            Request::builder()
                .uri("/api/v1/stats")
                .header("X-Public-Id", long.as_str())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let minted = cookie_id(&response).unwrap();
    assert_ne!(minted, long);
    assert_eq!(minted.len(), 36);
    assert_eq!(body_json(response).await["totalExams"], 0);
}

#[tokio::test]
async fn anonymous_start_sets_cookie_that_lists_the_session() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(post_json("/api/v1/exams", json!({ "seed": 1 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let set_cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with("sq_uid="));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("Max-Age=31536000"));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    let public_id = cookie_id(&response).unwrap();
    let exam_id = body_json(response).await["examId"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/exams")
                .header(header::COOKIE, format!("sq_uid={}", public_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    // A valid cookie is not re-issued
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let list = body_json(response).await;
    assert_eq!(list["total"], 1);
    assert_eq!(list["items"][0]["id"], exam_id.as_str());

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/exams/{}", exam_id))
                .header(header::COOKIE, format!("sq_uid={}", public_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn header_identity_refreshes_cookie() {
    let response = app()
        .await
        .oneshot(
            Request::builder()
                .uri("/api/v1/stats")
                .header("X-Public-Id", "alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(cookie_id(&response).as_deref(), Some("alice"));
}

#[tokio::test]
async fn secure_cookies_are_cross_site() {
    let store = MemoryStore::new();
    let config = Config {
        secure_cookies: true,
        ..Config::default()
    };
    let engine = ExamEngine::new(Arc::new(store), ExamSettings::from(&config));
    let response = routes::create_router(AppState::new(engine, config))
        .oneshot(Request::builder().uri("/api/v1/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let set_cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.ends_with("SameSite=None; Secure"));
}

#[tokio::test]
async fn export_key_and_restore() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/me/export-key")
                .header(header::COOKIE, "sq_uid=dave")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["publicId"], "dave");

    let response = app
        .clone()
        .oneshot(post_json("/api/v1/me/restore", json!({ "publicId": "dave" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    // Only the restored id is written, not the one minted for this request
    let cookies: Vec<_> = response.headers().get_all(header::SET_COOKIE).iter().collect();
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookie_id(&response).as_deref(), Some("dave"));
    assert_eq!(body_json(response).await["status"], "restored");

    let response = app
        .clone()
        .oneshot(post_json("/api/v1/me/restore", json!({ "publicId": "" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json("/api/v1/me/restore", json!({ "publicId": "a;b" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["kind"], "invalid_input");
}

#[tokio::test]
async fn empty_stats_for_new_identity() {
    let response = app()
        .await
        .oneshot(
            Request::builder()
                .uri("/api/v1/stats")
                .header("X-Public-Id", "newcomer")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["totalExams"], 0);
    assert!(body.get("passRate").is_none());
    assert!(body.get("accuracyOverall").is_none());
}

#[tokio::test]
async fn cors_preflight_allows_public_id_header() {
    let response = app()
        .await
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/v1/exams")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-public-id")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );
}
