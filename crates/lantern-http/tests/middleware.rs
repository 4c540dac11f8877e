//! End-to-end middleware tests over an axum router.
//!
//! Requests are driven with `tower::ServiceExt::oneshot`; emitted log
//! lines are captured with an in-memory transport instead of the console.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::{Json, Router, middleware};
use http_body_util::BodyExt;
use lantern_http::{RequestLogging, assign_request_id, open_context};
use lantern_telemetry::{Environment, Level, Logger, TelemetryConfig, context};
use serde_json::{Value, json};
use tower::ServiceExt;

fn unit_config() -> TelemetryConfig {
    TelemetryConfig::new(Environment::Unit)
}

/// Wrap a router with the correlation stack in its documented order.
fn correlated(router: Router) -> Router {
    router
        .layer(middleware::from_fn(assign_request_id))
        .layer(middleware::from_fn(open_context))
}

fn request_to(path: &str) -> Request<Body> {
    Request::get(path).body(Body::empty()).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn request_ids_are_assigned_and_unique() {
    async fn show_id() -> String {
        context::request_id().unwrap_or_default()
    }

    let app = correlated(Router::new().route("/", get(show_id)));

    let first = body_string(app.clone().oneshot(request_to("/")).await.unwrap()).await;
    let second = body_string(app.oneshot(request_to("/")).await.unwrap()).await;

    assert!(uuid::Uuid::parse_str(&first).is_ok(), "not a UUID: {first}");
    assert!(uuid::Uuid::parse_str(&second).is_ok());
    assert_ne!(first, second);
}

#[tokio::test]
async fn concurrent_requests_keep_distinct_identifiers() {
    async fn slow_id() -> String {
        let before = context::request_id().unwrap_or_default();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let after = context::request_id().unwrap_or_default();
        assert_eq!(before, after, "identifier changed across an await");
        after
    }

    let app = correlated(Router::new().route("/", get(slow_id)));

    let (first, second) = tokio::join!(
        app.clone().oneshot(request_to("/")),
        app.clone().oneshot(request_to("/"))
    );
    let first = body_string(first.unwrap()).await;
    let second = body_string(second.unwrap()).await;

    assert!(!first.is_empty());
    assert_ne!(first, second);
}

#[tokio::test]
async fn scope_does_not_leak_past_the_request() {
    let app = correlated(Router::new().route("/", get(|| async { "ok" })));
    let _ = app.oneshot(request_to("/")).await.unwrap();
    assert_eq!(context::request_id(), None);
}

#[tokio::test]
async fn request_logger_emits_sanitized_http_entry() {
    let (logger, capture) = Logger::in_memory("http", &unit_config());
    let app = Router::new()
        .route("/hello", get(|| async { "hello" }))
        .layer(RequestLogging::new(logger).layer());

    let request = Request::get("/hello?page=2")
        .header("authorization", "Bearer super-secret-token")
        .header("cookie", "AccessToken=abc123; Theme=dark")
        .header("if-none-match", "W/\"etag-1\"")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let lines = capture.lines();
    assert_eq!(lines.len(), 1);
    let (level, line) = &lines[0];
    assert_eq!(*level, Level::Http);

    assert!(line.contains("GET /hello?page=2"));
    assert!(line.contains("Bearer [REDACTED]"));
    assert!(!line.contains("super-secret-token"));
    assert!(line.contains("AccessToken=REDACTED"));
    assert!(line.contains("Theme=dark"));
    assert!(!line.contains("abc123"));
    assert!(line.contains("EXCLUDED"));
    assert!(line.contains(r#""statusCode":200"#));
    assert!(line.contains("responseTime"));
}

#[tokio::test]
async fn http_entries_carry_the_request_identifier() {
    let (logger, capture) = Logger::in_memory("http", &unit_config());
    let app = correlated(
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(RequestLogging::new(logger).layer()),
    );

    let _ = app.clone().oneshot(request_to("/")).await.unwrap();
    let _ = app.oneshot(request_to("/")).await.unwrap();

    let lines = capture.lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].1.contains(r#""requestId":""#));
    assert!(lines[1].1.contains(r#""requestId":""#));
    assert_ne!(lines[0].1, lines[1].1, "identifiers should differ");
}

#[tokio::test]
async fn ignored_routes_stay_silent() {
    let (logger, capture) = Logger::in_memory("http", &unit_config());
    let options =
        RequestLogging::new(logger).with_ignore_route(|_, uri| uri.path() == "/health");
    let app = Router::new()
        .route("/health", get(|| async { "up" }))
        .route("/work", get(|| async { "done" }))
        .layer(options.layer());

    let _ = app.clone().oneshot(request_to("/health")).await.unwrap();
    assert!(capture.is_empty());

    let _ = app.oneshot(request_to("/work")).await.unwrap();
    assert_eq!(capture.lines().len(), 1);
}

#[tokio::test]
async fn captured_response_bodies_are_redacted_but_delivered_intact() {
    async fn login() -> Json<Value> {
        Json(json!({ "password": "hunter2", "username": "alice" }))
    }

    let (logger, capture) = Logger::in_memory("http", &unit_config());
    let options = RequestLogging::new(logger)
        .with_response_body(true)
        .with_body_blacklist(["password"]);
    let app = Router::new()
        .route("/login", get(login))
        .layer(options.layer());

    let response = app.oneshot(request_to("/login")).await.unwrap();
    let body = body_string(response).await;
    assert!(body.contains("hunter2"), "client body must be unredacted");

    let (_, line) = &capture.lines()[0];
    assert!(line.contains(r#""password":"REDACTED""#));
    assert!(!line.contains("hunter2"));
    assert!(line.contains("alice"));
}

#[tokio::test]
async fn blacklisted_headers_are_dropped_from_metadata() {
    let (logger, capture) = Logger::in_memory("http", &unit_config());
    let options = RequestLogging::new(logger).with_header_blacklist(["x-internal-token"]);
    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .layer(options.layer());

    let request = Request::get("/")
        .header("x-internal-token", "sekrit")
        .header("accept", "text/plain")
        .body(Body::empty())
        .unwrap();
    let _ = app.oneshot(request).await.unwrap();

    let (_, line) = &capture.lines()[0];
    assert!(!line.contains("x-internal-token"));
    assert!(!line.contains("sekrit"));
    assert!(line.contains("text/plain"));
}

#[tokio::test]
async fn disabling_meta_keeps_only_the_message() {
    let (logger, capture) = Logger::in_memory("http", &unit_config());
    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .layer(RequestLogging::new(logger).with_meta(false).layer());

    let _ = app.oneshot(request_to("/")).await.unwrap();

    let (_, line) = &capture.lines()[0];
    assert!(line.contains("GET /"));
    assert!(!line.contains("statusCode"));
    assert!(!line.contains("responseTime"));
}

#[tokio::test]
async fn error_statuses_still_produce_one_entry() {
    async fn missing() -> StatusCode {
        StatusCode::NOT_FOUND
    }

    let (logger, capture) = Logger::in_memory("http", &unit_config());
    let app = Router::new()
        .route("/gone", get(missing))
        .layer(RequestLogging::new(logger).layer());

    let response = app.oneshot(request_to("/gone")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let lines = capture.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].1.contains(r#""statusCode":404"#));
}
