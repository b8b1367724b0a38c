//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws` (one quiz session per socket)
/// - Health probes at `/health` and `/health/ready`
/// - Session and chat API under `/api/v1/...`
/// - Static frontend from `static_dir` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>, static_dir: &str) -> Router {
    let static_service = ServeDir::new(static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(format!("{static_dir}/index.html")));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // Health
        .route("/health", get(http::http_health))
        .route("/health/ready", get(http::http_ready))
        // Sessions
        .route("/api/v1/sessions/create", post(http::http_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(http::http_get_session).delete(http::http_delete_session),
        )
        .route("/api/v1/sessions/:id/reset", post(http::http_reset_session))
        .route("/api/v1/sessions/:id/analytics", get(http::http_session_analytics))
        // Chat
        .route("/api/v1/chat/select-field", post(http::http_select_field))
        .route("/api/v1/chat/answer", post(http::http_submit_answer))
        .route("/api/v1/chat/message", post(http::http_chat_message))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::QuizConfig;

    fn app() -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState::from_config(QuizConfig::default()).expect("default config is valid"));
        (build_router(state.clone(), "./static"), state)
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    async fn pending_answer(state: &AppState, id: &str) -> String {
        let handle = state.get_session(id).await.expect("registered");
        let session = handle.lock().await;
        session.state().current_question.as_ref().expect("pending").correct_answer.clone()
    }

    #[tokio::test]
    async fn health_endpoints() {
        let (app, _) = app();
        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = call(&app, Method::GET, "/health/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["questions"], 16);
        assert_eq!(body["fields"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn full_http_round_trip() {
        let (app, state) = app();
        let (status, created) =
            call(&app, Method::POST, "/api/v1/sessions/create", Some(json!({ "user_id": "u1" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["session"]["id"].as_str().unwrap().to_string();
        assert_eq!(created["session"]["user_id"], "u1");
        assert_eq!(created["session"]["phase"], "not_started");

        let (status, sel) = call(
            &app,
            Method::POST,
            "/api/v1/chat/select-field",
            Some(json!({ "session_id": id, "field": "math" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sel["question"]["field"], "math");
        assert!(sel["question"].get("correct_answer").is_none());
        assert!(sel["question"].get("answer").is_none());

        let expected = pending_answer(&state, &id).await;
        let (status, res) = call(
            &app,
            Method::POST,
            "/api/v1/chat/answer",
            Some(json!({ "session_id": id, "answer": expected })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(res["is_correct"], true);
        assert_eq!(res["expected"], expected.as_str());

        let (status, view) = call(&app, Method::GET, &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["total_questions"], 1);
        assert_eq!(view["phase"], "awaiting_answer");

        let (status, report) = call(&app, Method::GET, &format!("/api/v1/sessions/{id}/analytics"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["correct_answers"], 1);

        let (status, reset) = call(&app, Method::POST, &format!("/api/v1/sessions/{id}/reset"), None).await;
        assert_eq!(status, StatusCode::OK);
        let new_id = reset["session"]["id"].as_str().unwrap().to_string();
        assert_ne!(new_id, id);

        let (status, _) = call(&app, Method::DELETE, &format!("/api/v1/sessions/{new_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = call(&app, Method::GET, &format!("/api/v1/sessions/{new_id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains(&new_id));
    }

    #[tokio::test]
    async fn create_accepts_an_empty_body() {
        let (app, _) = app();
        let (status, created) = call(&app, Method::POST, "/api/v1/sessions/create", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(created["session"].get("user_id").is_none());
        assert!(created["message"].as_str().unwrap().starts_with("Hello!"));
    }

    #[tokio::test]
    async fn errors_map_to_status_codes() {
        let (app, _) = app();
        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/chat/answer",
            Some(json!({ "session_id": "missing", "answer": "1" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, created) = call(&app, Method::POST, "/api/v1/sessions/create", None).await;
        let id = created["session"]["id"].as_str().unwrap().to_string();

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/chat/answer",
            Some(json!({ "session_id": id, "answer": "1" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].is_string());

        call(&app, Method::POST, "/api/v1/chat/select-field", Some(json!({ "session_id": id, "field": "logic" }))).await;
        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/chat/answer",
            Some(json!({ "session_id": id, "answer": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/chat/select-field",
            Some(json!({ "session_id": id, "field": "history" })),
        )
        .await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn chat_message_endpoint() {
        let (app, _) = app();
        let (_, created) = call(&app, Method::POST, "/api/v1/sessions/create", None).await;
        let id = created["session"]["id"].as_str().unwrap().to_string();

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/chat/message",
            Some(json!({ "session_id": id, "message": "I pick programming", "field": "programming" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["question"]["field"], "programming");
        assert_eq!(body["session_stats"]["total_questions"], 0);
    }
}
