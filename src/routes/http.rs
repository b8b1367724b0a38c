//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs its parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument, warn};

use crate::analytics::PerformanceReport;
use crate::error::ApiError;
use crate::logic;
use crate::protocol::*;
use crate::state::AppState;
use crate::util::now_ms;

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Session(_) => StatusCode::CONFLICT,
    };
    warn!(target: "iqfield_backend", status = status.as_u16(), error = %self, "Request rejected");
    (status, Json(ErrorOut { error: self.to_string() })).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { status: "healthy", timestamp_ms: now_ms(), service: "iqfield-backend" })
}

#[instrument(level = "info", skip(state))]
pub async fn http_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(ReadyOut {
    status: "ready",
    timestamp_ms: now_ms(),
    questions: state.bank.question_count(),
    fields: state.bank.populated_fields(),
    active_sessions: state.session_count().await,
  })
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_create_session(
  State(state): State<Arc<AppState>>,
  body: Option<Json<SessionCreateIn>>,
) -> impl IntoResponse {
  let user_id = body.and_then(|Json(b)| b.user_id);
  let out = logic::create_session(&state, user_id).await;
  info!(target: "quiz", session_id = %out.session.id, "HTTP session created");
  (StatusCode::CREATED, Json(out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
  logic::get_session_view(&state, &session_id).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_session(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<Json<MessageOut>, ApiError> {
  logic::delete_session(&state, &session_id).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn http_reset_session(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<Json<SessionOut>, ApiError> {
  let out = logic::reset_session(&state, &session_id).await?;
  info!(target: "quiz", old_id = %session_id, new_id = %out.session.id, "HTTP session reset");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_session_analytics(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<Json<PerformanceReport>, ApiError> {
  logic::session_analytics(&state, &session_id).await.map(Json)
}

#[instrument(level = "info", skip(state, body), fields(session_id = %body.session_id, field = %body.field))]
pub async fn http_select_field(
  State(state): State<Arc<AppState>>,
  Json(body): Json<FieldSelectionIn>,
) -> Result<Json<FieldSelectionOut>, ApiError> {
  let out = logic::select_field(&state, &body.session_id, body.field).await?;
  info!(target: "quiz", session_id = %out.session_id, question_id = %out.question.id, "HTTP field selected");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(session_id = %body.session_id, answer_len = body.answer.len()))]
pub async fn http_submit_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<AnswerResultOut>, ApiError> {
  let out = logic::submit_answer(&state, &body.session_id, &body.answer).await?;
  info!(target: "quiz", session_id = %out.session_id, correct = out.is_correct, score = out.score, "HTTP answer evaluated");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(session_id = %body.session_id, message_len = body.message.len()))]
pub async fn http_chat_message(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ChatIn>,
) -> Result<Json<ChatOut>, ApiError> {
  logic::chat_message(&state, &body.session_id, &body.message, body.field).await.map(Json)
}
