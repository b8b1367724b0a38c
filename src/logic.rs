//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! HTTP handlers resolve the session by id on every request, while a WebSocket
//! keeps its handle for the life of the socket. Either way the transition runs
//! through the `*_locked` functions below on an already locked `Session`.

use tracing::{info, instrument};

use crate::analytics::{summarize, PerformanceReport};
use crate::domain::Field;
use crate::error::{ApiError, SessionError};
use crate::protocol::*;
use crate::session::{Phase, Session};
use crate::state::{AppState, SessionHandle};
use crate::util::now_ms;

pub async fn lookup(state: &AppState, session_id: &str) -> Result<SessionHandle, ApiError> {
  state
    .get_session(session_id)
    .await
    .ok_or_else(|| ApiError::SessionNotFound(session_id.to_string()))
}

#[instrument(level = "info", skip(state))]
pub async fn create_session(state: &AppState, user_id: Option<String>) -> SessionOut {
  let (_, handle) = state.create_session(user_id).await;
  let session = handle.lock().await;
  SessionOut { session: session_view(session.state()), message: session.last_bot_text().to_string() }
}

#[instrument(level = "info", skip(state))]
pub async fn get_session_view(state: &AppState, session_id: &str) -> Result<SessionView, ApiError> {
  let handle = lookup(state, session_id).await?;
  let session = handle.lock().await;
  Ok(session_view(session.state()))
}

#[instrument(level = "info", skip(state))]
pub async fn delete_session(state: &AppState, session_id: &str) -> Result<MessageOut, ApiError> {
  if state.remove_session(session_id).await {
    Ok(MessageOut { message: "Session deleted successfully".into() })
  } else {
    Err(ApiError::SessionNotFound(session_id.to_string()))
  }
}

#[instrument(level = "info", skip(state))]
pub async fn reset_session(state: &AppState, session_id: &str) -> Result<SessionOut, ApiError> {
  let handle = lookup(state, session_id).await?;
  Ok(reset_handle(state, &handle).await)
}

/// Reset the session behind `handle` and move its registry entry to the new id.
pub async fn reset_handle(state: &AppState, handle: &SessionHandle) -> SessionOut {
  let mut session = handle.lock().await;
  let old_id = session.id().to_string();
  session.reset();
  state.rekey_session(&old_id, session.id(), handle.clone()).await;
  SessionOut { session: session_view(session.state()), message: session.last_bot_text().to_string() }
}

#[instrument(level = "info", skip(state))]
pub async fn session_analytics(state: &AppState, session_id: &str) -> Result<PerformanceReport, ApiError> {
  let handle = lookup(state, session_id).await?;
  let session = handle.lock().await;
  Ok(summarize(session.state(), now_ms()))
}

#[instrument(level = "info", skip(state))]
pub async fn select_field(state: &AppState, session_id: &str, field: Field) -> Result<FieldSelectionOut, ApiError> {
  let handle = lookup(state, session_id).await?;
  let mut session = handle.lock().await;
  select_field_locked(&mut session, field)
}

pub fn select_field_locked(session: &mut Session, field: Field) -> Result<FieldSelectionOut, ApiError> {
  let question = question_out(session.select_field(field)?);
  let st = session.state();
  Ok(FieldSelectionOut {
    session_id: st.id.clone(),
    response: session.last_bot_text().to_string(),
    question,
    score: st.score,
    is_complete: st.is_complete,
    difficulty: st.difficulty,
  })
}

#[instrument(level = "info", skip(state, answer), fields(answer_len = answer.len()))]
pub async fn submit_answer(state: &AppState, session_id: &str, answer: &str) -> Result<AnswerResultOut, ApiError> {
  let handle = lookup(state, session_id).await?;
  let mut session = handle.lock().await;
  submit_answer_locked(&mut session, answer)
}

/// Blank answers never reach the evaluator.
pub fn submit_answer_locked(session: &mut Session, answer: &str) -> Result<AnswerResultOut, ApiError> {
  if answer.trim().is_empty() {
    return Err(ApiError::BadRequest("answer must not be blank".into()));
  }
  let outcome = session.submit_answer(answer)?;
  info!(
    target: "quiz",
    session_id = %session.id(),
    correct = outcome.correct,
    complete = outcome.is_complete,
    "Answer submitted"
  );
  Ok(answer_result_out(session.id(), &outcome))
}

/// Free-form chat: a field choice before the quiz starts, an answer while a
/// question is pending, and a help reply for anything else.
#[instrument(level = "info", skip(state, message), fields(message_len = message.len()))]
pub async fn chat_message(
  state: &AppState,
  session_id: &str,
  message: &str,
  field: Option<Field>,
) -> Result<ChatOut, ApiError> {
  let handle = lookup(state, session_id).await?;
  let mut session = handle.lock().await;

  let (response, answer) = match (session.phase(), field) {
    (Phase::Complete, _) => return Err(SessionError::Complete.into()),
    (Phase::NotStarted, Some(field)) => {
      let out = select_field_locked(&mut session, field)?;
      (out.response, None)
    }
    (Phase::AwaitingAnswer, _) => {
      let out = submit_answer_locked(&mut session, message)?;
      (out.explanation.clone(), Some(out))
    }
    _ => (session.record_unrecognized(message), None),
  };

  let st = session.state();
  Ok(ChatOut {
    session_id: st.id.clone(),
    response,
    question: st.current_question.as_ref().map(question_out),
    answer,
    score: st.score,
    is_complete: st.is_complete,
    difficulty: st.difficulty,
    session_stats: ChatStatsOut {
      total_questions: st.total_questions,
      correct_answers: st.correct_answers,
      accuracy: st.accuracy(),
    },
  })
}
