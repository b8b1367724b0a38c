//! WebSocket upgrade + message loop. One socket drives one session: it is
//! registered on connect and removed on disconnect. Each client message yields a
//! list of paced frames; the loop sleeps for each frame's delay before sending it.

use std::{sync::Arc, time::Duration};
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::analytics::summarize;
use crate::logic::{reset_handle, select_field_locked, submit_answer_locked};
use crate::protocol::{session_view, ClientWsMessage, ServerWsMessage};
use crate::state::{AppState, SessionHandle};
use crate::util::{now_ms, trunc_for_log};

pub type PacedFrame = (Duration, ServerWsMessage);

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "iqfield_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  let (session_id, handle) = state.create_session(None).await;
  info!(target: "iqfield_backend", %session_id, "WebSocket connected");

  let greeting = {
    let session = handle.lock().await;
    vec![
      (Duration::ZERO, ServerWsMessage::Session { session: session_view(session.state()) }),
      (Duration::ZERO, ServerWsMessage::Bot { text: session.last_bot_text().to_string() }),
    ]
  };

  if send_frames(&mut socket, greeting).await {
    while let Some(Ok(msg)) = socket.recv().await {
      if on_message(&mut socket, msg, &state, &handle).await == Flow::Stop {
        break;
      }
    }
  }

  // A reset may have moved the session to a new id.
  let current_id = handle.lock().await.id().to_string();
  state.remove_session(&current_id).await;
  info!(target: "iqfield_backend", session_id = %current_id, "WebSocket disconnected");
}

/// Outbound half of a socket.
trait FrameSink {
  async fn send_message(&mut self, msg: Message) -> Result<(), axum::Error>;
}

impl FrameSink for WebSocket {
  async fn send_message(&mut self, msg: Message) -> Result<(), axum::Error> {
    self.send(msg).await
  }
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
  Continue,
  Stop,
}

/// Answer one inbound message. `Stop` once the peer closed or a send failed.
async fn on_message<S: FrameSink>(sink: &mut S, msg: Message, state: &AppState, handle: &SessionHandle) -> Flow {
  match msg {
    Message::Text(txt) => {
      debug!(target: "iqfield_backend", frame = %trunc_for_log(&txt, 120), "WS received");
      let frames = match serde_json::from_str::<ClientWsMessage>(&txt) {
        Ok(incoming) => handle_client_ws(incoming, state, handle).await,
        Err(e) => error_frame(format!("Invalid JSON: {}", e)),
      };
      if send_frames(sink, frames).await { Flow::Continue } else { Flow::Stop }
    }
    Message::Ping(payload) => match sink.send_message(Message::Pong(payload)).await {
      Ok(()) => Flow::Continue,
      Err(e) => {
        error!(target: "iqfield_backend", error = %e, "WS pong send error");
        Flow::Stop
      }
    },
    Message::Close(_) => Flow::Stop,
    _ => Flow::Continue,
  }
}

/// Send frames in order, sleeping before each one. Returns false once the socket is gone.
async fn send_frames<S: FrameSink>(sink: &mut S, frames: Vec<PacedFrame>) -> bool {
  for (delay, frame) in frames {
    if !delay.is_zero() {
      tokio::time::sleep(delay).await;
    }
    let out = serde_json::to_string(&frame).unwrap_or_else(|e| {
      serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
    });
    if let Err(e) = sink.send_message(Message::Text(out)).await {
      error!(target: "iqfield_backend", error = %e, "WS send error");
      return false;
    }
  }
  true
}

fn error_frame(message: impl ToString) -> Vec<PacedFrame> {
  vec![(Duration::ZERO, ServerWsMessage::Error { message: message.to_string() })]
}

#[instrument(level = "info", skip_all)]
pub async fn handle_client_ws(msg: ClientWsMessage, state: &AppState, handle: &SessionHandle) -> Vec<PacedFrame> {
  let pacing = state.pacing;
  match msg {
    ClientWsMessage::Ping => vec![(Duration::ZERO, ServerWsMessage::Pong)],

    ClientWsMessage::GetState => {
      let session = handle.lock().await;
      vec![(Duration::ZERO, ServerWsMessage::Session { session: session_view(session.state()) })]
    }

    ClientWsMessage::SelectField { field } => {
      let mut session = handle.lock().await;
      match select_field_locked(&mut session, field) {
        Ok(out) => {
          info!(target: "quiz", session_id = %out.session_id, %field, "WS field selected");
          vec![
            (Duration::ZERO, ServerWsMessage::Bot { text: out.response }),
            (pacing.question_delay(), ServerWsMessage::Question { question: out.question }),
          ]
        }
        Err(e) => error_frame(e),
      }
    }

    ClientWsMessage::SubmitAnswer { answer } => {
      let mut session = handle.lock().await;
      let out = match submit_answer_locked(&mut session, &answer) {
        Ok(out) => out,
        Err(e) => return error_frame(e),
      };
      let feedback = out.explanation.clone();
      let next = out.next_question.clone();
      let complete = out.is_complete;
      let mut frames = vec![
        (Duration::ZERO, ServerWsMessage::AnswerResult(out)),
        (Duration::ZERO, ServerWsMessage::Bot { text: feedback }),
      ];
      if let Some(question) = next {
        frames.push((pacing.feedback_delay(), ServerWsMessage::Question { question }));
      } else if complete {
        frames.push((pacing.completion_delay(), ServerWsMessage::Bot { text: session.last_bot_text().to_string() }));
        frames.push((Duration::ZERO, ServerWsMessage::Complete { report: summarize(session.state(), now_ms()) }));
      }
      frames
    }

    ClientWsMessage::Reset => {
      let out = reset_handle(state, handle).await;
      vec![
        (Duration::ZERO, ServerWsMessage::Session { session: out.session }),
        (Duration::ZERO, ServerWsMessage::Bot { text: out.message }),
      ]
    }

    ClientWsMessage::Analytics => {
      let session = handle.lock().await;
      vec![(Duration::ZERO, ServerWsMessage::Analytics { report: summarize(session.state(), now_ms()) })]
    }
  }
}
