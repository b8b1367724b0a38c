//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! Question DTOs never carry the correct answer; it is only revealed in a grading result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analytics::PerformanceReport;
use crate::domain::{AnswerKind, ChatMessage, Field, FieldScore, QuestionInstance};
use crate::session::{AnswerOutcome, Phase, SessionState};

/// Messages the client can send over WebSocket. The socket is bound to one session.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    SelectField { field: Field },
    SubmitAnswer { answer: String },
    Reset,
    GetState,
    Analytics,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Session { session: SessionView },
    Bot { text: String },
    Question { question: QuestionOut },
    AnswerResult(AnswerResultOut),
    Complete { report: PerformanceReport },
    Analytics { report: PerformanceReport },
    Error { message: String },
}

/// DTO used by both WS and HTTP for question delivery.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionOut {
    pub id: String,
    pub field: Field,
    pub difficulty: u8,
    pub prompt: String,
    pub kind: AnswerKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
}

pub fn question_out(q: &QuestionInstance) -> QuestionOut {
    QuestionOut {
        id: q.id.clone(),
        field: q.field,
        difficulty: q.difficulty,
        prompt: q.prompt.clone(),
        kind: q.kind,
        options: q.options.clone(),
        points: q.points,
        time_limit: q.time_limit,
    }
}

/// Read-only observation of a session for display.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub phase: Phase,
    pub selected_field: Option<Field>,
    pub current_question: Option<QuestionOut>,
    pub score: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub accuracy: f64,
    pub difficulty: f64,
    pub field_scores: BTreeMap<Field, FieldScore>,
    pub is_complete: bool,
    pub started_at_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at_ms: Option<u64>,
    pub messages: Vec<ChatMessage>,
}

pub fn session_view(s: &SessionState) -> SessionView {
    SessionView {
        id: s.id.clone(),
        user_id: s.user_id.clone(),
        phase: s.phase(),
        selected_field: s.selected_field,
        current_question: s.current_question.as_ref().map(question_out),
        score: s.score,
        total_questions: s.total_questions,
        correct_answers: s.correct_answers,
        accuracy: s.accuracy(),
        difficulty: s.difficulty,
        field_scores: s.field_scores.clone(),
        is_complete: s.is_complete,
        started_at_ms: s.started_at_ms,
        ended_at_ms: s.ended_at_ms,
        messages: s.messages.clone(),
    }
}

/// Grading result, shared by the WS `answer_result` frame and the HTTP answer endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerResultOut {
    pub session_id: String,
    pub question_id: String,
    pub is_correct: bool,
    pub points_awarded: u32,
    pub expected: String,
    pub explanation: String,
    pub score: u32,
    pub difficulty: f64,
    pub next_question: Option<QuestionOut>,
    pub is_complete: bool,
}

pub fn answer_result_out(session_id: &str, o: &AnswerOutcome) -> AnswerResultOut {
    AnswerResultOut {
        session_id: session_id.to_string(),
        question_id: o.question_id.clone(),
        is_correct: o.correct,
        points_awarded: o.points_awarded,
        expected: o.expected.clone(),
        explanation: o.feedback.clone(),
        score: o.score,
        difficulty: o.difficulty,
        next_question: o.next_question.as_ref().map(question_out),
        is_complete: o.is_complete,
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Default, Deserialize)]
pub struct SessionCreateIn {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionOut {
    pub session: SessionView,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct FieldSelectionIn {
    pub session_id: String,
    pub field: Field,
}

#[derive(Debug, Serialize)]
pub struct FieldSelectionOut {
    pub session_id: String,
    pub response: String,
    pub question: QuestionOut,
    pub score: u32,
    pub is_complete: bool,
    pub difficulty: f64,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
    pub session_id: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatIn {
    pub session_id: String,
    pub message: String,
    #[serde(default)]
    pub field: Option<Field>,
}

#[derive(Debug, Serialize)]
pub struct ChatStatsOut {
    pub total_questions: u32,
    pub correct_answers: u32,
    pub accuracy: f64,
}

#[derive(Debug, Serialize)]
pub struct ChatOut {
    pub session_id: String,
    pub response: String,
    pub question: Option<QuestionOut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<AnswerResultOut>,
    pub score: u32,
    pub is_complete: bool,
    pub difficulty: f64,
    pub session_stats: ChatStatsOut,
}

#[derive(Debug, Serialize)]
pub struct MessageOut {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub status: &'static str,
    pub timestamp_ms: u64,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadyOut {
    pub status: &'static str,
    pub timestamp_ms: u64,
    pub questions: usize,
    pub fields: Vec<Field>,
    pub active_sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
}
