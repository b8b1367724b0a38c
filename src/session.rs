//! Session controller.
//!
//! A `Session` owns one `SessionState` and is the only thing that mutates it.
//! Phases are derived from the state rather than stored:
//!
//! ```text
//! NotStarted --select_field--> AwaitingAnswer --submit_answer--> AwaitingAnswer
//!                                                            \-> Complete (after `session_length` answers)
//! any --reset--> NotStarted
//! ```
//!
//! Issuing the next question happens inside `submit_answer`, so there is no
//! observable gap between grading and the next question. Pacing, if any, is the
//! caller's business.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::QuizSettings;
use crate::domain::{ChatMessage, Field, FieldScore, MessageKind, QuestionInstance};
use crate::error::SessionError;
use crate::evaluator::evaluate;
use crate::repository::QuestionBank;
use crate::selector::{select, Chooser};
use crate::util::{fill_template, now_ms, trunc_for_log};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  NotStarted,
  FieldSelected,
  AwaitingAnswer,
  Complete,
}

#[derive(Clone, Debug)]
pub struct SessionState {
  pub id: String,
  pub user_id: Option<String>,
  pub selected_field: Option<Field>,
  pub current_question: Option<QuestionInstance>,
  pub score: u32,
  pub total_questions: u32,
  pub correct_answers: u32,
  pub difficulty: f64,
  pub field_scores: BTreeMap<Field, FieldScore>,
  pub is_complete: bool,
  pub started_at_ms: u64,
  pub ended_at_ms: Option<u64>,
  /// Difficulty after each graded answer, oldest first.
  pub difficulty_history: Vec<f64>,
  pub messages: Vec<ChatMessage>,
}

impl SessionState {
  fn fresh(user_id: Option<String>, difficulty: f64) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      user_id,
      selected_field: None,
      current_question: None,
      score: 0,
      total_questions: 0,
      correct_answers: 0,
      difficulty,
      field_scores: BTreeMap::new(),
      is_complete: false,
      started_at_ms: now_ms(),
      ended_at_ms: None,
      difficulty_history: Vec::new(),
      messages: Vec::new(),
    }
  }

  pub fn phase(&self) -> Phase {
    if self.is_complete {
      Phase::Complete
    } else if self.current_question.is_some() {
      Phase::AwaitingAnswer
    } else if self.selected_field.is_some() {
      Phase::FieldSelected
    } else {
      Phase::NotStarted
    }
  }

  pub fn accuracy(&self) -> f64 {
    if self.total_questions == 0 { 0.0 } else { self.correct_answers as f64 / self.total_questions as f64 }
  }

  fn push_message(&mut self, kind: MessageKind, content: String, question_id: Option<String>, is_correct: Option<bool>) {
    self.messages.push(ChatMessage {
      id: Uuid::new_v4().to_string(),
      kind,
      content,
      question_id,
      is_correct,
      timestamp_ms: now_ms(),
    });
  }
}

/// Result of grading one answer.
#[derive(Clone, Debug)]
pub struct AnswerOutcome {
  pub question_id: String,
  pub correct: bool,
  pub points_awarded: u32,
  pub expected: String,
  /// Transcript text shown after grading.
  pub feedback: String,
  pub score: u32,
  pub difficulty: f64,
  pub next_question: Option<QuestionInstance>,
  pub is_complete: bool,
}

pub struct Session {
  state: SessionState,
  bank: Arc<QuestionBank>,
  settings: Arc<QuizSettings>,
  chooser: Box<dyn Chooser>,
}

impl Session {
  pub fn new(bank: Arc<QuestionBank>, settings: Arc<QuizSettings>, chooser: Box<dyn Chooser>, user_id: Option<String>) -> Self {
    let mut state = SessionState::fresh(user_id, settings.quiz.initial_difficulty);
    state.push_message(MessageKind::Bot, settings.messages.welcome.clone(), None, None);
    Self { state, bank, settings, chooser }
  }

  pub fn state(&self) -> &SessionState {
    &self.state
  }

  pub fn id(&self) -> &str {
    &self.state.id
  }

  pub fn phase(&self) -> Phase {
    self.state.phase()
  }

  /// Choose the field to be tested on and issue its first question.
  #[instrument(level = "debug", skip(self), fields(session_id = %self.state.id))]
  pub fn select_field(&mut self, field: Field) -> Result<&QuestionInstance, SessionError> {
    match self.phase() {
      Phase::Complete => return Err(SessionError::Complete),
      Phase::AwaitingAnswer => return Err(SessionError::QuestionPending),
      Phase::NotStarted | Phase::FieldSelected => {}
    }

    self.state.field_scores.entry(field).or_default();
    self.state.selected_field = Some(field);
    let text = fill_template(&self.settings.messages.field_selected, &[("field", field.as_str())]);
    self.state.push_message(MessageKind::Bot, text, None, None);
    info!(target: "quiz", session_id = %self.state.id, %field, "Field selected");

    Ok(self.issue_question(field))
  }

  fn issue_question(&mut self, field: Field) -> &QuestionInstance {
    debug_assert!(self.state.current_question.is_none(), "question issued while another is pending");

    let q = select(
      &self.bank,
      field,
      self.state.difficulty,
      self.settings.quiz.difficulty_tolerance,
      self.chooser.as_mut(),
    );
    info!(
      target: "quiz",
      session_id = %self.state.id,
      question_id = %q.id,
      source_id = %q.source_id,
      %field,
      difficulty = q.difficulty,
      "Question issued"
    );
    self.state.push_message(MessageKind::Question, q.prompt.clone(), Some(q.id.clone()), None);
    self.state.current_question.insert(q)
  }

  /// Grade `raw_answer` against the pending question, update all counters and either
  /// issue the next question or complete the session.
  #[instrument(level = "debug", skip(self, raw_answer), fields(session_id = %self.state.id, answer_len = raw_answer.len()))]
  pub fn submit_answer(&mut self, raw_answer: &str) -> Result<AnswerOutcome, SessionError> {
    if self.state.is_complete {
      return Err(SessionError::Complete);
    }
    let Some(field) = self.state.selected_field else {
      return Err(SessionError::NoPendingQuestion);
    };
    let Some(question) = self.state.current_question.take() else {
      return Err(SessionError::NoPendingQuestion);
    };

    let correct = evaluate(&question, raw_answer);
    debug!(target: "quiz", question_id = %question.id, answer = %trunc_for_log(raw_answer, 64), correct, "Answer evaluated");
    self.state.push_message(MessageKind::User, raw_answer.trim().to_string(), Some(question.id.clone()), None);

    let points_awarded = if correct { question.points } else { 0 };
    self.state.total_questions += 1;
    if correct {
      self.state.correct_answers += 1;
      self.state.score += points_awarded;
    }
    self.state.field_scores.entry(field).or_default().record(correct);

    self.state.difficulty = self.settings.adaptive.next(
      self.state.correct_answers,
      self.state.total_questions,
      self.state.difficulty,
    );
    self.state.difficulty_history.push(self.state.difficulty);

    let feedback = self.feedback_text(&question, correct);
    self.state.push_message(MessageKind::Bot, feedback.clone(), Some(question.id.clone()), Some(correct));

    info!(
      target: "quiz",
      session_id = %self.state.id,
      question_id = %question.id,
      correct,
      answered = self.state.total_questions,
      score = self.state.score,
      difficulty = self.state.difficulty,
      "Answer graded"
    );

    let next_question = if self.state.total_questions >= self.settings.quiz.session_length {
      self.complete();
      None
    } else {
      Some(self.issue_question(field).clone())
    };

    Ok(AnswerOutcome {
      question_id: question.id,
      correct,
      points_awarded,
      expected: question.correct_answer,
      feedback,
      score: self.state.score,
      difficulty: self.state.difficulty,
      next_question,
      is_complete: self.state.is_complete,
    })
  }

  /// Most recent bot line in the transcript.
  pub fn last_bot_text(&self) -> &str {
    self
      .state
      .messages
      .iter()
      .rev()
      .find(|m| m.kind == MessageKind::Bot)
      .map(|m| m.content.as_str())
      .unwrap_or_default()
  }

  /// A chat line that is neither a field choice nor an answer: log it and reply with help.
  pub fn record_unrecognized(&mut self, text: &str) -> String {
    let reply = self.settings.messages.unrecognized.clone();
    self.state.push_message(MessageKind::User, text.trim().to_string(), None, None);
    self.state.push_message(MessageKind::Bot, reply.clone(), None, None);
    reply
  }

  /// Discard everything and start over. Only the user id carries over.
  #[instrument(level = "debug", skip(self), fields(session_id = %self.state.id))]
  pub fn reset(&mut self) {
    let user_id = self.state.user_id.take();
    let old_id = std::mem::take(&mut self.state.id);
    self.state = SessionState::fresh(user_id, self.settings.quiz.initial_difficulty);
    self.state.push_message(MessageKind::Bot, self.settings.messages.welcome_back.clone(), None, None);
    info!(target: "quiz", %old_id, new_id = %self.state.id, "Session reset");
  }

  fn complete(&mut self) {
    self.state.is_complete = true;
    self.state.ended_at_ms = Some(now_ms());
    let text = fill_template(
      &self.settings.messages.complete,
      &[
        ("correct", &self.state.correct_answers.to_string()),
        ("total", &self.state.total_questions.to_string()),
        ("score", &self.state.score.to_string()),
      ],
    );
    self.state.push_message(MessageKind::Bot, text, None, None);
    info!(
      target: "quiz",
      session_id = %self.state.id,
      correct = self.state.correct_answers,
      total = self.state.total_questions,
      score = self.state.score,
      "Session complete"
    );
  }

  fn feedback_text(&self, question: &QuestionInstance, correct: bool) -> String {
    let messages = &self.settings.messages;
    if correct {
      let explanation = question.explanation.as_deref().unwrap_or("Well done!");
      fill_template(&messages.correct, &[("explanation", explanation), ("points", &question.points.to_string())])
    } else {
      let explanation = question
        .explanation
        .clone()
        .unwrap_or_else(|| format!("The correct answer was: {}", question.correct_answer));
      fill_template(&messages.incorrect, &[("explanation", &explanation)])
    }
  }
}
