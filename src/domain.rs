//! Domain models: fields, answer kinds, question records and their issued instances,
//! per-field score counters and the chat transcript entries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Subject category a question belongs to. Closed set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Field {
  Math,
  Logic,
  Programming,
  Language,
  VisualPatterns,
}

impl Field {
  pub const ALL: [Field; 5] = [
    Field::Math,
    Field::Logic,
    Field::Programming,
    Field::Language,
    Field::VisualPatterns,
  ];

  /// Wire tag, identical to the serde representation.
  pub fn as_str(self) -> &'static str {
    match self {
      Field::Math => "math",
      Field::Logic => "logic",
      Field::Programming => "programming",
      Field::Language => "language",
      Field::VisualPatterns => "visual-patterns",
    }
  }

  /// Human-facing name used in analytics.
  pub fn display_name(self) -> &'static str {
    match self {
      Field::Math => "Mathematics",
      Field::Logic => "Logic & Reasoning",
      Field::Programming => "Programming",
      Field::Language => "Language & Verbal",
      Field::VisualPatterns => "Visual Patterns",
    }
  }
}

impl fmt::Display for Field {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Field {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let tag = s.trim().to_lowercase();
    Field::ALL
      .into_iter()
      .find(|f| f.as_str() == tag)
      .ok_or_else(|| format!("unknown field '{}'", s.trim()))
  }
}

/// How an answer is collected and graded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnswerKind {
  MultipleChoice,
  #[serde(alias = "text")]
  FreeText,
  #[serde(alias = "number")]
  Numeric,
}

/// Authored question. Immutable once loaded into the bank.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuestionRecord {
  pub id: String,
  pub field: Field,
  pub difficulty: f64,
  pub prompt: String,
  pub kind: AnswerKind,
  #[serde(default)] pub options: Option<Vec<String>>,
  #[serde(rename = "answer")]
  pub correct_answer: String,
  #[serde(default)] pub explanation: Option<String>,
  pub points: u32,
  /// Display hint in seconds; never enforced.
  #[serde(default)] pub time_limit: Option<u32>,
}

/// One issued presentation of a record: fresh id, difficulty pinned to the requested level.
/// Carries the answer, so it is never serialized; clients get `protocol::QuestionOut`.
#[derive(Clone, Debug)]
pub struct QuestionInstance {
  pub id: String,
  /// Id of the record this instance was issued from.
  pub source_id: String,
  pub field: Field,
  pub difficulty: u8,
  pub prompt: String,
  pub kind: AnswerKind,
  pub options: Option<Vec<String>>,
  pub correct_answer: String,
  pub explanation: Option<String>,
  pub points: u32,
  pub time_limit: Option<u32>,
}

impl QuestionInstance {
  pub fn issue(record: &QuestionRecord, difficulty: u8, nonce: &str) -> Self {
    Self {
      id: format!("{}_{}", record.id, nonce),
      source_id: record.id.clone(),
      field: record.field,
      difficulty,
      prompt: record.prompt.clone(),
      kind: record.kind,
      options: record.options.clone(),
      correct_answer: record.correct_answer.clone(),
      explanation: record.explanation.clone(),
      points: record.points,
      time_limit: record.time_limit,
    }
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FieldScore {
  pub correct: u32,
  pub total: u32,
}

impl FieldScore {
  pub fn record(&mut self, correct: bool) {
    self.total += 1;
    if correct { self.correct += 1; }
  }

  pub fn accuracy(&self) -> f64 {
    if self.total == 0 { 0.0 } else { self.correct as f64 / self.total as f64 }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
  Bot,
  User,
  Question,
}

/// Transcript entry shown by the chat-style presentation layer.
#[derive(Clone, Debug, Serialize)]
pub struct ChatMessage {
  pub id: String,
  pub kind: MessageKind,
  pub content: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub question_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub is_correct: Option<bool>,
  pub timestamp_ms: u64,
}
