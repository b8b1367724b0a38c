//! Error taxonomy.
//!
//! `ConfigError` is fatal and surfaces before the first session exists.
//! `SessionError` marks a transition invoked from the wrong phase; the session is left untouched.
//! `ApiError` is what the network edge reports; `routes::http` maps it to a status code.

use thiserror::Error;

use crate::domain::Field;

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("failed to read config file {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config file {path}: {source}")]
  Parse {
    path: String,
    #[source]
    source: toml::de::Error,
  },

  #[error("invalid settings: {0}")]
  InvalidSettings(String),

  #[error("invalid question {id}: {reason}")]
  InvalidQuestion { id: String, reason: String },

  #[error("default field {0} has no questions; selection has no fallback")]
  EmptyDefaultField(Field),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
  #[error("session is complete; reset to start again")]
  Complete,

  #[error("a question is still awaiting an answer")]
  QuestionPending,

  #[error("no question is awaiting an answer")]
  NoPendingQuestion,
}

/// Failures surfaced to HTTP and WebSocket clients.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
  #[error("session not found: {0}")]
  SessionNotFound(String),

  #[error("{0}")]
  BadRequest(String),

  #[error(transparent)]
  Session(#[from] SessionError),
}
