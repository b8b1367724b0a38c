//! Loading quiz configuration (session settings, adaptive policy, pacing, message
//! templates and extra questions) from TOML.
//!
//! Every section is optional; an absent file yields the built-in defaults.

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

use crate::difficulty::AdaptivePolicy;
use crate::domain::{Field, QuestionRecord};
use crate::error::ConfigError;

/// Outer limits of the difficulty scale; `[adaptive]` bounds must sit inside them.
pub const MIN_DIFFICULTY: f64 = 1.0;
pub const MAX_DIFFICULTY: f64 = 5.0;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct QuizConfig {
  #[serde(default)]
  pub quiz: QuizSection,
  #[serde(default)]
  pub adaptive: AdaptivePolicy,
  #[serde(default)]
  pub pacing: Pacing,
  #[serde(default)]
  pub messages: Messages,
  /// Questions appended to the built-in bank.
  #[serde(default)]
  pub questions: Vec<QuestionRecord>,
}

/// Session shape shared by every session the process hosts.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct QuizSection {
  /// Answered questions per session. 10 unless an operator deliberately changes it.
  pub session_length: u32,
  pub initial_difficulty: f64,
  /// Inclusive band around the target difficulty used by the selector.
  pub difficulty_tolerance: f64,
  /// Pool used when a field has no authored questions at all.
  pub default_field: Field,
}

impl Default for QuizSection {
  fn default() -> Self {
    Self {
      session_length: 10,
      initial_difficulty: 1.0,
      difficulty_tolerance: 1.0,
      default_field: Field::Math,
    }
  }
}

/// Presentation pacing between WebSocket frames. Zero disables a delay.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Pacing {
  pub question_delay_ms: u64,
  pub feedback_delay_ms: u64,
  pub completion_delay_ms: u64,
}

impl Default for Pacing {
  fn default() -> Self {
    Self { question_delay_ms: 500, feedback_delay_ms: 2000, completion_delay_ms: 1500 }
  }
}

impl Pacing {
  #[cfg(test)]
  pub const NONE: Pacing = Pacing { question_delay_ms: 0, feedback_delay_ms: 0, completion_delay_ms: 0 };

  pub fn question_delay(&self) -> Duration { Duration::from_millis(self.question_delay_ms) }
  pub fn feedback_delay(&self) -> Duration { Duration::from_millis(self.feedback_delay_ms) }
  pub fn completion_delay(&self) -> Duration { Duration::from_millis(self.completion_delay_ms) }
}

/// Transcript templates. Placeholders are `{name}`; see each field for the keys filled in.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Messages {
  pub welcome: String,
  pub welcome_back: String,
  /// `{field}`
  pub field_selected: String,
  /// `{explanation}`, `{points}`
  pub correct: String,
  /// `{explanation}`
  pub incorrect: String,
  /// `{correct}`, `{total}`, `{score}`
  pub complete: String,
  /// Chat reply when a message is neither a field choice nor an answer.
  pub unrecognized: String,
}

impl Default for Messages {
  fn default() -> Self {
    Self {
      welcome: "Hello! I'm IQFieldBot, your personalized intelligence testing assistant. I'll adapt questions to your preferred field and adjust difficulty based on your performance. Which field would you like to be tested on?".into(),
      welcome_back: "Welcome back! Ready for another personalized IQ challenge? Let's test your skills again.".into(),
      field_selected: "Excellent choice! I'll now present you with {field} challenges. Let's start with your first question.".into(),
      correct: "Correct! {explanation} (+{points} points)".into(),
      incorrect: "Incorrect. {explanation}".into(),
      complete: "Session complete! You've answered {correct}/{total} questions correctly with a total score of {score} points.".into(),
      unrecognized: "I didn't understand that. Please select a field to get started or answer the current question.".into(),
    }
  }
}

/// The part of the configuration every session reads.
#[derive(Clone, Debug, Default)]
pub struct QuizSettings {
  pub quiz: QuizSection,
  pub adaptive: AdaptivePolicy,
  pub messages: Messages,
}

impl QuizConfig {
  pub fn from_toml_str(s: &str, path: &str) -> Result<Self, ConfigError> {
    let cfg: QuizConfig = toml::from_str(s).map_err(|source| ConfigError::Parse { path: path.to_string(), source })?;
    cfg.validate()?;
    Ok(cfg)
  }

  /// Structural checks on everything except the questions (the bank validates those).
  pub fn validate(&self) -> Result<(), ConfigError> {
    let q = &self.quiz;
    let a = &self.adaptive;
    if q.session_length == 0 {
      return Err(ConfigError::InvalidSettings("quiz.session_length must be at least 1".into()));
    }
    if !(q.difficulty_tolerance >= 0.0) {
      return Err(ConfigError::InvalidSettings("quiz.difficulty_tolerance must be >= 0".into()));
    }
    if !(MIN_DIFFICULTY <= a.min && a.min < a.max && a.max <= MAX_DIFFICULTY) {
      return Err(ConfigError::InvalidSettings(format!(
        "adaptive bounds must satisfy {MIN_DIFFICULTY} <= min < max <= {MAX_DIFFICULTY} (got {}..{})",
        a.min, a.max
      )));
    }
    if !(a.step > 0.0) {
      return Err(ConfigError::InvalidSettings("adaptive.step must be > 0".into()));
    }
    if !(0.0 <= a.lower_below && a.lower_below <= a.raise_above && a.raise_above <= 1.0) {
      return Err(ConfigError::InvalidSettings("adaptive thresholds must satisfy 0 <= lower_below <= raise_above <= 1".into()));
    }
    if !(a.min <= q.initial_difficulty && q.initial_difficulty <= a.max) {
      return Err(ConfigError::InvalidSettings(format!(
        "quiz.initial_difficulty {} outside adaptive bounds {}..{}",
        q.initial_difficulty, a.min, a.max
      )));
    }
    Ok(())
  }

  pub fn settings(&self) -> QuizSettings {
    QuizSettings {
      quiz: self.quiz.clone(),
      adaptive: self.adaptive.clone(),
      messages: self.messages.clone(),
    }
  }
}

/// Read and validate the TOML file at `path`.
pub fn load_quiz_config(path: &str) -> Result<QuizConfig, ConfigError> {
  let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_string(), source })?;
  QuizConfig::from_toml_str(&s, path)
}

/// Load from QUIZ_CONFIG_PATH when set, otherwise fall back to defaults.
/// A file that is set but broken is an error: the process must not start half-configured.
pub fn load_quiz_config_from_env() -> Result<QuizConfig, ConfigError> {
  let Ok(path) = std::env::var("QUIZ_CONFIG_PATH") else {
    info!(target: "iqfield_backend", "QUIZ_CONFIG_PATH not set; using built-in defaults");
    return Ok(QuizConfig::default());
  };
  match load_quiz_config(&path) {
    Ok(cfg) => {
      info!(target: "iqfield_backend", %path, extra_questions = cfg.questions.len(), "Loaded quiz config (TOML)");
      Ok(cfg)
    }
    Err(e) => {
      error!(target: "iqfield_backend", %path, error = %e, "Failed to load quiz config");
      Err(e)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::AnswerKind;

  #[test]
  fn empty_document_gives_documented_defaults() {
    let cfg = QuizConfig::from_toml_str("", "inline").expect("defaults");
    assert_eq!(cfg.quiz.session_length, 10);
    assert_eq!(cfg.quiz.initial_difficulty, 1.0);
    assert_eq!(cfg.quiz.difficulty_tolerance, 1.0);
    assert_eq!(cfg.quiz.default_field, Field::Math);
    assert_eq!(cfg.adaptive, AdaptivePolicy::default());
    assert_eq!(cfg.pacing, Pacing::default());
    assert!(cfg.questions.is_empty());
  }

  #[test]
  fn partial_sections_keep_remaining_defaults() {
    let doc = r#"
      [quiz]
      session_length = 5
      default_field = "visual-patterns"

      [pacing]
      feedback_delay_ms = 0

      [messages]
      correct = "Yes! +{points}"
    "#;
    let cfg = QuizConfig::from_toml_str(doc, "inline").expect("parse");
    assert_eq!(cfg.quiz.session_length, 5);
    assert_eq!(cfg.quiz.default_field, Field::VisualPatterns);
    assert_eq!(cfg.quiz.initial_difficulty, 1.0);
    assert_eq!(cfg.pacing.feedback_delay_ms, 0);
    assert_eq!(cfg.pacing.question_delay_ms, 500);
    assert_eq!(cfg.messages.correct, "Yes! +{points}");
    assert!(cfg.messages.incorrect.starts_with("Incorrect."));
  }

  #[test]
  fn questions_parse_with_aliases() {
    let doc = r#"
      [[questions]]
      id = "math_9"
      field = "math"
      difficulty = 3
      prompt = "What is 6 x 7?"
      kind = "number"
      answer = "42"
      points = 6
      time_limit = 75
    "#;
    let cfg = QuizConfig::from_toml_str(doc, "inline").expect("parse");
    let q = &cfg.questions[0];
    assert_eq!(q.kind, AnswerKind::Numeric);
    assert_eq!(q.difficulty, 3.0);
    assert_eq!(q.correct_answer, "42");
    assert_eq!(q.time_limit, Some(75));
    assert!(q.options.is_none());
  }

  #[test]
  fn rejects_inconsistent_settings() {
    let bad = [
      "[quiz]\nsession_length = 0",
      "[quiz]\ninitial_difficulty = 6.0",
      "[adaptive]\nlower_below = 0.8\nraise_above = 0.7",
      "[adaptive]\nstep = 0.0",
      "[adaptive]\nmin = 3.0\nmax = 2.0",
      "[adaptive]\nmax = 9.0\n[quiz]\ninitial_difficulty = 8.0",
      "[adaptive]\nmax = 5.5",
      "[adaptive]\nmin = 0.5",
      "[adaptive]\nmin = 5.0",
    ];
    for doc in bad {
      let err = QuizConfig::from_toml_str(doc, "inline").unwrap_err();
      assert!(matches!(err, ConfigError::InvalidSettings(_)), "{doc}: {err}");
    }
  }

  #[test]
  fn narrower_bounds_and_other_session_lengths_are_allowed() {
    let doc = "[quiz]\nsession_length = 5\ninitial_difficulty = 2.0\n[adaptive]\nmin = 2.0\nmax = 4.0";
    let cfg = QuizConfig::from_toml_str(doc, "inline").expect("valid");
    assert_eq!((cfg.adaptive.min, cfg.adaptive.max), (2.0, 4.0));
    assert_eq!(cfg.quiz.session_length, 5);
  }

  #[test]
  fn syntax_errors_are_parse_errors() {
    let err = QuizConfig::from_toml_str("[quiz\n", "broken.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { ref path, .. } if path == "broken.toml"));
  }

  #[test]
  fn missing_file_is_a_read_error() {
    let err = load_quiz_config("/definitely/not/here.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
  }
}
