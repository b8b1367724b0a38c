//! Question repository: a validated, read-only map from field to its ordered questions.
//!
//! Construction is the only place a configuration error can surface. Once a bank
//! exists, every field can produce a question (its own, or the default field's).

use std::collections::{HashMap, HashSet};

use tracing::{info, instrument, warn};

use crate::domain::{AnswerKind, Field, QuestionRecord};
use crate::error::ConfigError;
use crate::seeds::seed_questions;

#[derive(Clone, Debug)]
pub struct QuestionBank {
  by_field: HashMap<Field, Vec<QuestionRecord>>,
  default_field: Field,
}

impl QuestionBank {
  /// Validate `records` and index them by field, keeping authored order.
  pub fn new(records: Vec<QuestionRecord>, default_field: Field) -> Result<Self, ConfigError> {
    let mut by_field: HashMap<Field, Vec<QuestionRecord>> = HashMap::new();
    let mut seen: HashSet<(Field, String)> = HashSet::new();

    for r in records {
      validate_record(&r)?;
      if !seen.insert((r.field, r.id.clone())) {
        return Err(invalid(&r, format!("duplicate id in field {}", r.field)));
      }
      by_field.entry(r.field).or_default().push(r);
    }

    if by_field.get(&default_field).map_or(true, |qs| qs.is_empty()) {
      return Err(ConfigError::EmptyDefaultField(default_field));
    }

    Ok(Self { by_field, default_field })
  }

  /// Configured questions first, then built-in seeds whose id is not already taken.
  #[instrument(level = "info", skip_all, fields(configured = configured.len(), %default_field))]
  pub fn with_seeds(configured: Vec<QuestionRecord>, default_field: Field) -> Result<Self, ConfigError> {
    let taken: HashSet<(Field, String)> = configured.iter().map(|q| (q.field, q.id.clone())).collect();
    let mut records = configured;
    for seed in seed_questions() {
      if taken.contains(&(seed.field, seed.id.clone())) {
        warn!(target: "quiz", id = %seed.id, field = %seed.field, "Configured question shadows built-in seed");
        continue;
      }
      records.push(seed);
    }

    let bank = Self::new(records, default_field)?;
    for field in Field::ALL {
      let n = bank.questions(field).len();
      if n == 0 {
        warn!(target: "quiz", %field, fallback = %bank.default_field, "Field has no questions; selection will use the fallback field");
      } else {
        info!(target: "quiz", %field, questions = n, "Startup question inventory");
      }
    }
    Ok(bank)
  }

  /// Questions authored for `field`, possibly empty.
  pub fn questions(&self, field: Field) -> &[QuestionRecord] {
    self.by_field.get(&field).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn default_field(&self) -> Field {
    self.default_field
  }

  /// Never empty: guaranteed at construction.
  pub fn fallback_questions(&self) -> &[QuestionRecord] {
    self.questions(self.default_field)
  }

  pub fn question_count(&self) -> usize {
    self.by_field.values().map(Vec::len).sum()
  }

  /// Fields that have at least one authored question.
  pub fn populated_fields(&self) -> Vec<Field> {
    Field::ALL.into_iter().filter(|f| !self.questions(*f).is_empty()).collect()
  }
}

fn invalid(r: &QuestionRecord, reason: impl Into<String>) -> ConfigError {
  ConfigError::InvalidQuestion { id: r.id.clone(), reason: reason.into() }
}

fn validate_record(r: &QuestionRecord) -> Result<(), ConfigError> {
  if r.id.trim().is_empty() {
    return Err(invalid(r, "empty id"));
  }
  if r.prompt.trim().is_empty() {
    return Err(invalid(r, "empty prompt"));
  }
  if r.correct_answer.trim().is_empty() {
    return Err(invalid(r, "empty answer"));
  }
  if !(r.difficulty.is_finite() && r.difficulty > 0.0) {
    return Err(invalid(r, format!("difficulty must be positive (got {})", r.difficulty)));
  }
  if r.points == 0 {
    return Err(invalid(r, "points must be positive"));
  }

  match (r.kind, &r.options) {
    (AnswerKind::MultipleChoice, Some(opts)) => {
      if opts.len() < 2 {
        return Err(invalid(r, "multiple-choice needs at least two options"));
      }
      let answer = r.correct_answer.trim().to_lowercase();
      if !opts.iter().any(|o| o.trim().to_lowercase() == answer) {
        return Err(invalid(r, "answer is not one of the options"));
      }
    }
    (AnswerKind::MultipleChoice, None) => return Err(invalid(r, "multiple-choice needs options")),
    (_, Some(_)) => return Err(invalid(r, "options are only allowed on multiple-choice questions")),
    (_, None) => {}
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(id: &str, field: Field, difficulty: f64) -> QuestionRecord {
    QuestionRecord {
      id: id.into(),
      field,
      difficulty,
      prompt: format!("prompt {id}"),
      kind: AnswerKind::FreeText,
      options: None,
      correct_answer: "answer".into(),
      explanation: None,
      points: 2,
      time_limit: None,
    }
  }

  #[test]
  fn builtin_bank_covers_every_field() {
    let bank = QuestionBank::with_seeds(vec![], Field::Math).expect("seeds are valid");
    assert_eq!(bank.populated_fields(), Field::ALL.to_vec());
    assert_eq!(bank.question_count(), seed_questions().len());
    assert_eq!(bank.questions(Field::Math)[0].id, "math_1");
  }

  #[test]
  fn configured_questions_come_first_and_shadow_seeds() {
    let mut custom = record("math_1", Field::Math, 2.0);
    custom.prompt = "custom".into();
    let bank = QuestionBank::with_seeds(vec![custom, record("math_99", Field::Math, 5.0)], Field::Math).unwrap();
    let math = bank.questions(Field::Math);
    assert_eq!(math[0].prompt, "custom");
    assert_eq!(math[1].id, "math_99");
    assert_eq!(math.iter().filter(|q| q.id == "math_1").count(), 1);
  }

  #[test]
  fn empty_default_field_is_fatal() {
    let err = QuestionBank::new(vec![record("l1", Field::Logic, 1.0)], Field::Math).unwrap_err();
    assert!(matches!(err, ConfigError::EmptyDefaultField(Field::Math)));
  }

  #[test]
  fn fields_without_questions_are_allowed() {
    let bank = QuestionBank::new(vec![record("m1", Field::Math, 1.0)], Field::Math).unwrap();
    assert!(bank.questions(Field::Language).is_empty());
    assert_eq!(bank.fallback_questions().len(), 1);
  }

  #[test]
  fn rejects_malformed_records() {
    let mut zero_points = record("a", Field::Math, 1.0);
    zero_points.points = 0;

    let bad_difficulty = record("b", Field::Math, 0.0);

    let mut one_option = record("c", Field::Math, 1.0);
    one_option.kind = AnswerKind::MultipleChoice;
    one_option.options = Some(vec!["answer".into()]);

    let mut answer_not_offered = record("d", Field::Math, 1.0);
    answer_not_offered.kind = AnswerKind::MultipleChoice;
    answer_not_offered.options = Some(vec!["x".into(), "y".into()]);

    let mut stray_options = record("e", Field::Math, 1.0);
    stray_options.options = Some(vec!["x".into(), "y".into()]);

    let mut blank_answer = record("f", Field::Math, 1.0);
    blank_answer.correct_answer = "  ".into();

    for r in [zero_points, bad_difficulty, one_option, answer_not_offered, stray_options, blank_answer] {
      let id = r.id.clone();
      let err = QuestionBank::new(vec![record("ok", Field::Math, 1.0), r], Field::Math).unwrap_err();
      assert!(matches!(err, ConfigError::InvalidQuestion { id: ref got, .. } if *got == id), "{id}: {err}");
    }
  }

  #[test]
  fn duplicate_ids_within_a_field_are_rejected() {
    let err = QuestionBank::new(vec![record("m1", Field::Math, 1.0), record("m1", Field::Math, 2.0)], Field::Math).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidQuestion { .. }));
    // Same id in another field is fine.
    assert!(QuestionBank::new(vec![record("x", Field::Math, 1.0), record("x", Field::Logic, 1.0)], Field::Math).is_ok());
  }
}
