//! Performance report for a session: overall accuracy, per-field breakdown,
//! strengths/weaknesses and short study recommendations.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::Field;
use crate::session::SessionState;

const STRENGTH_AT: f64 = 0.8;
const WEAKNESS_BELOW: f64 = 0.6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceLevel {
  NoData,
  Exceptional,
  Excellent,
  Good,
  Fair,
  NeedsWork,
}

impl PerformanceLevel {
  pub fn from_accuracy(total_questions: u32, accuracy: f64) -> Self {
    if total_questions == 0 {
      return PerformanceLevel::NoData;
    }
    if accuracy >= 0.9 {
      PerformanceLevel::Exceptional
    } else if accuracy >= 0.8 {
      PerformanceLevel::Excellent
    } else if accuracy >= 0.7 {
      PerformanceLevel::Good
    } else if accuracy >= 0.6 {
      PerformanceLevel::Fair
    } else {
      PerformanceLevel::NeedsWork
    }
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct FieldBreakdown {
  pub correct: u32,
  pub total: u32,
  pub accuracy: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct PerformanceReport {
  pub session_id: String,
  pub total_score: u32,
  pub questions_answered: u32,
  pub correct_answers: u32,
  pub accuracy: f64,
  pub performance_level: PerformanceLevel,
  pub time_spent_secs: u64,
  pub difficulty_reached: f64,
  pub difficulty_progression: Vec<f64>,
  pub field_performance: BTreeMap<Field, FieldBreakdown>,
  pub strengths: Vec<String>,
  pub weaknesses: Vec<String>,
  pub recommendations: Vec<String>,
}

pub fn summarize(state: &SessionState, now_ms: u64) -> PerformanceReport {
  let accuracy = state.accuracy();
  let end = state.ended_at_ms.unwrap_or(now_ms);

  let field_performance: BTreeMap<Field, FieldBreakdown> = state
    .field_scores
    .iter()
    .map(|(f, s)| (*f, FieldBreakdown { correct: s.correct, total: s.total, accuracy: s.accuracy() }))
    .collect();

  let answered = || field_performance.iter().filter(|(_, b)| b.total > 0);
  let strengths: Vec<String> = answered()
    .filter(|(_, b)| b.accuracy >= STRENGTH_AT)
    .map(|(f, _)| f.display_name().to_string())
    .collect();
  let weaknesses: Vec<String> = answered()
    .filter(|(_, b)| b.accuracy < WEAKNESS_BELOW)
    .map(|(f, _)| f.display_name().to_string())
    .collect();

  let recommendations = recommendations(state.total_questions, accuracy, &weaknesses);

  PerformanceReport {
    session_id: state.id.clone(),
    total_score: state.score,
    questions_answered: state.total_questions,
    correct_answers: state.correct_answers,
    accuracy,
    performance_level: PerformanceLevel::from_accuracy(state.total_questions, accuracy),
    time_spent_secs: end.saturating_sub(state.started_at_ms) / 1000,
    difficulty_reached: state.difficulty,
    difficulty_progression: state.difficulty_history.clone(),
    field_performance,
    strengths,
    weaknesses,
    recommendations,
  }
}

fn recommendations(total_questions: u32, accuracy: f64, weaknesses: &[String]) -> Vec<String> {
  if total_questions == 0 {
    return vec!["Complete some questions to see your performance analytics.".into()];
  }
  let mut out = Vec::new();
  if accuracy < 0.6 {
    out.push("Focus on fundamental concepts in your chosen field".into());
    out.push("Take more time to read questions carefully".into());
  } else if accuracy > 0.8 {
    out.push("Try more challenging problems to push your limits".into());
    out.push("Explore advanced topics in your field".into());
  }
  if !weaknesses.is_empty() {
    out.push(format!("Consider practicing more in: {}", weaknesses.join(", ")));
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;

  use crate::config::QuizSettings;
  use crate::domain::FieldScore;
  use crate::repository::QuestionBank;
  use crate::session::Session;

  fn blank_state() -> SessionState {
    let bank = Arc::new(QuestionBank::with_seeds(vec![], Field::Math).unwrap());
    Session::new(bank, Arc::new(QuizSettings::default()), Box::new(|_: usize| 0usize), None)
      .state()
      .clone()
  }

  #[test]
  fn empty_session_has_no_data() {
    let st = blank_state();
    let r = summarize(&st, st.started_at_ms + 5_000);
    assert_eq!(r.performance_level, PerformanceLevel::NoData);
    assert_eq!(r.accuracy, 0.0);
    assert_eq!(r.time_spent_secs, 5);
    assert!(r.strengths.is_empty() && r.weaknesses.is_empty());
    assert_eq!(r.recommendations.len(), 1);
  }

  #[test]
  fn levels_follow_accuracy_bands() {
    assert_eq!(PerformanceLevel::from_accuracy(10, 0.9), PerformanceLevel::Exceptional);
    assert_eq!(PerformanceLevel::from_accuracy(10, 0.8), PerformanceLevel::Excellent);
    assert_eq!(PerformanceLevel::from_accuracy(10, 0.7), PerformanceLevel::Good);
    assert_eq!(PerformanceLevel::from_accuracy(10, 0.6), PerformanceLevel::Fair);
    assert_eq!(PerformanceLevel::from_accuracy(10, 0.59), PerformanceLevel::NeedsWork);
  }

  #[test]
  fn strengths_weaknesses_and_recommendations() {
    let mut st = blank_state();
    st.total_questions = 10;
    st.correct_answers = 5;
    st.score = 20;
    st.field_scores.insert(Field::Math, FieldScore { correct: 4, total: 5 });
    st.field_scores.insert(Field::Language, FieldScore { correct: 1, total: 5 });
    st.field_scores.insert(Field::Logic, FieldScore::default());
    st.difficulty_history = vec![1.3, 1.0];
    st.ended_at_ms = Some(st.started_at_ms + 61_000);

    let r = summarize(&st, st.started_at_ms + 999_999);
    assert_eq!(r.accuracy, 0.5);
    assert_eq!(r.performance_level, PerformanceLevel::NeedsWork);
    assert_eq!(r.strengths, vec!["Mathematics"]);
    assert_eq!(r.weaknesses, vec!["Language & Verbal"]);
    assert_eq!(r.time_spent_secs, 61);
    assert_eq!(r.difficulty_progression, vec![1.3, 1.0]);
    assert_eq!(r.field_performance.len(), 3);
    assert_eq!(
      r.recommendations,
      vec![
        "Focus on fundamental concepts in your chosen field".to_string(),
        "Take more time to read questions carefully".to_string(),
        "Consider practicing more in: Language & Verbal".to_string(),
      ]
    );
  }

  #[test]
  fn high_accuracy_suggests_harder_material() {
    let mut st = blank_state();
    st.total_questions = 10;
    st.correct_answers = 9;
    st.field_scores.insert(Field::Programming, FieldScore { correct: 9, total: 10 });
    let r = summarize(&st, st.started_at_ms);
    assert_eq!(r.performance_level, PerformanceLevel::Exceptional);
    assert_eq!(r.strengths, vec!["Programming"]);
    assert_eq!(r.recommendations.len(), 2);
    assert!(r.recommendations[0].starts_with("Try more challenging"));
  }
}
