//! Adaptive difficulty.
//!
//! Accuracy is taken over the whole session so far, not a rolling window. Above
//! `raise_above` the difficulty moves up one `step`, below `lower_below` it moves
//! down one `step`, and in between it holds. The result is clamped to `[min, max]`
//! and rounded to one decimal.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdaptivePolicy {
  pub raise_above: f64,
  pub lower_below: f64,
  pub step: f64,
  pub min: f64,
  pub max: f64,
}

impl Default for AdaptivePolicy {
  fn default() -> Self {
    Self { raise_above: 0.7, lower_below: 0.5, step: 0.3, min: 1.0, max: 5.0 }
  }
}

impl AdaptivePolicy {
  pub fn next(&self, correct_answers: u32, total_questions: u32, current: f64) -> f64 {
    if total_questions == 0 {
      return current;
    }
    let accuracy = correct_answers as f64 / total_questions as f64;
    let next = if accuracy > self.raise_above {
      (current + self.step).min(self.max)
    } else if accuracy < self.lower_below {
      (current - self.step).max(self.min)
    } else {
      current
    };
    round_tenth(next)
  }
}

/// Next difficulty under the default policy (0.7 / 0.5 thresholds, 0.3 step, 1..=5).
#[cfg(test)]
pub fn next_difficulty(correct_answers: u32, total_questions: u32, current: f64) -> f64 {
  AdaptivePolicy::default().next(correct_answers, total_questions, current)
}

/// Half away from zero, one decimal.
pub fn round_tenth(x: f64) -> f64 {
  (x * 10.0).round() / 10.0
}
