//! Question selection.
//!
//! Candidates are the field's questions whose stored difficulty is within the
//! tolerance band of the target. An empty band falls back to the whole field, and
//! a field with no questions falls back to the bank's default field. The pick is
//! uniform over the candidates and delegated to a [`Chooser`] so tests can pin it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{Field, QuestionInstance, QuestionRecord};
use crate::repository::QuestionBank;

/// Uniform index source. `pick(len)` must return a value in `0..len`; `len` is never 0.
pub trait Chooser: Send {
  fn pick(&mut self, len: usize) -> usize;
}

impl<F> Chooser for F
where
  F: FnMut(usize) -> usize + Send,
{
  fn pick(&mut self, len: usize) -> usize {
    self(len)
  }
}

/// Production chooser backed by a seedable RNG.
pub struct RandomChooser {
  rng: StdRng,
}

impl RandomChooser {
  pub fn from_entropy() -> Self {
    Self { rng: StdRng::from_entropy() }
  }

  #[cfg(test)]
  pub fn seeded(seed: u64) -> Self {
    Self { rng: StdRng::seed_from_u64(seed) }
  }
}

impl Chooser for RandomChooser {
  fn pick(&mut self, len: usize) -> usize {
    self.rng.gen_range(0..len)
  }
}

/// Records eligible for `field` at `target` difficulty, after both fallbacks.
pub fn candidates(bank: &QuestionBank, field: Field, target: f64, tolerance: f64) -> Vec<&QuestionRecord> {
  let field_questions = bank.questions(field);
  let in_band: Vec<&QuestionRecord> = field_questions
    .iter()
    .filter(|q| (q.difficulty - target).abs() <= tolerance)
    .collect();
  if !in_band.is_empty() {
    return in_band;
  }
  if !field_questions.is_empty() {
    debug!(target: "quiz", %field, target_difficulty = target, "No question within tolerance; using whole field");
    return field_questions.iter().collect();
  }
  debug!(target: "quiz", %field, fallback = %bank.default_field(), "Field has no questions; using fallback field");
  bank.fallback_questions().iter().collect()
}

/// Issue one question instance for `field` at `target` difficulty.
pub fn select(
  bank: &QuestionBank,
  field: Field,
  target: f64,
  tolerance: f64,
  chooser: &mut dyn Chooser,
) -> QuestionInstance {
  let pool = candidates(bank, field, target, tolerance);
  let idx = chooser.pick(pool.len()).min(pool.len() - 1);
  let record = pool[idx];
  let nonce = Uuid::new_v4().simple().to_string();
  QuestionInstance::issue(record, target.round() as u8, &nonce)
}
