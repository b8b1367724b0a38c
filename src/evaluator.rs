//! Answer grading.
//!
//! Both sides are lowercased and trimmed, then:
//! - numeric: the leading number of each side is read (trailing text is ignored, so
//!   "42 apples" reads as 42) and compared with an absolute tolerance of 0.001; if
//!   either side has no leading number, plain string equality decides.
//! - multiple-choice: string equality only.
//! - free-text: equality, or either string containing the other. This is lenient on
//!   purpose and short correct answers will match a lot of input.

use crate::domain::{AnswerKind, QuestionInstance};

const NUMERIC_TOLERANCE: f64 = 0.001;

pub fn evaluate(question: &QuestionInstance, raw_answer: &str) -> bool {
  answers_match(question.kind, &question.correct_answer, raw_answer)
}

pub fn answers_match(kind: AnswerKind, correct_answer: &str, raw_answer: &str) -> bool {
  let correct = normalize(correct_answer);
  let user = normalize(raw_answer);

  match kind {
    AnswerKind::Numeric => match (parse_float_prefix(&correct), parse_float_prefix(&user)) {
      (Some(c), Some(u)) => (c - u).abs() < NUMERIC_TOLERANCE,
      _ => correct == user,
    },
    AnswerKind::MultipleChoice => correct == user,
    AnswerKind::FreeText => correct == user || user.contains(&correct) || correct.contains(&user),
  }
}

fn normalize(s: &str) -> String {
  s.trim().to_lowercase()
}

/// Longest numeric prefix of `s`: optional sign, digits with an optional fraction,
/// optional exponent. The keyword `Infinity` is matched case-sensitively, so a
/// lowercased "infinity" has no numeric prefix. `nan`/`inf` spellings are never numbers.
fn parse_float_prefix(s: &str) -> Option<f64> {
  let s = s.trim_start();
  let bytes = s.as_bytes();
  let mut end = 0;
  if matches!(bytes.first(), Some(b'+' | b'-')) {
    end = 1;
  }
  if s[end..].starts_with("Infinity") {
    return Some(if bytes[0] == b'-' { f64::NEG_INFINITY } else { f64::INFINITY });
  }

  let int_digits = count_digits(&bytes[end..]);
  end += int_digits;
  let mut frac_digits = 0;
  if bytes.get(end) == Some(&b'.') {
    frac_digits = count_digits(&bytes[end + 1..]);
    if int_digits > 0 || frac_digits > 0 {
      end += 1 + frac_digits;
    }
  }
  if int_digits == 0 && frac_digits == 0 {
    return None;
  }

  if matches!(bytes.get(end), Some(b'e' | b'E')) {
    let mut exp = end + 1;
    if matches!(bytes.get(exp), Some(b'+' | b'-')) {
      exp += 1;
    }
    let exp_digits = count_digits(&bytes[exp..]);
    if exp_digits > 0 {
      end = exp + exp_digits;
    }
  }
  s[..end].parse().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
  bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
