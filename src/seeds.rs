//! Built-in question bank. Guarantees every field is playable without external config.

use crate::domain::{AnswerKind, Field, QuestionRecord};

#[allow(clippy::too_many_arguments)]
fn q(
  id: &str,
  field: Field,
  difficulty: f64,
  prompt: &str,
  kind: AnswerKind,
  options: &[&str],
  answer: &str,
  explanation: &str,
  points: u32,
) -> QuestionRecord {
  QuestionRecord {
    id: id.into(),
    field,
    difficulty,
    prompt: prompt.into(),
    kind,
    options: if options.is_empty() { None } else { Some(options.iter().map(|o| o.to_string()).collect()) },
    correct_answer: answer.into(),
    explanation: if explanation.is_empty() { None } else { Some(explanation.into()) },
    points,
    time_limit: None,
  }
}

pub fn seed_questions() -> Vec<QuestionRecord> {
  use AnswerKind::*;
  use Field::*;

  vec![
    // math
    q("math_1", Math, 1.0, "What is 15 + 27?", Numeric, &[], "42", "15 + 27 = 42", 2),
    q("math_2", Math, 2.0, "Solve for x: 2x + 5 = 13", Numeric, &[], "4", "2x = 13 - 5 = 8, so x = 4", 4),
    q(
      "math_3", Math, 3.0, "What is the derivative of x³ + 2x²?", FreeText, &[], "3x² + 4x",
      "Using the power rule: d/dx(x³) = 3x² and d/dx(2x²) = 4x", 6,
    ),
    q(
      "math_4", Math, 4.0, "What is the sum of the interior angles of a hexagon, in degrees?", Numeric, &[], "720",
      "(n - 2) × 180 = 4 × 180 = 720", 8,
    ),
    // logic
    q(
      "logic_1", Logic, 1.0, "What comes next in the sequence: 2, 4, 8, 16, ?", Numeric, &[], "32",
      "Each number is doubled: 2×2=4, 4×2=8, 8×2=16, 16×2=32", 3,
    ),
    q(
      "logic_2", Logic, 2.0, "If all roses are flowers and all flowers are plants, then all roses are:", MultipleChoice,
      &["Animals", "Plants", "Trees", "Vegetables"], "Plants",
      "This is a syllogism: roses → flowers → plants, therefore roses → plants", 4,
    ),
    q(
      "logic_3", Logic, 3.0, "What is the missing number: 1, 1, 2, 3, 5, 8, ?", Numeric, &[], "13",
      "Each number is the sum of the two before it: 5 + 8 = 13", 6,
    ),
    // programming
    q(
      "prog_1", Programming, 1.0, "What does the following code output? console.log(5 + \"3\")", FreeText, &[], "53",
      "JavaScript converts the number 5 to a string and concatenates it with \"3\"", 3,
    ),
    q(
      "prog_2", Programming, 2.0, "What is the time complexity of binary search?", MultipleChoice,
      &["O(n)", "O(log n)", "O(n²)", "O(1)"], "O(log n)",
      "Binary search eliminates half the search space in each iteration", 5,
    ),
    q(
      "prog_3", Programming, 3.0, "Which data structure serves elements in last-in, first-out order?", MultipleChoice,
      &["Queue", "Stack", "Heap", "Tree"], "Stack", "A stack pushes and pops at the same end", 6,
    ),
    // language
    q(
      "lang_1", Language, 1.0, "What is the plural of \"child\"?", FreeText, &[], "children",
      "Child has an irregular plural form: children", 2,
    ),
    q(
      "lang_2", Language, 2.0, "Which word is closest in meaning to \"ubiquitous\"?", MultipleChoice,
      &["Rare", "Everywhere", "Ancient", "Mysterious"], "Everywhere",
      "Ubiquitous means present, appearing, or found everywhere", 4,
    ),
    q(
      "lang_3", Language, 3.0, "Which word is the opposite of \"benevolent\"?", MultipleChoice,
      &["Kind", "Malevolent", "Generous", "Gentle"], "Malevolent",
      "Benevolent means well-meaning; malevolent means wishing harm", 6,
    ),
    // visual-patterns
    q(
      "visual_1", VisualPatterns, 1.0, "How many sides does a hexagon have?", Numeric, &[], "6",
      "A hexagon is a polygon with six sides", 2,
    ),
    q(
      "visual_2", VisualPatterns, 2.0, "If you rotate a square 90 degrees clockwise, what shape do you get?",
      MultipleChoice, &["Triangle", "Square", "Rectangle", "Circle"], "Square",
      "A square rotated 90 degrees remains a square due to its symmetry", 3,
    ),
    q(
      "visual_3", VisualPatterns, 3.0, "How many edges does a cube have?", Numeric, &[], "12",
      "4 edges on top, 4 on the bottom and 4 vertical ones", 6,
    ),
  ]
}
