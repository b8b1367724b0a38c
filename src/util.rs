//! Small utility helpers used across modules.

use std::time::{SystemTime, UNIX_EPOCH};

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values in a single
/// pass: substituted values are never scanned again. Unknown keys stay as written.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = String::with_capacity(tpl.len());
  let mut rest = tpl;
  while let Some(open) = rest.find('{') {
    out.push_str(&rest[..open]);
    let tail = &rest[open..];
    let hit = tail[1..].find('}').and_then(|close| {
      let key = &tail[1..1 + close];
      pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| (*v, close + 2))
    });
    match hit {
      Some((value, consumed)) => {
        out.push_str(value);
        rest = &tail[consumed..];
      }
      None => {
        out.push('{');
        rest = &tail[1..];
      }
    }
  }
  out.push_str(rest);
  out
}

/// Log-safe truncation for user-provided text.
/// Cuts on a char boundary so multi-byte input never panics.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut end = max;
  while !s.is_char_boundary(end) { end -= 1; }
  format!("{}… ({} bytes total)", &s[..end], s.len())
}

/// Wall-clock milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_millis() as u64)
    .unwrap_or(0)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn template_replaces_every_occurrence() {
    let out = fill_template("{a} and {a} then {b}", &[("a", "x"), ("b", "y")]);
    assert_eq!(out, "x and x then y");
  }

  #[test]
  fn template_leaves_unknown_keys() {
    assert_eq!(fill_template("hi {name}", &[]), "hi {name}");
    assert_eq!(fill_template("{ {a} {", &[("a", "x")]), "{ x {");
  }

  #[test]
  fn substituted_values_are_not_expanded_again() {
    let out = fill_template(
      "Correct! {explanation} (+{points} points)",
      &[("explanation", "Worth {points} in {field}"), ("points", "3")],
    );
    assert_eq!(out, "Correct! Worth {points} in {field} (+3 points)");
  }

  #[test]
  fn truncation_respects_char_boundaries() {
    let s = "ééééé";
    let t = trunc_for_log(s, 3);
    assert!(t.starts_with('é'));
    assert!(t.contains("10 bytes total"));
    assert_eq!(trunc_for_log("short", 10), "short");
  }
}
