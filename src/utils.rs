use std::error::Error;

/// Boxed static error type
pub type Err = Box<dyn Error + 'static>;

/// Written forms of the empty string accepted in a production body
pub const EPSILON_MARKERS: [&str; 3] = ["ε", "λ", ""];

/// Canonical marker used when printing an empty body
pub const EPSILON: &str = "ε";

pub fn is_epsilon(text: &str) -> bool {
  EPSILON_MARKERS.contains(&text.trim())
}

pub fn is_epsilon_char(c: char) -> bool {
  c == 'ε' || c == 'λ'
}

/// Renders one production as `lhs → body`
pub fn production_str(lhs: &str, body: &str) -> String {
  format!("{} → {}", lhs, body)
}

/// Pluralizing suffix for counts in explanation text
pub fn plural(n: usize) -> &'static str {
  if n == 1 { "" } else { "s" }
}

#[test]
fn test_epsilon_markers() {
  assert!(is_epsilon("ε"));
  assert!(is_epsilon(" λ "));
  assert!(is_epsilon(""));
  assert!(!is_epsilon("e"));
  assert!(!is_epsilon("aε"));
}
