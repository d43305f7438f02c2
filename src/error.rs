use std::fmt;

use thiserror::Error;

/// A problem that stops a grammar from parsing.
///
/// `EmptyGrammar` and `MissingArrow` are format errors and are reported alone;
/// the remaining variants are per-line and accumulate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
  #[error("the grammar is empty")]
  EmptyGrammar,
  #[error("line {line}: no production arrow (→, ->, ::=) in `{text}`")]
  MissingArrow { line: usize, text: String },
  #[error("line {line}: the left-hand side is empty")]
  EmptyLhs { line: usize },
  #[error("line {line}: the right-hand side of `{lhs}` is empty")]
  EmptyRhs { line: usize, lhs: String },
  #[error("line {line}: `{lhs}` is not a valid left-hand side, it must contain a non-terminal (an uppercase letter)")]
  InvalidLhs { line: usize, lhs: String },
}

impl ParseError {
  /// Source line the error points at, if any
  pub fn line(&self) -> Option<usize> {
    match self {
      Self::EmptyGrammar => None,
      Self::MissingArrow { line, .. }
      | Self::EmptyLhs { line }
      | Self::EmptyRhs { line, .. }
      | Self::InvalidLhs { line, .. } => Some(*line),
    }
  }

  pub fn is_format_error(&self) -> bool {
    matches!(self, Self::EmptyGrammar | Self::MissingArrow { .. })
  }
}

/// Every error found in one parse, in line order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrors(pub Vec<ParseError>);

impl ParseErrors {
  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
    self.0.iter()
  }
}

impl From<ParseError> for ParseErrors {
  fn from(error: ParseError) -> Self {
    Self(vec![error])
  }
}

impl IntoIterator for ParseErrors {
  type Item = ParseError;
  type IntoIter = std::vec::IntoIter<ParseError>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.into_iter()
  }
}

impl fmt::Display for ParseErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (idx, error) in self.0.iter().enumerate() {
      if idx > 0 {
        writeln!(f)?;
      }
      write!(f, "{}", error)?;
    }
    Ok(())
  }
}

impl std::error::Error for ParseErrors {}

#[test]
fn test_display_lists_every_error() {
  let errors = ParseErrors(vec![
    ParseError::EmptyLhs { line: 2 },
    ParseError::InvalidLhs {
      line: 5,
      lhs: "ab".to_string(),
    },
  ]);

  let shown = errors.to_string();
  assert_eq!(shown.lines().count(), 2);
  assert!(shown.starts_with("line 2:"));
  assert!(shown.contains("`ab`"));
  assert_eq!(errors.iter().filter_map(ParseError::line).collect::<Vec<_>>(), vec![2, 5]);
}
