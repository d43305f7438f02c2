#[macro_use]
extern crate lazy_static;

pub mod classifier;
pub mod compare;
pub mod error;
pub mod generate;
pub mod grammar;
pub mod parse_grammar;
pub mod rules;
pub mod utils;

use std::fs;
use std::path::Path;

pub use crate::classifier::{ChomskyType, Classification, Classifier, Violation};
pub use crate::compare::{CompareOptions, GrammarComparator, GrammarComparison};
pub use crate::error::{ParseError, ParseErrors};
pub use crate::generate::{Complexity, ExampleGenerator};
pub use crate::grammar::Grammar;
pub use crate::utils::Err;

impl Grammar {
  pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Err> {
    Ok(fs::read_to_string(path)?.parse()?)
  }

  pub fn classify(&self) -> Classification {
    Classifier::new(self).classify()
  }
}

/// Parses and classifies in one step. A grammar that fails to parse is never
/// classified.
pub fn classify_grammar(text: &str) -> Result<(Grammar, Classification), ParseErrors> {
  let grammar = text.parse::<Grammar>()?;
  let classification = grammar.classify();
  Ok((grammar, classification))
}

pub fn compare_grammars(left: &str, right: &str, options: CompareOptions) -> Result<GrammarComparison, Err> {
  let left = left.parse::<Grammar>()?;
  let right = right.parse::<Grammar>()?;
  Ok(GrammarComparator::with_options(&left, &right, options).compare())
}

#[cfg(test)]
macro_rules! example_file {
  ($filename:expr) => {
    (
      $filename,
      include_str!(concat!("../grammars/", $filename)),
    )
  };
}

#[test]
fn test_scenarios() {
  let cases = [
    ("S → aA\nA → bB | b\nB → a", ChomskyType::Regular),
    ("S → aSb | ab", ChomskyType::ContextFree),
    (
      "S → aSBC | aBC\nCB → BC\naB → ab\nbB → bb",
      ChomskyType::ContextSensitive,
    ),
    ("S → ACaB\nCa → aaC\nCB → DB | E", ChomskyType::Unrestricted),
  ];

  for (src, expected) in cases {
    let (_, c) = classify_grammar(src).unwrap();
    assert_eq!(c.chomsky_type(), Some(expected), "{}", src);
  }
}

#[test]
fn test_missing_arrow_is_never_classified() {
  let errors = classify_grammar("S → aA\nA bB").unwrap_err();
  assert_eq!(errors.len(), 1);
  assert!(matches!(errors.0[0], ParseError::MissingArrow { line: 2, .. }));
}

#[test]
fn test_example_grammars() {
  let files = [
    (example_file!("regular.txt"), ChomskyType::Regular),
    (example_file!("context_free.txt"), ChomskyType::ContextFree),
    (example_file!("context_sensitive.txt"), ChomskyType::ContextSensitive),
    (example_file!("unrestricted.txt"), ChomskyType::Unrestricted),
  ];

  for ((name, src), expected) in files {
    let (g, c) = classify_grammar(src).unwrap();
    assert!(g.warnings().is_empty(), "{}: {:?}", name, g.warnings());
    assert_eq!(c.chomsky_type(), Some(expected), "{}", name);
  }
}

#[test]
fn test_compare_grammars() {
  let options = CompareOptions {
    max_depth: 4,
    sample_size: 3,
  };
  let c = compare_grammars("S → aS | a", "S → aA | a\nA → aA | a", options).unwrap();
  assert!(c.same_type);
  assert_eq!(c.same_language, None);

  assert!(compare_grammars("S → a", "S a", options).is_err());
}

#[cfg(test)]
mod proptests {
  use proptest::{collection, prelude::*, sample::select};

  use super::*;

  fn grammar_text() -> impl Strategy<Value = String> {
    let line = (
      select(vec!["S", "A", "B", "Ab", "CB", "aB"]),
      collection::vec("[abcSAB]{1,4}|ε", 1..4),
    );
    collection::vec(line, 1..6).prop_map(|lines| {
      lines
        .into_iter()
        .map(|(lhs, bodies)| format!("{} -> {}", lhs, bodies.join(" | ")))
        .collect::<Vec<_>>()
        .join("\n")
    })
  }

  proptest! {
    #[test]
    fn classification_is_deterministic(src in grammar_text()) {
      let g: Grammar = src.parse().unwrap();
      let classifier = Classifier::new(&g);
      prop_assert_eq!(classifier.classify(), classifier.classify());
    }

    #[test]
    fn format_round_trips(src in grammar_text()) {
      let g: Grammar = src.parse().unwrap();
      let reparsed: Grammar = g.to_string().parse().unwrap();

      let mut expected = g.production_map();
      let mut found = reparsed.production_map();
      expected.sort();
      found.sort();
      prop_assert_eq!(found, expected);
      prop_assert_eq!(reparsed.start_symbol(), g.start_symbol());
    }

    #[test]
    fn detected_type_is_justified(src in grammar_text()) {
      let g: Grammar = src.parse().unwrap();
      let c = g.classify();
      match c.chomsky_type() {
        Some(ChomskyType::Regular) => prop_assert!(c.violations().is_empty()),
        Some(ChomskyType::ContextFree) => {
          prop_assert!(g.rules().iter().all(|r| classifier::lhs_defect(&r.lhs).is_none()));
        }
        Some(ChomskyType::ContextSensitive) => {
          prop_assert!(c.violations_at(ChomskyType::ContextSensitive).next().is_none());
          prop_assert!(c.violations_at(ChomskyType::ContextFree).next().is_some());
        }
        Some(ChomskyType::Unrestricted) => {
          prop_assert!(c.violations_at(ChomskyType::ContextSensitive).next().is_some());
        }
        None => prop_assert!(false, "a parsed grammar always gets a type"),
      }
    }
  }
}
