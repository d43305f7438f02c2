use std::fmt;

use super::{ChomskyType, Report, Violation, lhs_defect};
use crate::grammar::Grammar;
use crate::rules::{Body, Rule, Symbol, is_terminal_string};
use crate::utils::production_str;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  Right,
  Left,
}

impl fmt::Display for Direction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Right => write!(f, "right-linear"),
      Self::Left => write!(f, "left-linear"),
    }
  }
}

/// Shape of a body that is allowed in a regular grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
  /// `S → ε`, start symbol only
  Epsilon,
  /// `A → a`
  Terminal,
  /// `A → B`, fits either direction
  Unit,
  /// `A → aB`
  Right,
  /// `A → Ba`
  Left,
}

impl Form {
  pub fn direction(self) -> Option<Direction> {
    match self {
      Self::Right => Some(Direction::Right),
      Self::Left => Some(Direction::Left),
      _ => None,
    }
  }
}

impl fmt::Display for Form {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::Epsilon => "S → ε",
      Self::Terminal => "A → a",
      Self::Unit => "A → B",
      Self::Right => "A → aB",
      Self::Left => "A → Ba",
    };
    write!(f, "{}", s)
  }
}

fn joined(symbols: &[Symbol]) -> String {
  symbols.iter().map(Symbol::to_string).collect()
}

/// Regular form of one body, or the reason it has none. The left-hand side is
/// checked separately.
pub(super) fn body_form(rule: &Rule, body: &Body, start: Option<&str>) -> Result<Form, String> {
  if body.is_epsilon() {
    return if Some(rule.lhs.as_str()) == start {
      Ok(Form::Epsilon)
    } else {
      Err(format!(
        "ε-production for `{}`, only the start symbol may derive ε",
        rule.lhs
      ))
    };
  }

  let symbols = &body.symbols;
  let positions = symbols
    .iter()
    .enumerate()
    .filter(|(_, s)| s.is_nonterminal())
    .map(|(idx, _)| idx)
    .collect::<Vec<_>>();

  match positions[..] {
    [] => {
      if is_terminal_string(symbols) {
        Ok(Form::Terminal)
      } else {
        Err("the body is not a string of terminals".to_string())
      }
    }
    [idx] => {
      let nt = &symbols[idx];
      let last = symbols.len() - 1;
      if symbols.len() == 1 {
        Ok(Form::Unit)
      } else if idx == last {
        let prefix = &symbols[..idx];
        if is_terminal_string(prefix) {
          Ok(Form::Right)
        } else {
          Err(format!("the prefix `{}` is not terminal-only", joined(prefix)))
        }
      } else if idx == 0 {
        let suffix = &symbols[1..];
        if is_terminal_string(suffix) {
          Ok(Form::Left)
        } else {
          Err(format!("the suffix `{}` is not terminal-only", joined(suffix)))
        }
      } else {
        Err(format!(
          "the non-terminal `{}` sits in the middle of the body, so it is neither right- nor left-linear",
          nt
        ))
      }
    }
    _ => {
      let names = positions
        .iter()
        .map(|idx| symbols[*idx].to_string())
        .collect::<Vec<_>>();
      Err(format!(
        "{} non-terminal occurrences ({}), at most one is allowed",
        names.len(),
        names.join(", ")
      ))
    }
  }
}

/// Type 3: every production is `A → aB | a` (or every one is `A → Ba | a`),
/// with `S → ε` allowed for the start symbol.
pub(super) fn check(g: &Grammar, report: &mut Report) -> bool {
  let level = ChomskyType::Regular;
  let start = g.start_symbol();

  let mut violations = Vec::new();
  let mut forms = Vec::new();

  for rule in g.rules() {
    if let Some(defect) = lhs_defect(&rule.lhs) {
      violations.push(Violation::new(
        level,
        production_str(&rule.lhs, "..."),
        format!("the left-hand side `{}` {}", rule.lhs, defect),
      ));
      continue;
    }

    for body in rule.bodies.iter() {
      match body_form(rule, body, start) {
        Ok(form) => forms.push((rule.production_str(body), form)),
        Err(reason) => violations.push(Violation::new(level, rule.production_str(body), reason)),
      }
    }
  }

  // direction is compared only across bodies that are otherwise regular
  let mut direction = None;
  if violations.is_empty() {
    for (production, form) in forms.iter() {
      let Some(dir) = form.direction() else {
        continue;
      };
      match direction {
        None => direction = Some(dir),
        Some(expected) if expected != dir => violations.push(Violation::new(
          level,
          production.clone(),
          format!(
            "{} mixed into a grammar that is {} so far",
            dir, expected
          ),
        )),
        Some(_) => {}
      }
    }
  }

  if !violations.is_empty() {
    report.fail(level, violations);
    return false;
  }

  report.pass(level);
  report.blank();
  report.line("Every production has a regular form, where A and B are non-terminals");
  report.line("and a is a string of terminals:");
  for (production, form) in forms.iter() {
    report.line(format!("  {} ✓ ({})", production, form));
  }
  if let Some(dir) = direction {
    report.line(format!("The grammar is {}.", dir));
  }
  true
}

#[cfg(test)]
mod tests {
  use super::*;

  fn forms(src: &str) -> Vec<Result<Form, String>> {
    let g: Grammar = src.parse().unwrap();
    g.productions()
      .map(|(rule, body)| body_form(rule, body, g.start_symbol()))
      .collect()
  }

  #[test]
  fn test_body_forms() {
    let found = forms("S -> aA | Ab | A | abc | ε\nA -> a");
    assert_eq!(
      found,
      vec![
        Ok(Form::Right),
        Ok(Form::Left),
        Ok(Form::Unit),
        Ok(Form::Terminal),
        Ok(Form::Epsilon),
        Ok(Form::Terminal),
      ]
    );
  }

  #[test]
  fn test_body_violations() {
    let found = forms("S -> aSb | aAB | SS\nA -> ε");
    assert!(found[0].as_ref().unwrap_err().contains("middle"));
    assert!(found[1].as_ref().unwrap_err().contains("2 non-terminal occurrences"));
    assert!(found[2].is_err());
    assert!(found[3].as_ref().unwrap_err().contains("only the start symbol"));
  }

  #[test]
  fn test_mixed_directions() {
    let g: Grammar = "S -> aA\nA -> Bb\nB -> b".parse().unwrap();
    let mut report = Report::default();
    assert!(!check(&g, &mut report));
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].production, "A → Bb");
    assert!(report.violations[0].reason.contains("left-linear"));
  }

  #[test]
  fn test_unit_productions_are_neutral() {
    let g: Grammar = "S -> A | Ba\nA -> B\nB -> b".parse().unwrap();
    let mut report = Report::default();
    assert!(check(&g, &mut report));
    assert!(report.explanation.iter().any(|l| l == "The grammar is left-linear."));
  }

  #[test]
  fn test_context_rule_is_not_regular() {
    let g: Grammar = "S -> aB\naB -> ab".parse().unwrap();
    let mut report = Report::default();
    assert!(!check(&g, &mut report));
    assert_eq!(report.problematic, vec!["aB → ...".to_string()]);
  }
}
