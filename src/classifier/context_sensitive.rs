use super::{ChomskyType, Report, Violation};
use crate::grammar::Grammar;
use crate::rules::{Body, Rule};
use crate::utils::production_str;

pub(super) fn contracting_reason(rule: &Rule, body: &Body) -> String {
  format!(
    "contracting production: |{}| = {} > |{}| = {}",
    rule.lhs,
    rule.lhs_len(),
    body,
    body.len()
  )
}

/// Type 1: no production shrinks the sentential form. `S → ε` is the only
/// exception, and only while `S` stays off every right-hand side.
pub(super) fn check(g: &Grammar, report: &mut Report) -> bool {
  let level = ChomskyType::ContextSensitive;
  let start = g.start_symbol();
  let start_on_rhs = g.start_on_rhs();

  if let Some(start) = start {
    report.line(format!(
      "Start symbol {} {} on a right-hand side",
      start,
      if start_on_rhs { "appears" } else { "does not appear" }
    ));
  }

  let mut violations = Vec::new();
  for (rule, body) in g.productions() {
    let start_epsilon = body.is_epsilon() && Some(rule.lhs.as_str()) == start;
    if start_epsilon {
      if start_on_rhs {
        violations.push(Violation::new(
          level,
          production_str(&rule.lhs, "ε"),
          format!(
            "{} → ε is not allowed because {} appears on a right-hand side",
            rule.lhs, rule.lhs
          ),
        ));
      }
      continue;
    }

    if body.len() < rule.lhs_len() {
      violations.push(Violation::new(
        level,
        rule.production_str(body),
        contracting_reason(rule, body),
      ));
    }
  }

  if !violations.is_empty() {
    report.fail(level, violations);
    return false;
  }

  report.pass(level);
  report.blank();

  let contextual = g
    .rules()
    .iter()
    .filter(|r| r.lhs_symbols.len() > 1)
    .collect::<Vec<_>>();
  if contextual.is_empty() {
    report.line("No production carries context on its left-hand side.");
  } else {
    report.line("Productions that rewrite inside a context:");
    for rule in contextual {
      report.line(format!("  {}", rule));
    }
  }

  report.blank();
  report.line("Length check |α| ≤ |β|:");
  for (rule, body) in g.productions() {
    if body.is_epsilon() && Some(rule.lhs.as_str()) == start {
      report.line(format!(
        "  {} (allowed for the start symbol)",
        rule.production_str(body)
      ));
    } else {
      report.line(format!(
        "  {}: {} ≤ {} ✓",
        rule.production_str(body),
        rule.lhs_len(),
        body.len()
      ));
    }
  }
  true
}

#[cfg(test)]
mod tests {
  use super::*;

  fn run(src: &str) -> (bool, Report) {
    let g: Grammar = src.parse().unwrap();
    let mut report = Report::default();
    let holds = check(&g, &mut report);
    (holds, report)
  }

  #[test]
  fn test_start_epsilon_exemption() {
    let (holds, report) = run("S -> aA | ε\nA -> a");
    assert!(holds);
    assert!(
      report
        .explanation
        .iter()
        .any(|l| l.contains("allowed for the start symbol"))
    );
  }

  #[test]
  fn test_start_epsilon_revoked() {
    let (holds, report) = run("S -> aSb | ε");
    assert!(!holds);
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].production, "S → ε");
    assert_eq!(report.problematic, vec!["S → ε".to_string()]);
  }

  #[test]
  fn test_lengths_are_raw_characters() {
    // a two-character name counts as two
    let (holds, _) = run("Ab -> Cd\nCd -> c");
    assert!(!holds);

    let (holds, _) = run("CB -> BC\nS -> a");
    assert!(holds);
  }
}
