use std::fmt;

use super::{ChomskyType, Report, Violation};
use crate::grammar::Grammar;
use crate::parse_grammar::matches_nonterminal_pattern;
use crate::utils::production_str;

/// Why a left-hand side is not exactly one non-terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LhsDefect {
  /// `A B`
  SpaceSeparated,
  /// `aB`, `1A`
  NotANonTerminal,
  /// `CB`, `ABC`
  UppercaseRun,
  /// `AaB`, `A1B`
  ReappearingUppercase,
}

impl fmt::Display for LhsDefect {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::SpaceSeparated => "holds several space-separated symbols",
      Self::NotANonTerminal => "does not match the non-terminal pattern (an uppercase letter, then letters or digits)",
      Self::UppercaseRun => "starts with a run of uppercase letters, so it concatenates non-terminals",
      Self::ReappearingUppercase => {
        "has an uppercase letter after lowercase letters or digits, so it concatenates symbols"
      }
    };
    write!(f, "{}", s)
  }
}

/// First defect found in a left-hand side, or None for a lone non-terminal
pub fn lhs_defect(lhs: &str) -> Option<LhsDefect> {
  if lhs.chars().any(char::is_whitespace) {
    return Some(LhsDefect::SpaceSeparated);
  }
  if !matches_nonterminal_pattern(lhs) {
    return Some(LhsDefect::NotANonTerminal);
  }

  let mut rest = lhs.chars().skip(1).peekable();
  if rest.peek().is_some_and(char::is_ascii_uppercase) {
    return Some(LhsDefect::UppercaseRun);
  }
  if rest.any(|c| c.is_ascii_uppercase()) {
    return Some(LhsDefect::ReappearingUppercase);
  }
  None
}

/// Type 2: every left-hand side is one non-terminal. Bodies are unrestricted.
pub(super) fn check(g: &Grammar, report: &mut Report) -> bool {
  let level = ChomskyType::ContextFree;

  let violations = g
    .rules()
    .iter()
    .filter_map(|rule| {
      lhs_defect(&rule.lhs).map(|defect| {
        Violation::new(
          level,
          production_str(&rule.lhs, "..."),
          format!("the left-hand side `{}` {}", rule.lhs, defect),
        )
      })
    })
    .collect::<Vec<_>>();

  if !violations.is_empty() {
    report.fail(level, violations);
    return false;
  }

  report.pass(level);
  report.blank();
  report.line("Every left-hand side is a single non-terminal:");
  for rule in g.rules() {
    report.line(format!("  {} ✓", rule));
  }

  let not_regular = report
    .recorded(ChomskyType::Regular)
    .map(|v| format!("  - {}", v))
    .collect::<Vec<_>>();
  if !not_regular.is_empty() {
    report.blank();
    report.line(format!("It is not {} because:", ChomskyType::Regular));
    for line in not_regular {
      report.line(line);
    }
  }
  true
}
