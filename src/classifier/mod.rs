//! Chomsky hierarchy classification.
//!
//! The checks run strictest first (Type 3, Type 2, Type 1) and the first one
//! that holds decides the type; a grammar that passes none of them is Type 0.
//! Every check writes to one append-only explanation log.

mod context_free;
mod context_sensitive;
mod regular;

use std::fmt;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::grammar::Grammar;
use crate::rules::Rule;
use crate::utils::{plural, production_str};

pub use context_free::{LhsDefect, lhs_defect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChomskyType {
  Unrestricted = 0,
  ContextSensitive = 1,
  ContextFree = 2,
  Regular = 3,
}

impl ChomskyType {
  /// Loosest to strictest
  pub const ALL: [ChomskyType; 4] = [
    Self::Unrestricted,
    Self::ContextSensitive,
    Self::ContextFree,
    Self::Regular,
  ];

  pub fn level(self) -> u8 {
    self as u8
  }

  pub fn from_level(level: u8) -> Option<Self> {
    Self::ALL.get(level as usize).copied()
  }

  pub fn name(self) -> &'static str {
    match self {
      Self::Unrestricted => "recursively enumerable",
      Self::ContextSensitive => "context-sensitive",
      Self::ContextFree => "context-free",
      Self::Regular => "regular",
    }
  }
}

impl fmt::Display for ChomskyType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Type {} ({})", self.level(), self.name())
  }
}

/// Accepts `0`..`3`, `type2`, `type-2` or the type's name
impl FromStr for ChomskyType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let lower = s.trim().to_ascii_lowercase();
    let level = lower
      .strip_prefix("type")
      .map(|rest| rest.trim_start_matches(['-', ' ', '_']))
      .unwrap_or(lower.as_str());

    if let Ok(n) = level.parse::<u8>() {
      return Self::from_level(n).ok_or_else(|| format!("no Chomsky type {}", n));
    }

    match level {
      "unrestricted" | "recursively-enumerable" | "re" => Ok(Self::Unrestricted),
      "context-sensitive" | "csg" => Ok(Self::ContextSensitive),
      "context-free" | "cfg" => Ok(Self::ContextFree),
      "regular" => Ok(Self::Regular),
      _ => Err(format!("unknown Chomsky type `{}`", s)),
    }
  }
}

/// A production that breaks the predicate of one level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
  /// The level whose check found this
  pub level: ChomskyType,
  pub production: String,
  pub reason: String,
}

impl Violation {
  pub fn new(level: ChomskyType, production: String, reason: String) -> Self {
    Self {
      level,
      production,
      reason,
    }
  }
}

impl fmt::Display for Violation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.production, self.reason)
  }
}

/// Outcome of one classification run. Owned by the caller; nothing is shared
/// with the classifier or with other runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
  chomsky_type: Option<ChomskyType>,
  explanation: Vec<String>,
  violations: Vec<Violation>,
  problematic: Vec<String>,
}

impl Classification {
  /// None only for an empty grammar
  pub fn chomsky_type(&self) -> Option<ChomskyType> {
    self.chomsky_type
  }

  pub fn explanation(&self) -> &[String] {
    &self.explanation
  }

  pub fn violations(&self) -> &[Violation] {
    &self.violations
  }

  pub fn violations_at(&self, level: ChomskyType) -> impl Iterator<Item = &Violation> {
    self.violations.iter().filter(move |v| v.level == level)
  }

  /// Offending productions for display; may repeat
  pub fn problematic_productions(&self) -> &[String] {
    &self.problematic
  }
}

/// Append-only log shared by the checks of one run
#[derive(Debug, Default)]
struct Report {
  explanation: Vec<String>,
  violations: Vec<Violation>,
  problematic: Vec<String>,
}

impl Report {
  fn line(&mut self, line: impl Into<String>) {
    self.explanation.push(line.into());
  }

  fn blank(&mut self) {
    self.line("");
  }

  fn heading(&mut self, level: ChomskyType) {
    self.blank();
    self.line(format!("--- Checking {} ---", level));
  }

  fn pass(&mut self, level: ChomskyType) {
    self.line(format!("✓ Meets every condition of {}", level));
  }

  /// Records the violations one check found and lists them in the log
  fn fail(&mut self, level: ChomskyType, violations: Vec<Violation>) {
    self.line(format!(
      "✗ Not {}. {} violation{} found:",
      level,
      violations.len(),
      plural(violations.len())
    ));
    for v in violations {
      self.line(format!("  - {}", v));
      self.problematic.push(v.production.clone());
      self.violations.push(v);
    }
  }

  fn recorded(&self, level: ChomskyType) -> impl Iterator<Item = &Violation> {
    self.violations.iter().filter(move |v| v.level == level)
  }

  fn finish(self, chomsky_type: Option<ChomskyType>) -> Classification {
    Classification {
      chomsky_type,
      explanation: self.explanation,
      violations: self.violations,
      problematic: self.problematic,
    }
  }
}

/// Verdict for one production against one level's predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionVerdict {
  pub production: String,
  pub level: ChomskyType,
  pub complies: bool,
  pub reasons: Vec<String>,
}

pub struct Classifier<'g> {
  grammar: &'g Grammar,
}

impl<'g> Classifier<'g> {
  pub fn new(grammar: &'g Grammar) -> Self {
    Self { grammar }
  }

  pub fn grammar(&self) -> &'g Grammar {
    self.grammar
  }

  pub fn classify(&self) -> Classification {
    let g = self.grammar;
    let mut report = Report::default();

    if g.is_empty() {
      report.line("ERROR: the grammar is empty, it cannot be classified");
      debug!("refused to classify an empty grammar");
      return report.finish(None);
    }

    report.line("Starting classification of the grammar...");
    report.line(format!("Start symbol: {}", g.start_symbol().unwrap_or("-")));
    report.line(format!(
      "Rules: {} ({} production{})",
      g.len(),
      g.production_count(),
      plural(g.production_count())
    ));

    let chomsky_type = if self.holds(ChomskyType::Regular, &mut report) {
      report.blank();
      report.line(format!("Detected type: {}", ChomskyType::Regular));
      report.line("Every production has the form A → aB or A → a (or the mirrored left-linear form).");
      ChomskyType::Regular
    } else if self.holds(ChomskyType::ContextFree, &mut report) {
      report.blank();
      report.line(format!("Detected type: {}", ChomskyType::ContextFree));
      report.line("Every production has the form A → β with a single non-terminal on the left.");
      ChomskyType::ContextFree
    } else if self.holds(ChomskyType::ContextSensitive, &mut report) {
      report.blank();
      report.line(format!("Detected type: {}", ChomskyType::ContextSensitive));
      report.line("Every production has the form αAβ → αγβ with |γ| ≥ 1.");
      ChomskyType::ContextSensitive
    } else {
      self.explain_unrestricted(&mut report);
      ChomskyType::Unrestricted
    };

    debug!(
      %chomsky_type,
      violations = report.violations.len(),
      "classified grammar"
    );
    report.finish(Some(chomsky_type))
  }

  /// Runs the check for one restricted level
  fn holds(&self, level: ChomskyType, report: &mut Report) -> bool {
    report.heading(level);
    let holds = match level {
      ChomskyType::Regular => regular::check(self.grammar, report),
      ChomskyType::ContextFree => context_free::check(self.grammar, report),
      ChomskyType::ContextSensitive => context_sensitive::check(self.grammar, report),
      ChomskyType::Unrestricted => true,
    };
    trace!(%level, holds, "checked level");
    holds
  }

  /// Rebuilds why no restricted level holds
  fn explain_unrestricted(&self, report: &mut Report) {
    report.blank();
    report.line(format!("Detected type: {}", ChomskyType::Unrestricted));
    report.blank();
    report.line("Justification:");
    for reason in unrestricted_reasons(self.grammar) {
      report.line(reason);
    }
    report.blank();
    report.line(format!(
      "Conclusion: the grammar cannot be {}, {} or {}.",
      ChomskyType::ContextSensitive,
      ChomskyType::ContextFree,
      ChomskyType::Regular
    ));
    report.line(format!("It therefore belongs to {}.", ChomskyType::Unrestricted));
  }

  /// Checks one production, given as text, against one level
  pub fn analyze_production_for_type(
    &self,
    lhs: &str,
    body: &str,
    level: ChomskyType,
  ) -> ProductionVerdict {
    let lhs = lhs.trim();
    let body = self.grammar.lexicon().body(body.trim().to_string());
    let rule = Rule::new(lhs.to_string(), self.grammar.tokenize(lhs), Vec::new());
    let start = self.grammar.start_symbol();

    let mut reasons = Vec::new();
    let complies = match level {
      ChomskyType::Regular => {
        let defect = lhs_defect(lhs);
        if let Some(defect) = defect {
          reasons.push(format!("the left-hand side {}", defect));
        }
        let form = regular::body_form(&rule, &body, start);
        match &form {
          Ok(form) => reasons.push(format!("the body has the regular form {}", form)),
          Err(reason) => reasons.push(reason.clone()),
        }
        defect.is_none() && form.is_ok()
      }
      ChomskyType::ContextFree => match lhs_defect(lhs) {
        None => {
          reasons.push("the left-hand side is a single non-terminal".to_string());
          true
        }
        Some(defect) => {
          reasons.push(format!("the left-hand side {}", defect));
          false
        }
      },
      ChomskyType::ContextSensitive => {
        let exempt = body.is_epsilon() && Some(lhs) == start && !self.grammar.start_on_rhs();
        if exempt {
          reasons.push("ε-production of a start symbol that never appears on a right-hand side".to_string());
          true
        } else if body.len() >= rule.lhs_len() {
          reasons.push("the production is non-contracting".to_string());
          true
        } else {
          reasons.push(context_sensitive::contracting_reason(&rule, &body));
          false
        }
      }
      ChomskyType::Unrestricted => {
        reasons.push("Type 0 places no restriction on productions".to_string());
        true
      }
    };

    ProductionVerdict {
      production: production_str(lhs, &body.to_string()),
      level,
      complies,
      reasons,
    }
  }
}

/// Every Type 1 and Type 2 problem of the grammar, as justification bullets
fn unrestricted_reasons(g: &Grammar) -> Vec<String> {
  let start = g.start_symbol();
  let start_on_rhs = g.start_on_rhs();
  let mut reasons = Vec::new();

  for (rule, body) in g.productions() {
    if body.is_epsilon() {
      if Some(rule.lhs.as_str()) != start {
        reasons.push(format!(
          "• {} → ε is an ε-production for a symbol other than the start symbol, which Type 1 does not allow.",
          rule.lhs
        ));
      } else if start_on_rhs {
        reasons.push(format!(
          "• {} → ε is not allowed in Type 1 because {} appears on a right-hand side.",
          rule.lhs, rule.lhs
        ));
      }
    } else if body.len() < rule.lhs_len() {
      reasons.push(format!(
        "• {} breaks |α| ≤ |β| (|{}| = {} > |{}| = {}), so it shrinks the sentential form.",
        rule.production_str(body),
        rule.lhs,
        rule.lhs_len(),
        body,
        body.len()
      ));
    }
  }

  for rule in g.rules() {
    if let Some(defect) = lhs_defect(&rule.lhs) {
      reasons.push(format!(
        "• {} → ... {}, which breaks the A → β shape of Type 2.",
        rule.lhs, defect
      ));
    }
  }

  reasons
}
