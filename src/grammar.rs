use std::collections::BTreeSet;
use std::fmt;

use crate::parse_grammar::Lexicon;
use crate::rules::{Body, Rule, Symbol};
use crate::utils::is_epsilon;

/// Advisory findings of the parser; never fail a parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
  /// Non-terminals used in a body that no left-hand side mentions
  UndefinedNonTerminals(Vec<String>),
  /// Left-hand sides (other than the start symbol) nothing refers to
  UnusedNonTerminals(Vec<String>),
}

impl fmt::Display for Warning {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UndefinedNonTerminals(names) => {
        write!(f, "non-terminals used but never defined: {}", names.join(", "))
      }
      Self::UnusedNonTerminals(names) => {
        write!(f, "non-terminals defined but never used: {}", names.join(", "))
      }
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structure {
  Epsilon,
  TerminalOnly,
  NonTerminalOnly,
  Mixed,
}

impl fmt::Display for Structure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::Epsilon => "epsilon",
      Self::TerminalOnly => "terminal only",
      Self::NonTerminalOnly => "non-terminal only",
      Self::Mixed => "mixed",
    };
    write!(f, "{}", s)
  }
}

/// Shape of a single production, for reports and diagrams
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionAnalysis {
  pub lhs: String,
  pub body: String,
  pub is_epsilon: bool,
  /// Raw character length of the written body
  pub length: usize,
  /// Distinct terminals, in order of first appearance
  pub terminals: Vec<char>,
  /// Distinct non-terminals, in order of first appearance
  pub nonterminals: Vec<String>,
  pub structure: Structure,
}

impl ProductionAnalysis {
  pub fn has_terminal(&self) -> bool {
    !self.terminals.is_empty()
  }

  pub fn has_nonterminal(&self) -> bool {
    !self.nonterminals.is_empty()
  }
}

#[derive(Debug, Clone, Default)]
pub struct Grammar {
  start: Option<String>,
  rules: Vec<Rule>,
  lexicon: Lexicon,
  terminals: BTreeSet<char>,
  nonterminals: BTreeSet<String>,
  warnings: Vec<Warning>,
}

/// Prints the grammar in the notation it was parsed from: the start symbol's
/// line first, then the other left-hand sides in lexical order.
impl fmt::Display for Grammar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let start = self.start.as_deref();

    let mut rest = self
      .rules
      .iter()
      .filter(|r| Some(r.lhs.as_str()) != start)
      .collect::<Vec<_>>();
    rest.sort_by(|a, b| a.lhs.cmp(&b.lhs));

    let ordered = start.and_then(|s| self.rule(s)).into_iter().chain(rest);
    for (idx, rule) in ordered.enumerate() {
      if idx > 0 {
        writeln!(f)?;
      }
      write!(f, "{}", rule)?;
    }
    Ok(())
  }
}

impl Grammar {
  pub(crate) fn new(
    start: Option<String>,
    rules: Vec<Rule>,
    lexicon: Lexicon,
    terminals: BTreeSet<char>,
    nonterminals: BTreeSet<String>,
    warnings: Vec<Warning>,
  ) -> Self {
    Self {
      start,
      rules,
      lexicon,
      terminals,
      nonterminals,
      warnings,
    }
  }

  pub fn start_symbol(&self) -> Option<&str> {
    self.start.as_deref()
  }

  /// Rules in order of first appearance of their left-hand side
  pub fn rules(&self) -> &[Rule] {
    &self.rules
  }

  pub fn rule(&self, lhs: &str) -> Option<&Rule> {
    self.rules.iter().find(|r| r.lhs == lhs)
  }

  /// Every (rule, body) pair, in written order
  pub fn productions(&self) -> impl Iterator<Item = (&Rule, &Body)> {
    self
      .rules
      .iter()
      .flat_map(|r| r.bodies.iter().map(move |b| (r, b)))
  }

  /// Number of distinct left-hand sides
  pub fn len(&self) -> usize {
    self.rules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }

  pub fn production_count(&self) -> usize {
    self.rules.iter().map(Rule::len).sum()
  }

  pub fn terminals(&self) -> &BTreeSet<char> {
    &self.terminals
  }

  pub fn nonterminals(&self) -> &BTreeSet<String> {
    &self.nonterminals
  }

  pub fn warnings(&self) -> &[Warning] {
    &self.warnings
  }

  pub fn lexicon(&self) -> &Lexicon {
    &self.lexicon
  }

  /// Splits text into symbols using this grammar's non-terminal names
  pub fn tokenize(&self, text: &str) -> Vec<Symbol> {
    self.lexicon.tokenize(text)
  }

  /// True when the start symbol occurs on some right-hand side
  pub fn start_on_rhs(&self) -> bool {
    match self.start_symbol() {
      Some(start) => self
        .productions()
        .any(|(_, body)| body.contains_nonterminal(start)),
      None => false,
    }
  }

  /// The productions as plain text, `lhs -> [bodies]`, in rule order.
  /// Every epsilon marker is written as `ε`.
  pub fn production_map(&self) -> Vec<(String, Vec<String>)> {
    self
      .rules
      .iter()
      .map(|r| (r.lhs.clone(), r.bodies.iter().map(Body::to_string).collect()))
      .collect()
  }

  pub fn analyze_production(&self, lhs: &str, body: &str) -> ProductionAnalysis {
    let body = body.trim();
    let epsilon = is_epsilon(body);
    let symbols = self.tokenize(body);

    let mut terminals = Vec::new();
    let mut nonterminals: Vec<String> = Vec::new();
    for symbol in symbols.iter() {
      match symbol {
        Symbol::Terminal(c) if !terminals.contains(c) => terminals.push(*c),
        Symbol::NonTerminal(name) if !nonterminals.contains(name) => {
          nonterminals.push(name.clone())
        }
        _ => {}
      }
    }

    let structure = if epsilon {
      Structure::Epsilon
    } else if nonterminals.is_empty() {
      Structure::TerminalOnly
    } else if terminals.is_empty() {
      Structure::NonTerminalOnly
    } else {
      Structure::Mixed
    };

    ProductionAnalysis {
      lhs: lhs.to_string(),
      body: body.to_string(),
      is_epsilon: epsilon,
      length: body.chars().count(),
      terminals,
      nonterminals,
      structure,
    }
  }
}
