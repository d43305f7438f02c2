use std::fmt;

use crate::utils::{EPSILON, is_epsilon, production_str};

/// One grammar symbol, as decided by the parser's lexicon
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
  Terminal(char),
  NonTerminal(String),
  Epsilon,
}

impl Symbol {
  pub fn nonterminal(name: &str) -> Self {
    Self::NonTerminal(name.to_string())
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Terminal(_))
  }

  pub fn is_nonterminal(&self) -> bool {
    matches!(self, Self::NonTerminal(_))
  }

  pub fn is_epsilon(&self) -> bool {
    matches!(self, Self::Epsilon)
  }

  pub fn nonterminal_name(&self) -> Option<&str> {
    match self {
      Self::NonTerminal(name) => Some(name),
      _ => None,
    }
  }
}

impl fmt::Display for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Terminal(c) => write!(f, "{}", c),
      Self::NonTerminal(name) => write!(f, "{}", name),
      Self::Epsilon => write!(f, "{}", EPSILON),
    }
  }
}

/// True when every symbol is a lowercase-or-other terminal (or ε).
/// An uppercase terminal can only come from a hand-built symbol list, and is
/// rejected because it reads as a non-terminal.
pub fn is_terminal_string(symbols: &[Symbol]) -> bool {
  symbols.iter().all(|s| match s {
    Symbol::Terminal(c) => !c.is_uppercase(),
    Symbol::Epsilon => true,
    Symbol::NonTerminal(_) => false,
  })
}

/// One alternative on the right-hand side of a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
  /// Written form, whitespace runs collapsed
  pub text: String,
  pub symbols: Vec<Symbol>,
}

impl Body {
  pub fn new(text: String, symbols: Vec<Symbol>) -> Self {
    Self { text, symbols }
  }

  pub fn is_epsilon(&self) -> bool {
    is_epsilon(&self.text)
  }

  /// Raw character length of the written form, 0 for ε
  pub fn len(&self) -> usize {
    if self.is_epsilon() {
      0
    } else {
      self.text.chars().count()
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn nonterminals(&self) -> impl Iterator<Item = &str> {
    self.symbols.iter().filter_map(Symbol::nonterminal_name)
  }

  pub fn count_nonterminals(&self) -> usize {
    self.nonterminals().count()
  }

  pub fn terminals(&self) -> impl Iterator<Item = char> + '_ {
    self.symbols.iter().filter_map(|s| match s {
      Symbol::Terminal(c) => Some(*c),
      _ => None,
    })
  }

  pub fn contains_nonterminal(&self, name: &str) -> bool {
    self.nonterminals().any(|n| n == name)
  }
}

impl fmt::Display for Body {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_epsilon() {
      write!(f, "{}", EPSILON)
    } else {
      write!(f, "{}", self.text)
    }
  }
}

/// All alternatives written for one left-hand side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
  pub lhs: String,
  pub lhs_symbols: Vec<Symbol>,
  pub bodies: Vec<Body>,
}

impl Rule {
  pub fn new(lhs: String, lhs_symbols: Vec<Symbol>, bodies: Vec<Body>) -> Self {
    Self {
      lhs,
      lhs_symbols,
      bodies,
    }
  }

  pub fn len(&self) -> usize {
    self.bodies.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Raw character length of the written left-hand side
  pub fn lhs_len(&self) -> usize {
    self.lhs.chars().count()
  }

  pub fn lhs_nonterminals(&self) -> impl Iterator<Item = &str> {
    self.lhs_symbols.iter().filter_map(Symbol::nonterminal_name)
  }

  /// `lhs → body` for one of this rule's bodies
  pub fn production_str(&self, body: &Body) -> String {
    production_str(&self.lhs, &body.to_string())
  }

  pub fn has_epsilon(&self) -> bool {
    self.bodies.iter().any(Body::is_epsilon)
  }
}

impl fmt::Display for Rule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} →", self.lhs)?;
    for (idx, body) in self.bodies.iter().enumerate() {
      if idx > 0 {
        write!(f, " |")?;
      }
      write!(f, " {}", body)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn t(c: char) -> Symbol {
    Symbol::Terminal(c)
  }

  #[test]
  fn test_body_length_counts_chars() {
    let body = Body::new("aλb".to_string(), vec![t('a'), Symbol::Epsilon, t('b')]);
    assert_eq!(body.len(), 3);

    let eps = Body::new("λ".to_string(), vec![Symbol::Epsilon]);
    assert_eq!(eps.len(), 0);
    assert!(eps.is_epsilon());
    assert_eq!(eps.to_string(), "ε");
  }

  #[test]
  fn test_terminal_string() {
    assert!(is_terminal_string(&[t('a'), t('0'), t('+')]));
    assert!(is_terminal_string(&[]));
    assert!(!is_terminal_string(&[t('a'), Symbol::nonterminal("B")]));
    assert!(!is_terminal_string(&[t('Q')]));
  }

  #[test]
  fn test_rule_display() {
    let rule = Rule::new(
      "A".to_string(),
      vec![Symbol::nonterminal("A")],
      vec![
        Body::new("bB".to_string(), vec![t('b'), Symbol::nonterminal("B")]),
        Body::new("ε".to_string(), vec![Symbol::Epsilon]),
      ],
    );

    assert_eq!(rule.to_string(), "A → bB | ε");
    assert_eq!(rule.production_str(&rule.bodies[0]), "A → bB");
    assert!(rule.has_epsilon());
    assert_eq!(rule.bodies[0].count_nonterminals(), 1);
  }
}
