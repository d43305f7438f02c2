//! Heuristic comparison of two grammars.
//!
//! Structure is compared exactly. Languages are only sampled: every terminal
//! string derivable in at most `max_depth` rewriting steps is enumerated, so a
//! difference is conclusive but agreement is not.

use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, trace};

use crate::classifier::{ChomskyType, Classifier};
use crate::grammar::Grammar;
use crate::rules::{Rule, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareOptions {
  /// Rewriting steps per derivation. 0 skips the language comparison.
  pub max_depth: usize,
  /// Strings kept per category in the `LanguageSample`
  pub sample_size: usize,
}

impl Default for CompareOptions {
  fn default() -> Self {
    Self {
      max_depth: 5,
      sample_size: 10,
    }
  }
}

/// Counts and sorted samples of the bounded languages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageSample {
  pub left_count: usize,
  pub right_count: usize,
  pub common_count: usize,
  pub only_left_count: usize,
  pub only_right_count: usize,
  pub common: Vec<String>,
  pub only_left: Vec<String>,
  pub only_right: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarComparison {
  pub left_type: Option<ChomskyType>,
  pub right_type: Option<ChomskyType>,
  pub same_type: bool,
  /// `Some(false)` when some sampled string belongs to one grammar only.
  /// Never `Some(true)`: agreement up to a depth proves nothing.
  pub same_language: Option<bool>,
  pub differences: Vec<String>,
  pub similarities: Vec<String>,
  /// None when `max_depth` is 0
  pub sample: Option<LanguageSample>,
}

fn type_name(t: Option<ChomskyType>) -> String {
  t.map_or_else(|| "unclassified".to_string(), |t| t.to_string())
}

/// Empty strings are written as ε
fn shown(s: &str) -> &str {
  if s.is_empty() { "ε" } else { s }
}

fn set_str<T: fmt::Display>(set: impl IntoIterator<Item = T>) -> String {
  let items = set.into_iter().map(|i| i.to_string()).collect::<Vec<_>>();
  format!("{{{}}}", items.join(", "))
}

pub struct GrammarComparator<'a> {
  left: &'a Grammar,
  right: &'a Grammar,
  options: CompareOptions,
}

impl<'a> GrammarComparator<'a> {
  pub fn new(left: &'a Grammar, right: &'a Grammar) -> Self {
    Self::with_options(left, right, CompareOptions::default())
  }

  pub fn with_options(left: &'a Grammar, right: &'a Grammar, options: CompareOptions) -> Self {
    Self {
      left,
      right,
      options,
    }
  }

  pub fn compare(&self) -> GrammarComparison {
    let left_type = Classifier::new(self.left).classify().chomsky_type();
    let right_type = Classifier::new(self.right).classify().chomsky_type();

    let mut comparison = GrammarComparison {
      left_type,
      right_type,
      same_type: left_type == right_type,
      same_language: None,
      differences: Vec::new(),
      similarities: Vec::new(),
      sample: None,
    };

    if comparison.same_type {
      comparison
        .similarities
        .push(format!("both grammars are {}", type_name(left_type)));
    } else {
      comparison.differences.push(format!(
        "different types: {} vs {}",
        type_name(left_type),
        type_name(right_type)
      ));
    }

    self.compare_structure(&mut comparison);

    if self.options.max_depth > 0 {
      self.compare_languages(&mut comparison);
    }

    debug!(
      same_type = comparison.same_type,
      same_language = ?comparison.same_language,
      differences = comparison.differences.len(),
      "compared grammars"
    );
    comparison
  }

  fn compare_structure(&self, comparison: &mut GrammarComparison) {
    let (lt, rt) = (self.left.terminals(), self.right.terminals());
    if lt == rt {
      comparison
        .similarities
        .push(format!("identical alphabets: {}", set_str(lt)));
    } else {
      let only_left = lt.difference(rt).collect::<Vec<_>>();
      let only_right = rt.difference(lt).collect::<Vec<_>>();
      if !only_left.is_empty() {
        comparison
          .differences
          .push(format!("terminals only in the first grammar: {}", set_str(only_left)));
      }
      if !only_right.is_empty() {
        comparison
          .differences
          .push(format!("terminals only in the second grammar: {}", set_str(only_right)));
      }
    }

    let (ln, rn) = (self.left.nonterminals(), self.right.nonterminals());
    if ln == rn {
      comparison
        .similarities
        .push(format!("same non-terminals: {}", set_str(ln)));
    } else {
      let only_left = ln.difference(rn).collect::<Vec<_>>();
      let only_right = rn.difference(ln).collect::<Vec<_>>();
      if !only_left.is_empty() {
        comparison
          .differences
          .push(format!("non-terminals only in the first grammar: {}", set_str(only_left)));
      }
      if !only_right.is_empty() {
        comparison
          .differences
          .push(format!("non-terminals only in the second grammar: {}", set_str(only_right)));
      }
    }

    let (lr, rr) = (self.left.len(), self.right.len());
    if lr == rr {
      comparison
        .similarities
        .push(format!("same number of rules: {}", lr));
    } else {
      comparison
        .differences
        .push(format!("different number of rules: {} vs {}", lr, rr));
    }
  }

  fn compare_languages(&self, comparison: &mut GrammarComparison) {
    let depth = self.options.max_depth;
    let left = derive_strings(self.left, depth);
    let right = derive_strings(self.right, depth);

    let common = left.intersection(&right).cloned().collect::<Vec<_>>();
    let only_left = left.difference(&right).cloned().collect::<Vec<_>>();
    let only_right = right.difference(&left).cloned().collect::<Vec<_>>();

    let n = self.options.sample_size;
    let head = |v: &[String]| v.iter().take(n).cloned().collect::<Vec<_>>();
    let listed = |v: &[String]| {
      v.iter()
        .take(5)
        .map(|s| shown(s))
        .collect::<Vec<_>>()
        .join(", ")
    };

    if !only_left.is_empty() {
      comparison.differences.push(format!(
        "strings only the first grammar derives (sample): {}",
        listed(&only_left)
      ));
    }
    if !only_right.is_empty() {
      comparison.differences.push(format!(
        "strings only the second grammar derives (sample): {}",
        listed(&only_right)
      ));
    }

    if !only_left.is_empty() || !only_right.is_empty() {
      comparison.same_language = Some(false);
    } else if !common.is_empty() {
      comparison.similarities.push(format!(
        "all {} strings derived within {} steps are shared",
        common.len(),
        depth
      ));
    }

    comparison.sample = Some(LanguageSample {
      left_count: left.len(),
      right_count: right.len(),
      common_count: common.len(),
      only_left_count: only_left.len(),
      only_right_count: only_right.len(),
      common: head(&common),
      only_left: head(&only_left),
      only_right: head(&only_right),
    });
  }
}

fn substitute(form: &[Symbol], at: usize, width: usize, body: &[Symbol]) -> Vec<Symbol> {
  let mut next = Vec::with_capacity(form.len() - width + body.len());
  next.extend_from_slice(&form[..at]);
  next.extend(body.iter().filter(|s| !s.is_epsilon()).cloned());
  next.extend_from_slice(&form[at + width..]);
  next
}

/// A left-hand side as plain text. `Ca` is one name when written as a rule but
/// `C a` after `AD → AC`, and both spellings must match.
fn lhs_key(rule: &Rule) -> String {
  rule.lhs.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Number of leading symbols of `form` whose text is exactly `key`
fn window(form: &[Symbol], key: &str) -> Option<usize> {
  let mut text = String::new();
  for (idx, symbol) in form.iter().enumerate() {
    text.push_str(&symbol.to_string());
    if text == key {
      return Some(idx + 1);
    }
    if !key.starts_with(text.as_str()) {
      return None;
    }
  }
  None
}

/// Every (position, width, rule) whose left-hand side matches the form
fn matches<'f, 'g>(
  form: &'f [Symbol],
  rules: &'f [(String, &'g Rule)],
) -> impl Iterator<Item = (usize, usize, &'g Rule)> + 'f {
  (0..form.len()).flat_map(move |at| {
    rules
      .iter()
      .filter_map(move |(key, rule)| window(&form[at..], key).map(|width| (at, width, *rule)))
  })
}

/// Terminal strings derivable from the start symbol in at most `max_depth`
/// rewriting steps. A step applies one body of one rule at one position where
/// its left-hand side matches; every such choice is explored. Forms naming a
/// non-terminal that no left-hand side defines are dropped.
pub fn derive_strings(g: &Grammar, max_depth: usize) -> BTreeSet<String> {
  let mut strings = BTreeSet::new();
  let Some(start) = g.start_symbol() else {
    return strings;
  };

  let rules = g
    .rules()
    .iter()
    .map(|r| (lhs_key(r), r))
    .filter(|(key, _)| !key.is_empty())
    .collect::<Vec<_>>();
  let defined = rules
    .iter()
    .flat_map(|&(_, r)| r.lhs_nonterminals())
    .collect::<BTreeSet<_>>();
  let derivable = |form: &Vec<Symbol>| {
    form
      .iter()
      .filter_map(Symbol::nonterminal_name)
      .all(|name| defined.contains(name))
  };

  let mut level = BTreeSet::from([vec![Symbol::nonterminal(start)]]);
  for depth in 0..=max_depth {
    let mut next = BTreeSet::new();
    for form in level.iter() {
      if !form.iter().any(Symbol::is_nonterminal) {
        strings.insert(form.iter().map(Symbol::to_string).collect::<String>());
        continue;
      }
      if depth == max_depth {
        continue;
      }
      for (at, width, rule) in matches(form, &rules) {
        for body in rule.bodies.iter() {
          next.insert(substitute(form, at, width, &body.symbols));
        }
      }
    }
    next.retain(|form| derivable(form));
    trace!(depth, forms = next.len(), strings = strings.len(), "derivation level");
    level = next;
  }

  strings
}

#[cfg(test)]
mod tests {
  use super::*;

  fn grammar(src: &str) -> Grammar {
    src.parse().unwrap()
  }

  fn strings(src: &str, depth: usize) -> Vec<String> {
    derive_strings(&grammar(src), depth).into_iter().collect()
  }

  #[test]
  fn test_derive_context_free() {
    assert_eq!(strings("S -> aSb | ab", 3), vec!["aaabbb", "aabb", "ab"]);
    assert_eq!(strings("S -> aSb | ε", 2), vec!["", "ab"]);
    assert!(strings("S -> aSb | ab", 0).is_empty());
  }

  #[test]
  fn test_derive_context_rules() {
    // a^n b^n c^n
    let src = "S -> aSBC | aBC\nCB -> BC\naB -> ab\nbB -> bb\nbC -> bc\ncC -> cc";
    let found = strings(src, 4);
    assert_eq!(found, vec!["abc"]);
    assert_eq!(strings(src, 7), vec!["aabbcc", "abc"]);
  }

  #[test]
  fn test_derive_through_split_names() {
    // `Ca` is one name on the left but reappears as `C a` after `AD → AC`
    let src = include_str!("../grammars/unrestricted.txt");
    let found = strings(src, 16);
    assert!(found.contains(&"aa".to_string()));
    assert!(found.contains(&"aaaa".to_string()), "{:?}", found);
  }

  #[test]
  fn test_window_matches_text() {
    let form = [Symbol::nonterminal("C"), Symbol::Terminal('a'), Symbol::nonterminal("B")];
    assert_eq!(window(&form, "Ca"), Some(2));
    assert_eq!(window(&form, "C"), Some(1));
    assert_eq!(window(&form, "CB"), None);
    assert_eq!(window(&[Symbol::nonterminal("Ca")], "Ca"), Some(1));
    assert_eq!(window(&[Symbol::nonterminal("Ca")], "C"), None);
  }

  #[test]
  fn test_undefined_nonterminals_are_dropped() {
    assert_eq!(strings("S -> aX | b", 3), vec!["b"]);
  }

  #[test]
  fn test_different_languages() {
    let left = grammar("S -> aSb | ab");
    let right = grammar("S -> aSb | ε");
    let options = CompareOptions {
      max_depth: 3,
      ..Default::default()
    };
    let c = GrammarComparator::with_options(&left, &right, options).compare();

    assert!(c.same_type);
    assert_eq!(c.same_language, Some(false));
    let sample = c.sample.unwrap();
    assert_eq!(sample.only_right, vec!["".to_string()]);
    assert_eq!(sample.only_left, vec!["aaabbb".to_string()]);
    assert_eq!(sample.common_count, 2);
    assert!(c.differences.iter().any(|d| d.contains("ε")));
  }

  #[test]
  fn test_agreement_is_inconclusive() {
    let left = grammar("S -> aA\nA -> b");
    let right = grammar("S -> aB\nB -> b");
    let c = GrammarComparator::new(&left, &right).compare();

    assert_eq!(c.same_language, None);
    assert!(c.similarities.iter().any(|s| s.contains("identical alphabets")));
    assert!(c.differences.iter().any(|d| d.contains("non-terminals only in the first")));
    assert_eq!(c.sample.unwrap().common, vec!["ab".to_string()]);
  }

  #[test]
  fn test_zero_depth_skips_languages() {
    let g = grammar("S -> a");
    let options = CompareOptions {
      max_depth: 0,
      sample_size: 10,
    };
    let c = GrammarComparator::with_options(&g, &g, options).compare();
    assert!(c.sample.is_none());
    assert_eq!(c.same_language, None);
  }
}
