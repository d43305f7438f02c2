//! Line-oriented parsing of production text into a `Grammar`

use std::collections::BTreeSet;
use std::str::FromStr;

use regex::Regex;
use tracing::{debug, trace};

use crate::error::{ParseError, ParseErrors};
use crate::grammar::{Grammar, Warning};
use crate::rules::{Body, Rule, Symbol};
use crate::utils::{is_epsilon, is_epsilon_char};

/// helper macro for initializing a regex with lazy_static!
macro_rules! regex_static {
  ($name:ident, $pattern:expr) => {
    lazy_static! {
      static ref $name: Regex = Regex::new($pattern).unwrap();
    }
  };
}

regex_static!(ARROW, "→|->|::=");
regex_static!(SINGLE_NAME, r"^[A-Z][a-z0-9]*$");
regex_static!(NAME_LIKE, r"^[A-Z][a-zA-Z0-9]*$");
regex_static!(NAME_TOKEN, r"[A-Z][0-9]*");

/// Parses a grammar from text. The start symbol is `S` when `S` has rules,
/// otherwise the left-hand side of the first production.
impl FromStr for Grammar {
  type Err = ParseErrors;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    parse(s)
  }
}

/// True for a lone non-terminal name: one uppercase letter, then lowercase
/// letters or digits (`S`, `A1`, `Expr`). `CB` and `aB` are sentential forms.
pub fn is_single_nonterminal_name(s: &str) -> bool {
  SINGLE_NAME.is_match(s)
}

/// The loose non-terminal pattern: an uppercase letter, then letters or digits.
/// Concatenations such as `CB` or `AaB` still match.
pub fn matches_nonterminal_pattern(s: &str) -> bool {
  NAME_LIKE.is_match(s)
}

/// A left-hand side is a run of space-separated alphanumeric symbols holding
/// at least one non-terminal.
fn is_valid_lhs(s: &str) -> bool {
  regex_static!(LHS_FORM, r"^[A-Za-z0-9]+( [A-Za-z0-9]+)*$");
  LHS_FORM.is_match(s) && s.chars().any(|c| c.is_ascii_uppercase())
}

/// Strips `#` comments, trims and collapses whitespace, and drops blank lines.
/// Each kept line carries its 1-based source line number.
fn clean_lines(s: &str) -> Vec<(usize, String)> {
  regex_static!(WHITESPACE, r"\s+");
  s.lines()
    .enumerate()
    .filter_map(|(idx, line)| {
      let content = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
      };
      let content = WHITESPACE.replace_all(content.trim(), " ");
      if content.is_empty() {
        None
      } else {
        Some((idx + 1, content.into_owned()))
      }
    })
    .collect()
}

/// Format check run before any line is parsed. Reports only the first problem.
fn validate_format(lines: &[(usize, String)]) -> Result<(), ParseError> {
  if lines.is_empty() {
    return Err(ParseError::EmptyGrammar);
  }

  match lines.iter().find(|(_, line)| !ARROW.is_match(line)) {
    Some((line, text)) => Err(ParseError::MissingArrow {
      line: *line,
      text: text.clone(),
    }),
    None => Ok(()),
  }
}

/// Splits once, at the earliest arrow
fn split_arrow(line: &str) -> Option<(&str, &str)> {
  ARROW
    .find(line)
    .map(|m| (&line[..m.start()], &line[m.end()..]))
}

/// One cleaned line into its left-hand side and non-empty bodies
fn parse_line(line_num: usize, line: &str) -> Result<(String, Vec<String>), ParseError> {
  let (lhs, rhs) = split_arrow(line).ok_or_else(|| ParseError::MissingArrow {
    line: line_num,
    text: line.to_string(),
  })?;

  let lhs = lhs.trim();
  if lhs.is_empty() {
    return Err(ParseError::EmptyLhs { line: line_num });
  }

  let bodies = rhs
    .split('|')
    .map(str::trim)
    .filter(|body| !body.is_empty())
    .map(str::to_string)
    .collect::<Vec<_>>();

  if bodies.is_empty() {
    return Err(ParseError::EmptyRhs {
      line: line_num,
      lhs: lhs.to_string(),
    });
  }

  if !is_valid_lhs(lhs) {
    return Err(ParseError::InvalidLhs {
      line: line_num,
      lhs: lhs.to_string(),
    });
  }

  Ok((lhs.to_string(), bodies))
}

/// The set of non-terminal names a grammar knows, used to split written text
/// into symbols. Names are kept longest first so matching is greedy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
  names: Vec<String>,
}

impl Lexicon {
  pub fn new<I>(names: I) -> Self
  where
    I: IntoIterator<Item = String>,
  {
    let mut names = names.into_iter().collect::<BTreeSet<_>>().into_iter().collect::<Vec<_>>();
    // stable sort keeps lexical order between names of equal length
    names.sort_by(|a, b| b.len().cmp(&a.len()));
    Self { names }
  }

  /// Builds the lexicon from raw productions: single-name left-hand sides plus
  /// every `[A-Z][0-9]*` token written anywhere.
  fn discover(raw: &[(String, Vec<String>)]) -> Self {
    let mut names = Vec::new();
    for (lhs, bodies) in raw {
      if is_single_nonterminal_name(lhs) {
        names.push(lhs.clone());
      }
      for text in std::iter::once(lhs).chain(bodies.iter()) {
        names.extend(NAME_TOKEN.find_iter(text).map(|m| m.as_str().to_string()));
      }
    }
    Self::new(names)
  }

  pub fn names(&self) -> &[String] {
    &self.names
  }

  pub fn contains(&self, name: &str) -> bool {
    self.names.iter().any(|n| n == name)
  }

  /// Longest known name at the start of `s`, unless the name runs on into a
  /// digit (then it is only a prefix of a longer token)
  fn match_at(&self, s: &str) -> Option<&String> {
    self.names.iter().find(|name| {
      s.starts_with(name.as_str())
        && !s[name.len()..].starts_with(|c: char| c.is_ascii_digit())
    })
  }

  /// Splits written text into symbols. Whitespace separates symbols and is
  /// otherwise dropped; an epsilon marker on its own is a single `Epsilon`.
  /// Known names win; any other `[A-Z][0-9]*` run is still a non-terminal.
  pub fn tokenize(&self, text: &str) -> Vec<Symbol> {
    if is_epsilon(text) {
      return vec![Symbol::Epsilon];
    }

    let mut symbols = Vec::new();
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
      if let Some(name) = self.match_at(rest) {
        symbols.push(Symbol::NonTerminal(name.clone()));
        rest = &rest[name.len()..];
        continue;
      }

      if let Some(m) = NAME_TOKEN.find(rest).filter(|m| m.start() == 0) {
        symbols.push(Symbol::nonterminal(m.as_str()));
        rest = &rest[m.end()..];
        continue;
      }

      if is_epsilon_char(c) {
        symbols.push(Symbol::Epsilon);
      } else if !c.is_whitespace() {
        symbols.push(Symbol::Terminal(c));
      }
      rest = &rest[c.len_utf8()..];
    }
    symbols
  }

  pub fn body(&self, text: String) -> Body {
    let symbols = self.tokenize(&text);
    Body::new(text, symbols)
  }
}

/// `S` when it has rules, otherwise the first left-hand side
fn find_start_symbol(rules: &[Rule]) -> Option<String> {
  if rules.iter().any(|r| r.lhs == "S") {
    Some("S".to_string())
  } else {
    rules.first().map(|r| r.lhs.clone())
  }
}

/// (terminals, non-terminals) occurring anywhere in the rules
fn extract_symbols(rules: &[Rule]) -> (BTreeSet<char>, BTreeSet<String>) {
  let mut terminals = BTreeSet::new();
  let mut nonterminals = BTreeSet::new();

  let all_symbols = rules.iter().flat_map(|r| {
    r.lhs_symbols
      .iter()
      .chain(r.bodies.iter().flat_map(|b| b.symbols.iter()))
  });

  for symbol in all_symbols {
    match symbol {
      Symbol::Terminal(c) => {
        terminals.insert(*c);
      }
      Symbol::NonTerminal(name) => {
        nonterminals.insert(name.clone());
      }
      Symbol::Epsilon => {}
    }
  }

  (terminals, nonterminals)
}

/// Advisory checks: non-terminals used without rules, and rules nothing uses
fn check_consistency(rules: &[Rule], start: Option<&str>) -> Vec<Warning> {
  let referenced = rules
    .iter()
    .flat_map(|r| r.bodies.iter())
    .flat_map(Body::nonterminals)
    .collect::<BTreeSet<_>>();
  let defined = rules
    .iter()
    .flat_map(Rule::lhs_nonterminals)
    .collect::<BTreeSet<_>>();

  let mut warnings = Vec::new();

  let undefined = referenced
    .difference(&defined)
    .map(|s| s.to_string())
    .collect::<Vec<_>>();
  if !undefined.is_empty() {
    warnings.push(Warning::UndefinedNonTerminals(undefined));
  }

  let mut unused = rules
    .iter()
    .filter(|r| Some(r.lhs.as_str()) != start)
    .filter(|r| r.lhs_nonterminals().all(|n| !referenced.contains(n)))
    .map(|r| r.lhs.clone())
    .collect::<Vec<_>>();
  unused.sort();
  if !unused.is_empty() {
    warnings.push(Warning::UnusedNonTerminals(unused));
  }

  warnings
}

fn build_grammar(raw: Vec<(String, Vec<String>)>) -> Grammar {
  let lexicon = Lexicon::discover(&raw);

  let rules = raw
    .into_iter()
    .map(|(lhs, bodies)| {
      let lhs_symbols = lexicon.tokenize(&lhs);
      let bodies = bodies.into_iter().map(|b| lexicon.body(b)).collect();
      Rule::new(lhs, lhs_symbols, bodies)
    })
    .collect::<Vec<_>>();

  let start = find_start_symbol(&rules);
  let (terminals, nonterminals) = extract_symbols(&rules);
  let warnings = check_consistency(&rules, start.as_deref());

  Grammar::new(start, rules, lexicon, terminals, nonterminals, warnings)
}

/// Parses production text. Format problems stop parsing at once; per-line
/// problems are collected so every bad line is reported together.
pub fn parse(s: &str) -> Result<Grammar, ParseErrors> {
  let lines = clean_lines(s);
  validate_format(&lines)?;

  let mut raw: Vec<(String, Vec<String>)> = Vec::new();
  let mut errors = Vec::new();

  for (line_num, line) in lines.iter() {
    match parse_line(*line_num, line) {
      Ok((lhs, bodies)) => {
        trace!(line = line_num, %lhs, bodies = bodies.len(), "parsed production");
        match raw.iter_mut().find(|(existing, _)| *existing == lhs) {
          Some((_, existing)) => existing.extend(bodies),
          None => raw.push((lhs, bodies)),
        }
      }
      Err(error) => {
        trace!(line = line_num, %error, "rejected production");
        errors.push(error);
      }
    }
  }

  if !errors.is_empty() {
    debug!(errors = errors.len(), "grammar failed to parse");
    return Err(ParseErrors(errors));
  }

  let grammar = build_grammar(raw);
  debug!(
    rules = grammar.len(),
    terminals = grammar.terminals().len(),
    nonterminals = grammar.nonterminals().len(),
    warnings = grammar.warnings().len(),
    "parsed grammar"
  );
  Ok(grammar)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn nt(name: &str) -> Symbol {
    Symbol::nonterminal(name)
  }

  fn t(c: char) -> Symbol {
    Symbol::Terminal(c)
  }

  #[test]
  fn test_clean_lines() {
    let lines = clean_lines("  # header\nS ->  a   A # trailing\n\n\tA -> b\n");
    assert_eq!(
      lines,
      vec![(2, "S -> a A".to_string()), (4, "A -> b".to_string())]
    );
  }

  #[test]
  fn test_all_arrows() {
    for src in ["S → aS | b", "S -> aS | b", "S ::= aS | b"] {
      let g = parse(src).unwrap();
      let rule = g.rule("S").unwrap();
      assert_eq!(
        rule.bodies.iter().map(|b| b.text.as_str()).collect::<Vec<_>>(),
        vec!["aS", "b"],
        "arrow in {src}"
      );
    }
  }

  #[test]
  fn test_split_at_earliest_arrow() {
    assert_eq!(parse_line(1, "A -> b → c"), Ok(("A".to_string(), vec!["b → c".to_string()])));
  }

  #[test]
  fn test_empty_grammar() {
    assert_eq!(parse("").unwrap_err(), ParseErrors(vec![ParseError::EmptyGrammar]));
    assert_eq!(
      parse("  \n# only a comment\n").unwrap_err(),
      ParseErrors(vec![ParseError::EmptyGrammar])
    );
  }

  #[test]
  fn test_missing_arrow_is_single_format_error() {
    let errors = parse("S -> aA\nA bB\nB = a\nC -> ").unwrap_err();
    assert_eq!(
      errors,
      ParseErrors(vec![ParseError::MissingArrow {
        line: 2,
        text: "A bB".to_string()
      }])
    );
    assert!(errors.0[0].is_format_error());
  }

  #[test]
  fn test_line_errors_accumulate() {
    let errors = parse("S -> aA\n -> b\nA -> |\nab -> c\nB -> b").unwrap_err();
    assert_eq!(
      errors.0,
      vec![
        ParseError::EmptyLhs { line: 2 },
        ParseError::EmptyRhs {
          line: 3,
          lhs: "A".to_string()
        },
        ParseError::InvalidLhs {
          line: 4,
          lhs: "ab".to_string()
        },
      ]
    );
  }

  #[test]
  fn test_multi_symbol_lhs_is_accepted() {
    let g = parse("S -> aSBC | aBC\nCB -> BC\naB -> ab\nbB -> bb").unwrap();
    assert_eq!(g.len(), 4);
    assert_eq!(g.rule("CB").unwrap().lhs_symbols, vec![nt("C"), nt("B")]);
    assert_eq!(g.rule("aB").unwrap().lhs_symbols, vec![t('a'), nt("B")]);
  }

  #[test]
  fn test_repeated_lhs_merges_in_order() {
    let g = parse("S -> a\nA -> b\nS -> a | c").unwrap();
    let texts = g
      .rule("S")
      .unwrap()
      .bodies
      .iter()
      .map(|b| b.text.clone())
      .collect::<Vec<_>>();
    assert_eq!(texts, vec!["a", "a", "c"]);
    assert_eq!(g.rules()[0].lhs, "S");
    assert_eq!(g.rules()[1].lhs, "A");
  }

  #[test]
  fn test_start_symbol() {
    assert_eq!(parse("A -> a\nS -> A").unwrap().start_symbol(), Some("S"));
    assert_eq!(parse("Expr -> a\nB -> b").unwrap().start_symbol(), Some("Expr"));
  }

  #[test]
  fn test_tokenize_concatenated_names() {
    let g = parse("S -> aSBC").unwrap();
    assert_eq!(
      g.rule("S").unwrap().bodies[0].symbols,
      vec![t('a'), nt("S"), nt("B"), nt("C")]
    );
  }

  #[test]
  fn test_tokenize_multichar_names() {
    let g = parse("Expr -> Term + Expr | Term\nTerm -> x1 | A12\nA12 -> a").unwrap();
    let expr = g.rule("Expr").unwrap();
    assert_eq!(expr.bodies[0].symbols, vec![nt("Term"), t('+'), nt("Expr")]);

    let term = g.rule("Term").unwrap();
    assert_eq!(term.bodies[0].symbols, vec![t('x'), t('1')]);
    assert_eq!(term.bodies[1].symbols, vec![nt("A12")]);

    let expected = ["A", "A12", "Expr", "T", "Term", "E"]
      .iter()
      .map(|s| s.to_string())
      .collect::<BTreeSet<_>>();
    assert!(g.lexicon().names().iter().all(|n| expected.contains(n)));
    assert_eq!(
      g.nonterminals().iter().cloned().collect::<Vec<_>>(),
      vec!["A12", "Expr", "Term"]
    );
  }

  #[test]
  fn test_name_prefix_guard() {
    let lexicon = Lexicon::new(vec!["A".to_string(), "A1".to_string()]);
    assert_eq!(lexicon.tokenize("aA1b"), vec![t('a'), nt("A1"), t('b')]);
    // "A" followed by a digit is only part of a longer token
    assert_eq!(lexicon.tokenize("A2"), vec![nt("A2")]);
  }

  #[test]
  fn test_unknown_names_are_nonterminals() {
    let lexicon = Lexicon::new(vec!["S".to_string()]);
    assert_eq!(lexicon.tokenize("aB"), vec![t('a'), nt("B")]);
    assert_eq!(lexicon.tokenize("SX1c"), vec![nt("S"), nt("X1"), t('c')]);
    // only ASCII letters start a name
    assert_eq!(lexicon.tokenize("aÑ"), vec![t('a'), t('Ñ')]);
  }

  #[test]
  fn test_symbol_sets() {
    let g = parse("S -> aA | ε\nA -> bB | b\nB -> λ").unwrap();
    assert_eq!(g.terminals().iter().collect::<String>(), "ab");
    assert_eq!(
      g.nonterminals().iter().cloned().collect::<Vec<_>>(),
      vec!["A", "B", "S"]
    );
    assert!(g.rule("B").unwrap().bodies[0].is_epsilon());
  }

  #[test]
  fn test_consistency_warnings() {
    let g = parse("S -> aA | C\nA -> b\nD -> d").unwrap();
    assert_eq!(
      g.warnings(),
      &[
        Warning::UndefinedNonTerminals(vec!["C".to_string()]),
        Warning::UnusedNonTerminals(vec!["D".to_string()]),
      ]
    );

    let clean = parse("S -> aA\nA -> b").unwrap();
    assert!(clean.warnings().is_empty());
  }

  #[test]
  fn test_context_rules_count_as_definitions() {
    let g = parse("S -> aSBC | aBC\nCB -> BC\naB -> ab\nbB -> bb").unwrap();
    assert!(
      !g.warnings()
        .iter()
        .any(|w| matches!(w, Warning::UndefinedNonTerminals(_)))
    );
  }
}
