//! Example grammars for each level of the hierarchy

use std::fmt;
use std::str::FromStr;

use rand::prelude::*;
use tracing::debug;

use crate::classifier::{ChomskyType, Classifier};
use crate::error::ParseErrors;
use crate::grammar::Grammar;

const TERMINALS: [char; 3] = ['a', 'b', 'c'];
const NAMES: [&str; 8] = ["A", "B", "C", "D", "E", "F", "G", "H"];

const CONTEXT_SENSITIVE: &str = "S → aSBC | aBC
CB → BC
aB → ab
bB → bb
bC → bc
cC → cc";

const UNRESTRICTED: &str = "S → ACaB
Ca → aaC
CB → DB | E";

const UNRESTRICTED_EXTRA: &str = "aD → Da
AD → AC
aE → Ea
AE → ε";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Complexity {
  #[default]
  Simple,
  Medium,
  Complex,
}

impl fmt::Display for Complexity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::Simple => "simple",
      Self::Medium => "medium",
      Self::Complex => "complex",
    };
    write!(f, "{}", s)
  }
}

impl FromStr for Complexity {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "simple" => Ok(Self::Simple),
      "medium" => Ok(Self::Medium),
      "complex" => Ok(Self::Complex),
      _ => Err(format!("unknown complexity `{}` (simple, medium, complex)", s)),
    }
  }
}

/// A generated grammar and what the classifier made of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedExample {
  pub requested: ChomskyType,
  pub complexity: Complexity,
  pub text: String,
  pub detected: Option<ChomskyType>,
  pub explanation: Vec<String>,
}

impl GeneratedExample {
  /// True when the classifier agrees with the requested type
  pub fn is_valid(&self) -> bool {
    self.detected == Some(self.requested)
  }
}

pub struct ExampleGenerator {
  rng: StdRng,
}

impl Default for ExampleGenerator {
  fn default() -> Self {
    Self::new()
  }
}

impl ExampleGenerator {
  pub fn new() -> Self {
    Self {
      rng: StdRng::from_entropy(),
    }
  }

  /// Same seed, same grammars
  pub fn with_seed(seed: u64) -> Self {
    Self {
      rng: StdRng::seed_from_u64(seed),
    }
  }

  fn terminal(&mut self) -> char {
    TERMINALS.choose(&mut self.rng).copied().unwrap_or('a')
  }

  /// `S`, then `A`..`H`, then `X1`, `X2`, ...
  fn name(idx: usize) -> String {
    match idx {
      0 => "S".to_string(),
      n if n <= NAMES.len() => NAMES[n - 1].to_string(),
      n => format!("X{}", n - NAMES.len()),
    }
  }

  pub fn generate(&mut self, level: ChomskyType, complexity: Complexity) -> String {
    match level {
      ChomskyType::Regular => self.regular(complexity),
      ChomskyType::ContextFree => self.context_free(complexity),
      ChomskyType::ContextSensitive => CONTEXT_SENSITIVE.to_string(),
      ChomskyType::Unrestricted => match complexity {
        Complexity::Simple => UNRESTRICTED.to_string(),
        _ => format!("{}\n{}", UNRESTRICTED, UNRESTRICTED_EXTRA),
      },
    }
  }

  /// A right-linear chain `S → aA`, `A → bB`, ... ending in a terminal
  fn regular(&mut self, complexity: Complexity) -> String {
    let count = match complexity {
      Complexity::Simple => 3,
      Complexity::Medium => 5,
      Complexity::Complex => 8,
    };

    let mut lines = Vec::with_capacity(count);
    for idx in 0..count {
      let lhs = Self::name(idx);
      let t = self.terminal();
      if idx + 1 < count {
        let mut line = format!("{} → {}{}", lhs, t, Self::name(idx + 1));
        if complexity == Complexity::Complex && self.rng.gen_bool(0.5) {
          line.push_str(&format!(" | {}", self.terminal()));
        }
        lines.push(line);
      } else {
        lines.push(format!("{} → {}", lhs, t));
      }
    }
    lines.join("\n")
  }

  /// Centre-embedding rules, so the result is never regular
  fn context_free(&mut self, complexity: Complexity) -> String {
    let count = match complexity {
      Complexity::Simple => return "S → aSb | ab".to_string(),
      Complexity::Medium => 4,
      Complexity::Complex => 6,
    };

    let mut lines = Vec::with_capacity(count);
    for idx in 0..count {
      let lhs = Self::name(idx);
      let mut bodies = vec![format!("{}{}{}", self.terminal(), lhs, self.terminal())];
      if idx + 1 < count {
        bodies.push(format!(
          "{}{}{}",
          self.terminal(),
          Self::name(idx + 1),
          self.terminal()
        ));
      }
      let base_len = self.rng.gen_range(1..=2);
      bodies.push((0..base_len).map(|_| self.terminal()).collect());
      lines.push(format!("{} → {}", lhs, bodies.join(" | ")));
    }
    lines.join("\n")
  }

  /// Generates a grammar, then parses and classifies it
  pub fn generate_and_validate(
    &mut self,
    level: ChomskyType,
    complexity: Complexity,
  ) -> Result<GeneratedExample, ParseErrors> {
    let text = self.generate(level, complexity);
    let grammar = text.parse::<Grammar>()?;
    let classification = Classifier::new(&grammar).classify();

    let example = GeneratedExample {
      requested: level,
      complexity,
      text,
      detected: classification.chomsky_type(),
      explanation: classification.explanation().to_vec(),
    };
    debug!(
      requested = %level,
      %complexity,
      valid = example.is_valid(),
      "generated example grammar"
    );
    Ok(example)
  }
}
