use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use chomsky::utils::plural;
use chomsky::{
  ChomskyType, CompareOptions, Complexity, Err, ExampleGenerator, Grammar, GrammarComparator,
};

#[derive(Parser)]
#[command(name = "chomsky", version, about = "Classify formal grammars into the Chomsky hierarchy")]
struct Cli {
  /// Log filter used when RUST_LOG is unset
  #[arg(long, global = true, default_value = "warn", value_name = "LEVEL")]
  log_level: String,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Print the type of a grammar and the reasoning behind it
  Classify {
    /// Grammar file, or - for stdin
    file: PathBuf,
  },
  /// Print a grammar in normalized form
  Format {
    /// Grammar file, or - for stdin
    file: PathBuf,
  },
  /// Compare two grammars structurally and by bounded derivation
  Compare {
    left: PathBuf,
    right: PathBuf,
    /// Maximum derivation steps (0 skips the language comparison)
    #[arg(short, long, default_value_t = CompareOptions::default().max_depth)]
    depth: usize,
    /// Strings to show per sample category
    #[arg(short, long, default_value_t = CompareOptions::default().sample_size)]
    samples: usize,
  },
  /// Generate an example grammar of the given type (0-3)
  Example {
    #[arg(value_name = "TYPE")]
    level: ChomskyType,
    #[arg(short, long, default_value = "simple")]
    complexity: Complexity,
    #[arg(long)]
    seed: Option<u64>,
  },
}

fn init_tracing(default_level: &str) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .init();
}

/// Reads and parses a grammar; every parse error ends up in the returned message
fn load(file: &Path) -> Result<Grammar, Err> {
  let src = if file.as_os_str() == "-" {
    let mut src = String::new();
    io::stdin().read_to_string(&mut src)?;
    src
  } else {
    std::fs::read_to_string(file)?
  };

  match src.parse::<Grammar>() {
    Ok(g) => {
      debug!(file = %file.display(), rules = g.len(), "loaded grammar");
      Ok(g)
    }
    Err(errors) => Err(
      format!(
        "{}: {} error{}\n{}",
        file.display(),
        errors.len(),
        plural(errors.len()),
        errors
      )
      .into(),
    ),
  }
}

fn classify(file: &Path) -> Result<(), Err> {
  let g = load(file)?;
  let c = g.classify();

  for line in c.explanation() {
    println!("{}", line);
  }

  if !g.warnings().is_empty() {
    println!();
    for warning in g.warnings() {
      println!("warning: {}", warning);
    }
  }

  println!();
  match c.chomsky_type() {
    Some(t) => println!("{}", t),
    None => println!("unclassified"),
  }
  Ok(())
}

fn compare(left: &Path, right: &Path, options: CompareOptions) -> Result<(), Err> {
  let (lg, rg) = (load(left)?, load(right)?);
  let c = GrammarComparator::with_options(&lg, &rg, options).compare();

  let name = |t: Option<ChomskyType>| t.map_or_else(|| "unclassified".to_string(), |t| t.to_string());
  println!("{}: {}", left.display(), name(c.left_type));
  println!("{}: {}", right.display(), name(c.right_type));

  println!("\nsimilarities:");
  for s in c.similarities.iter() {
    println!("  {}", s);
  }
  println!("differences:");
  for d in c.differences.iter() {
    println!("  {}", d);
  }

  if let Some(sample) = c.sample {
    println!(
      "\nderived within {} steps: {} / {} ({} shared)",
      options.max_depth, sample.left_count, sample.right_count, sample.common_count
    );
  }

  let verdict = match c.same_language {
    Some(false) => "different languages",
    _ => "no difference found (not a proof of equivalence)",
  };
  println!("\n{}", verdict);
  Ok(())
}

fn example(level: ChomskyType, complexity: Complexity, seed: Option<u64>) -> Result<(), Err> {
  let mut generator = match seed {
    Some(seed) => ExampleGenerator::with_seed(seed),
    None => ExampleGenerator::new(),
  };

  let example = generator.generate_and_validate(level, complexity)?;
  println!("{}", example.text);
  if !example.is_valid() {
    eprintln!(
      "warning: requested {}, classified as {:?}",
      example.requested, example.detected
    );
  }
  Ok(())
}

fn run(command: Command) -> Result<(), Err> {
  match command {
    Command::Classify { file } => classify(&file),
    Command::Format { file } => {
      println!("{}", load(&file)?);
      Ok(())
    }
    Command::Compare {
      left,
      right,
      depth,
      samples,
    } => compare(
      &left,
      &right,
      CompareOptions {
        max_depth: depth,
        sample_size: samples,
      },
    ),
    Command::Example {
      level,
      complexity,
      seed,
    } => example(level, complexity, seed),
  }
}

fn main() {
  let cli = Cli::parse();
  init_tracing(&cli.log_level);

  if let Err(e) = run(cli.command) {
    eprintln!("{}", e);
    process::exit(1);
  }
}
