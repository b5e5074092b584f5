//! Checks a mu-calculus formula against an Aldebaran (`.aut`) model.
//!
//! ```bash
//! cargo run --example check -- --lts model.aut --formula 'nu X.((<true>true) && [true]X)'
//! cargo run --example check -- --lts model.aut --formula-file deadlock.mcf --dot out.dot
//! ```

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{bail, WrapErr};
use mucalc_rs::checker::{Checker, CheckerConfig};
use mucalc_rs::eval::FixpointReset;
use mucalc_rs::formula::ParsedFormula;
use mucalc_rs::lts::Lts;
use mucalc_rs::parser::parse;

#[derive(Debug, Copy, Clone, ValueEnum)]
enum ResetArg {
    /// Reset only fixed points re-entered under an alternating binder
    Alternation,
    /// Restart every fixed point on entry
    Always,
    /// Never reset (wrong for alternating formulas)
    Never,
}

impl From<ResetArg> for FixpointReset {
    fn from(arg: ResetArg) -> Self {
        match arg {
            ResetArg::Alternation => FixpointReset::Alternation,
            ResetArg::Always => FixpointReset::Always,
            ResetArg::Never => FixpointReset::Never,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Modal mu-calculus model checker")]
struct Cli {
    /// Model in Aldebaran format
    #[arg(long)]
    lts: PathBuf,

    /// Formula text
    #[arg(long, conflicts_with = "formula_file")]
    formula: Option<String>,

    /// File containing the formula
    #[arg(long)]
    formula_file: Option<PathBuf>,

    /// Fixed-point reset strategy
    #[arg(long, value_enum, default_value = "alternation")]
    reset: ResetArg,

    /// Write the model as DOT, highlighting satisfying states
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Print every satisfying state
    #[arg(long)]
    list: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    simplelog::TermLogger::init(
        if cli.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let lts = Lts::load(&cli.lts).wrap_err_with(|| format!("loading {}", cli.lts.display()))?;
    println!(
        "model: {} states, {} transitions, initial state {}",
        lts.num_states(),
        lts.num_transitions(),
        lts.initial().index()
    );

    let formula = match (&cli.formula, &cli.formula_file) {
        (Some(text), None) => parse(text)?,
        (None, Some(path)) => ParsedFormula::load(path).wrap_err_with(|| format!("loading {}", path.display()))?,
        _ => bail!("exactly one of --formula and --formula-file is required"),
    };
    println!(
        "formula: {} (binders: {}, alternation depth: {})",
        formula,
        formula.num_binders(),
        formula.alternation_depth()
    );

    let config = CheckerConfig::default().with_reset(cli.reset.into());
    let checker = Checker::with_config(&lts, config);

    let start = Instant::now();
    let (sat, stats) = checker.check_with_stats(&formula);
    let elapsed = start.elapsed();

    let holds = lts.num_states() > 0 && sat.contains(lts.initial());
    println!("result: {}", if holds { "true" } else { "false" });
    println!(
        "{} of {} states satisfy the formula ({} iterations, {} resets, {:.3} s)",
        sat.len(),
        lts.num_states(),
        stats.total_iterations(),
        stats.total_resets(),
        elapsed.as_secs_f64()
    );
    if cli.list {
        println!("states: {}", sat);
    }

    if let Some(path) = &cli.dot {
        let dot = lts.to_dot(Some(&sat))?;
        std::fs::write(path, dot)?;
        println!("wrote {}", path.display());
    }

    Ok(())
}
