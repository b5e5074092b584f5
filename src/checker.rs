//! Model checking front-end.
//!
//! [`Checker`] ties a parsed formula to an LTS: it sets up a fresh
//! [`Evaluation`] for every call, runs it from the formula root and hands back
//! the satisfying states. Deciding what the result means (typically: does the
//! initial state belong to it) is up to the caller.
//!
//! ```
//! use mucalc_rs::checker::Checker;
//! use mucalc_rs::lts::Lts;
//! use mucalc_rs::parser::parse;
//!
//! let lts = Lts::builder(2)
//!     .transition(0, "a", 0)
//!     .transition(0, "a", 1)
//!     .transition(1, "b", 1)
//!     .build()
//!     .unwrap();
//! let formula = parse("<a>true").unwrap();
//!
//! let checker = Checker::new(&lts);
//! let sat = checker.check(&formula);
//! assert_eq!(sat.iter().map(|s| s.index()).collect::<Vec<_>>(), vec![0]);
//! assert!(checker.holds(&formula));
//! ```

use std::path::Path;
use std::sync::Arc;

use log::debug;

use crate::error;
use crate::eval::{EvalStats, Evaluation, FixpointReset};
use crate::formula::ParsedFormula;
use crate::lts::Lts;
use crate::parser::{parse, ParseError};
use crate::state_set::StateSet;

/// Tunables of a checking run.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct CheckerConfig {
    pub reset: FixpointReset,
}

impl CheckerConfig {
    pub fn with_reset(mut self, reset: FixpointReset) -> Self {
        self.reset = reset;
        self
    }
}

/// Checks formulas against a borrowed LTS.
#[derive(Debug, Clone)]
pub struct Checker<'a> {
    lts: &'a Lts,
    config: CheckerConfig,
}

impl<'a> Checker<'a> {
    pub fn new(lts: &'a Lts) -> Self {
        Self::with_config(lts, CheckerConfig::default())
    }

    pub fn with_config(lts: &'a Lts, config: CheckerConfig) -> Self {
        Self { lts, config }
    }

    pub fn lts(&self) -> &'a Lts {
        self.lts
    }

    pub fn config(&self) -> CheckerConfig {
        self.config
    }

    /// Computes the set of states satisfying `formula`.
    pub fn check(&self, formula: &ParsedFormula) -> StateSet {
        self.check_with_stats(formula).0
    }

    /// Like [`Checker::check`], also returning the iteration counters.
    pub fn check_with_stats(&self, formula: &ParsedFormula) -> (StateSet, EvalStats) {
        debug!(
            "check: {} (binders = {}, alternation depth = {}, reset = {:?})",
            formula,
            formula.num_binders(),
            formula.alternation_depth(),
            self.config.reset
        );
        let mut evaluation = Evaluation::new(self.lts, formula, self.config.reset);
        let result = evaluation.run();
        let stats = evaluation.into_stats();
        debug!(
            "check: {} of {} states satisfy the formula ({} iterations)",
            result.len(),
            self.lts.num_states(),
            stats.total_iterations()
        );
        (result, stats)
    }

    /// Parses `src` and checks it.
    pub fn check_str(&self, src: &str) -> Result<StateSet, ParseError> {
        let formula = parse(src)?;
        Ok(self.check(&formula))
    }

    /// Returns true if the initial state satisfies `formula`.
    pub fn holds(&self, formula: &ParsedFormula) -> bool {
        let sat = self.check(formula);
        self.lts.num_states() > 0 && sat.contains(self.lts.initial())
    }
}

/// Result of a [`CheckJob`].
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub satisfying: StateSet,
    pub stats: EvalStats,
    /// Whether the initial state is in `satisfying`.
    pub holds: bool,
}

/// An owned checking task, suitable for moving onto a worker thread.
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
///
/// use mucalc_rs::checker::{CheckJob, CheckerConfig};
/// use mucalc_rs::lts::Lts;
/// use mucalc_rs::parser::parse;
///
/// let lts = Arc::new(Lts::builder(1).transition(0, "a", 0).build().unwrap());
/// let job = CheckJob::new(lts, parse("nu X.<a>X").unwrap(), CheckerConfig::default());
/// let outcome = thread::spawn(move || job.run()).join().unwrap();
/// assert!(outcome.holds);
/// ```
#[derive(Debug, Clone)]
pub struct CheckJob {
    lts: Arc<Lts>,
    formula: ParsedFormula,
    config: CheckerConfig,
}

impl CheckJob {
    pub fn new(lts: Arc<Lts>, formula: ParsedFormula, config: CheckerConfig) -> Self {
        Self { lts, formula, config }
    }

    /// Reads an Aldebaran model and a formula file into a job.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        lts_path: P,
        formula_path: Q,
        config: CheckerConfig,
    ) -> error::Result<Self> {
        let lts = Lts::load(lts_path)?;
        let formula = ParsedFormula::load(formula_path)?;
        Ok(Self::new(Arc::new(lts), formula, config))
    }

    pub fn lts(&self) -> &Lts {
        &self.lts
    }

    pub fn formula(&self) -> &ParsedFormula {
        &self.formula
    }

    pub fn run(self) -> CheckOutcome {
        let checker = Checker::with_config(&self.lts, self.config);
        let (satisfying, stats) = checker.check_with_stats(&self.formula);
        let holds = self.lts.num_states() > 0 && satisfying.contains(self.lts.initial());
        CheckOutcome {
            satisfying,
            stats,
            holds,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use test_log::test;

    use super::*;

    fn lasso() -> Lts {
        Lts::builder(4)
            .transition(0, "a", 1)
            .transition(1, "a", 0)
            .transition(1, "a", 2)
            .transition(2, "a", 3)
            .transition(2, "a", 1)
            .transition(3, "b", 3)
            .build()
            .unwrap()
    }

    #[test]
    fn test_check_str() {
        let lts = lasso();
        let checker = Checker::new(&lts);
        let sat = checker.check_str("<b>true").unwrap();
        assert_eq!(sat.iter().map(|s| s.index()).collect::<Vec<_>>(), vec![3]);
        assert!(checker.check_str("<b>").is_err());
    }

    #[test]
    fn test_holds_uses_initial_state() {
        let lts = lasso();
        let checker = Checker::new(&lts);
        assert!(checker.holds(&parse("<a>true").unwrap()));
        assert!(!checker.holds(&parse("<b>true").unwrap()));

        let from_three = Lts::builder(4).initial(3).transition(3, "b", 3).build().unwrap();
        assert!(Checker::new(&from_three).holds(&parse("<b>true").unwrap()));
    }

    #[test]
    fn test_modality_scope_in_check_str() {
        let lts = Lts::builder(2).transition(0, "a", 1).build().unwrap();
        let checker = Checker::new(&lts);
        let ids = |src: &str| {
            let sat = checker.check_str(src).unwrap();
            sat.iter().map(|s| s.index()).collect::<Vec<_>>()
        };
        assert_eq!(ids("<a>false || true"), vec![0]);
        assert_eq!(ids("(<a>false) || true"), vec![0, 1]);
    }

    #[test]
    fn test_holds_on_empty_lts() {
        let lts = Lts::builder(0).build().unwrap();
        let checker = Checker::new(&lts);
        assert!(!checker.holds(&parse("true").unwrap()));
        assert!(checker.check_str("nu X.X").unwrap().is_empty());
    }

    #[test]
    fn test_config() {
        let config = CheckerConfig::default().with_reset(FixpointReset::Always);
        assert_eq!(config.reset, FixpointReset::Always);
        assert_eq!(CheckerConfig::default().reset, FixpointReset::Alternation);
    }

    #[test]
    fn test_job_on_worker_threads() {
        let lts = Arc::new(lasso());
        let formula = parse("mu X.((<b>true) || <a>X)").unwrap();

        let handles: Vec<_> = [FixpointReset::Alternation, FixpointReset::Always]
            .into_iter()
            .map(|reset| {
                let job = CheckJob::new(lts.clone(), formula.clone(), CheckerConfig { reset });
                thread::spawn(move || job.run())
            })
            .collect();

        for handle in handles {
            let outcome = handle.join().unwrap();
            assert!(outcome.holds);
            assert!(outcome.satisfying.is_all());
        }
    }

    #[test]
    fn test_job_from_files() {
        let dir = std::env::temp_dir().join(format!("mucalc-rs-job-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let model = dir.join("lasso.aut");
        let formula = dir.join("buchi.mcf");
        let bad = dir.join("bad.mcf");
        lasso().save(&model).unwrap();
        std::fs::write(&formula, "% infinitely often a\nnu X.mu Y.((<a>X) || <b>Y)\n").unwrap();
        std::fs::write(&bad, "mu X.").unwrap();

        let job = CheckJob::load(&model, &formula, CheckerConfig::default()).unwrap();
        assert_eq!(job.lts().num_states(), 4);
        assert_eq!(job.formula().alternation_depth(), 2);
        let outcome = job.run();
        assert!(outcome.holds);
        assert_eq!(outcome.satisfying.len(), 3);

        let err = CheckJob::load(&model, &bad, CheckerConfig::default()).unwrap_err();
        assert!(matches!(err, crate::error::Error::Parse(ParseError::UnexpectedEnd { .. })));
        let err = CheckJob::load(dir.join("missing.aut"), &formula, CheckerConfig::default()).unwrap_err();
        assert!(matches!(err, crate::error::Error::Aldebaran(_)));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_shared_formula_across_scoped_threads() {
        let lts = lasso();
        let formula = parse("nu X.mu Y.((<a>X) || <b>Y)").unwrap();
        let shared: &ParsedFormula = &formula;

        let (alternation, always) = thread::scope(|scope| {
            let left = scope.spawn(|| {
                let config = CheckerConfig::default().with_reset(FixpointReset::Alternation);
                Checker::with_config(&lts, config).check(shared)
            });
            let right = scope.spawn(|| {
                let config = CheckerConfig::default().with_reset(FixpointReset::Always);
                Checker::with_config(&lts, config).check(shared)
            });
            (left.join().unwrap(), right.join().unwrap())
        });

        assert_eq!(alternation, always);
        assert_eq!(alternation, Checker::new(&lts).check(&formula));
        assert_eq!(alternation.iter().map(|s| s.index()).collect::<Vec<_>>(), vec![0, 1, 2]);
    }
}
