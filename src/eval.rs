//! Fixed-point evaluation of mu-calculus formulas over an LTS.
//!
//! Evaluation is structural recursion over the [`Formula`] tree. Each node
//! yields the [`StateSet`] of states satisfying it. Fixed points are computed
//! by Knaster–Tarski iteration: a `mu` binder climbs from below, a `nu` binder
//! descends from above, and iteration stops once two successive approximations
//! are equal as sets.
//!
//! # Warm starts and the alternation reset
//!
//! A binder does not restart from its extreme value every time it is entered.
//! It resumes from whatever its environment slot holds, which is usually the
//! fixed point of its previous entry. That is sound as long as the enclosing
//! fixed points move the free variables in the same direction as the binder
//! itself iterates. When a `nu` binder is entered while a `mu` iteration is
//! running around it (or a `mu` inside a `nu`), the stale value may sit on the
//! wrong side of the new fixed point. So before iterating, every fixed point of
//! the same kind among the binder itself and its descendants is reset to its
//! extreme value if it has a free variable whose binder is currently open.
//!
//! [`FixpointReset`] selects this rule, a plain restart on every entry, or no
//! reset at all. The last one is only correct for alternation-free formulas.
//!
//! # Termination
//!
//! Monotone formulas converge within `|universe| + 1` iterations per entry.
//! Negation makes non-monotone formulas expressible; those are not detected and
//! may iterate forever.

use std::iter;

use log::{debug, trace};

use crate::formula::{Fixpoint, FixpointKind, Formula, ParsedFormula};
use crate::lts::Lts;
use crate::state_set::StateSet;
use crate::types::{BinderId, Label};

/// Kind of the fixed point currently iterating around a node.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Surrounding {
    None,
    Mu,
    Nu,
}

impl From<FixpointKind> for Surrounding {
    fn from(kind: FixpointKind) -> Self {
        match kind {
            FixpointKind::Smallest => Surrounding::Mu,
            FixpointKind::Largest => Surrounding::Nu,
        }
    }
}

/// What happens to environment slots when a fixed point is (re-)entered.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum FixpointReset {
    /// Reset open same-kind subformulas when entering a fixed point nested in
    /// one of the opposite kind; warm-start otherwise.
    #[default]
    Alternation,
    /// Restart every fixed point from its extreme value on every entry.
    Always,
    /// Always warm-start. Wrong for formulas with alternation depth above one.
    Never,
}

/// Iteration counters of a single binder.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct BinderStats {
    /// Number of times the fixed point was entered.
    pub entries: usize,
    /// Body evaluations over all entries.
    pub iterations: usize,
    /// Largest number of body evaluations within one entry.
    pub max_iterations: usize,
    /// Number of times the slot was reset to its extreme value on entry.
    pub resets: usize,
}

/// Per-binder counters of one checking run, indexed by [`BinderId`].
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct EvalStats {
    binders: Vec<BinderStats>,
}

impl EvalStats {
    fn new(num_binders: usize) -> Self {
        Self {
            binders: vec![BinderStats::default(); num_binders],
        }
    }

    pub fn binder(&self, id: BinderId) -> &BinderStats {
        &self.binders[id.slot()]
    }

    pub fn binders(&self) -> &[BinderStats] {
        &self.binders
    }

    /// Body evaluations over all binders.
    pub fn total_iterations(&self) -> usize {
        self.binders.iter().map(|b| b.iterations).sum()
    }

    pub fn total_resets(&self) -> usize {
        self.binders.iter().map(|b| b.resets).sum()
    }
}

/// Mutable state of one checking run.
///
/// Holds the current approximation and the "open" flag of every binder. An
/// `Evaluation` is exclusively borrowed by the run it belongs to; the formula
/// and the LTS are only read.
pub struct Evaluation<'a> {
    lts: &'a Lts,
    formula: &'a ParsedFormula,
    env: Vec<StateSet>,
    open: Vec<bool>,
    reset: FixpointReset,
    stats: EvalStats,
}

impl<'a> Evaluation<'a> {
    /// Creates the environment: `nu` slots start at the universe, `mu` slots
    /// start empty.
    pub fn new(lts: &'a Lts, formula: &'a ParsedFormula, reset: FixpointReset) -> Self {
        let universe = lts.universe();
        let env = formula
            .binders()
            .iter()
            .map(|b| match b.kind() {
                FixpointKind::Largest => StateSet::all(universe),
                FixpointKind::Smallest => StateSet::none(universe),
            })
            .collect();
        Self {
            lts,
            formula,
            env,
            open: vec![false; formula.num_binders()],
            reset,
            stats: EvalStats::new(formula.num_binders()),
        }
    }

    /// Evaluates the formula root with no surrounding fixed point.
    pub fn run(&mut self) -> StateSet {
        let formula: &'a ParsedFormula = self.formula;
        formula.root().eval(self, Surrounding::None)
    }

    pub fn lts(&self) -> &'a Lts {
        self.lts
    }

    /// Current approximation of a binder.
    pub fn value(&self, id: BinderId) -> &StateSet {
        &self.env[id.slot()]
    }

    /// Returns true while the body of the binder is being iterated.
    pub fn is_open(&self, id: BinderId) -> bool {
        self.open[id.slot()]
    }

    pub fn stats(&self) -> &EvalStats {
        &self.stats
    }

    pub fn into_stats(self) -> EvalStats {
        self.stats
    }

    fn extreme(&self, kind: FixpointKind) -> StateSet {
        match kind {
            FixpointKind::Smallest => StateSet::none(self.lts.universe()),
            FixpointKind::Largest => StateSet::all(self.lts.universe()),
        }
    }

    fn reset_slot(&mut self, id: BinderId, kind: FixpointKind) {
        debug!("reset {} to {}", id, if kind == FixpointKind::Largest { "top" } else { "bottom" });
        let slot = &mut self.env[id.slot()];
        match kind {
            FixpointKind::Smallest => slot.clear(),
            FixpointKind::Largest => slot.fill(),
        }
        self.stats.binders[id.slot()].resets += 1;
    }

    /// Applies the configured reset policy before `id` starts iterating.
    fn prepare_entry(&mut self, id: BinderId, kind: FixpointKind, surrounding: Surrounding) {
        self.stats.binders[id.slot()].entries += 1;
        match self.reset {
            FixpointReset::Never => {}
            FixpointReset::Always => self.reset_slot(id, kind),
            FixpointReset::Alternation => {
                let alternating = matches!(
                    (kind, surrounding),
                    (FixpointKind::Largest, Surrounding::Mu) | (FixpointKind::Smallest, Surrounding::Nu)
                );
                if !alternating {
                    return;
                }
                let formula: &'a ParsedFormula = self.formula;
                let binder = formula.binder(id);
                let candidates = iter::once(id).chain(binder.descendants().iter().copied());
                for dz in candidates {
                    let decl = formula.binder(dz);
                    if decl.kind() != kind {
                        continue;
                    }
                    if decl.occurrences().iter().any(|&b| self.open[b.slot()]) {
                        self.reset_slot(dz, kind);
                    }
                }
            }
        }
    }

    fn record_convergence(&mut self, id: BinderId, iterations: usize) {
        let stats = &mut self.stats.binders[id.slot()];
        stats.iterations += iterations;
        stats.max_iterations = stats.max_iterations.max(iterations);
    }

    /// States with at least one `label`-transition into `target`.
    fn preimage(&self, label: &Label, target: &StateSet) -> StateSet {
        let mut result = StateSet::none(self.lts.universe());
        for s in target {
            for t in self.lts.incoming(s) {
                if label.matches(&t.label) {
                    result.insert(t.from);
                }
            }
        }
        result
    }

    /// `<label>target`
    pub fn diamond(&self, label: &Label, target: &StateSet) -> StateSet {
        self.preimage(label, target)
    }

    /// `[label]target`: states whose every `label`-successor is in `target`.
    pub fn boxed(&self, label: &Label, target: &StateSet) -> StateSet {
        let mut result = self.preimage(label, &!target);
        result.negate();
        result
    }
}

/// Something that evaluates to a set of states within an [`Evaluation`].
pub trait Eval {
    fn eval(&self, ctx: &mut Evaluation<'_>, surrounding: Surrounding) -> StateSet;
}

impl Eval for Formula {
    fn eval(&self, ctx: &mut Evaluation<'_>, surrounding: Surrounding) -> StateSet {
        match self {
            Formula::True => StateSet::all(ctx.lts.universe()),
            Formula::False => StateSet::none(ctx.lts.universe()),
            Formula::And(l, r) => {
                let mut res = l.eval(ctx, surrounding);
                res.intersect_with(&r.eval(ctx, surrounding));
                res
            }
            Formula::Or(l, r) => {
                let mut res = l.eval(ctx, surrounding);
                res.union_with(&r.eval(ctx, surrounding));
                res
            }
            Formula::Not(f) => {
                let mut res = f.eval(ctx, surrounding);
                res.negate();
                res
            }
            Formula::Diamond(label, f) => {
                let target = f.eval(ctx, surrounding);
                ctx.diamond(label, &target)
            }
            Formula::Box(label, f) => {
                let target = f.eval(ctx, surrounding);
                ctx.boxed(label, &target)
            }
            Formula::Var(v) => ctx.value(v.binder).clone(),
            Formula::Fixpoint(fp) => fp.eval(ctx, surrounding),
        }
    }
}

impl Eval for Fixpoint {
    fn eval(&self, ctx: &mut Evaluation<'_>, surrounding: Surrounding) -> StateSet {
        let id = self.binder;
        let slot = id.slot();
        debug!("enter {} {} ({}), surrounding = {:?}", self.kind, self.name, id, surrounding);
        ctx.prepare_entry(id, self.kind, surrounding);

        // The opposite extreme guarantees that the first iteration never
        // counts as converged unless the body really yields that extreme.
        let mut previous = ctx.extreme(self.kind.opposite());
        let mut current = ctx.env[slot].clone();
        let mut iterations = 0;
        loop {
            ctx.env[slot] = current;
            ctx.open[slot] = true;
            let next = self.body.eval(ctx, self.kind.into());
            ctx.open[slot] = false;
            iterations += 1;
            trace!("{} {} iteration {}: {} states", self.kind, self.name, iterations, next.len());

            if next == previous {
                debug!("{} {} converged after {} iterations: {}", self.kind, self.name, iterations, next);
                ctx.env[slot] = next.clone();
                ctx.record_convergence(id, iterations);
                return next;
            }
            previous = next.clone();
            current = next;
        }
    }
}
