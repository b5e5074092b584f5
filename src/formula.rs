//! Modal mu-calculus formulas.
//!
//! The AST is immutable once parsed. Everything the evaluator mutates during a
//! run (current approximations, "open" flags) lives in a separate per-run
//! context (see [`crate::eval::Evaluation`]), so one [`ParsedFormula`] can be
//! checked by several threads at the same time.
//!
//! Fixed-point nodes refer to their declaration by [`BinderId`]. The declaration
//! ([`Binder`]) carries the metadata the alternation reset needs: which fixed
//! points are nested inside the binder's body, and which binders the variable
//! occurrences inside that body refer to.

use std::fmt;

use crate::types::{BinderId, Label};

/// Kind of a fixed-point binder.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FixpointKind {
    /// Least fixed point, `mu X.f`.
    Smallest,
    /// Greatest fixed point, `nu X.f`.
    Largest,
}

impl FixpointKind {
    /// Keyword used in the concrete syntax.
    pub fn keyword(self) -> &'static str {
        match self {
            FixpointKind::Smallest => "mu",
            FixpointKind::Largest => "nu",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            FixpointKind::Smallest => FixpointKind::Largest,
            FixpointKind::Largest => FixpointKind::Smallest,
        }
    }
}

impl fmt::Display for FixpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A `mu X.f` or `nu X.f` node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixpoint {
    pub kind: FixpointKind,
    pub name: char,
    pub binder: BinderId,
    pub body: Box<Formula>,
}

/// An occurrence of a bound variable.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: char,
    pub binder: BinderId,
}

/// Mu-calculus formula abstract syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    True,
    False,
    /// Conjunction
    And(Box<Formula>, Box<Formula>),
    /// Disjunction
    Or(Box<Formula>, Box<Formula>),
    /// Negation
    Not(Box<Formula>),
    /// Some `label`-successor satisfies the operand: `<a>f`
    Diamond(Label, Box<Formula>),
    /// Every `label`-successor satisfies the operand: `[a]f`
    Box(Label, Box<Formula>),
    Fixpoint(Fixpoint),
    Var(Variable),
}

impl Formula {
    pub fn and(self, other: Self) -> Self {
        Formula::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Self) -> Self {
        Formula::Or(Box::new(self), Box::new(other))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Formula::Not(Box::new(self))
    }

    pub fn diamond(label: impl Into<Label>, operand: Self) -> Self {
        Formula::Diamond(label.into(), Box::new(operand))
    }

    pub fn boxed(label: impl Into<Label>, operand: Self) -> Self {
        Formula::Box(label.into(), Box::new(operand))
    }

    /// Number of AST nodes.
    pub fn size(&self) -> usize {
        match self {
            Formula::True | Formula::False | Formula::Var(_) => 1,
            Formula::And(l, r) | Formula::Or(l, r) => 1 + l.size() + r.size(),
            Formula::Not(f) | Formula::Diamond(_, f) | Formula::Box(_, f) => 1 + f.size(),
            Formula::Fixpoint(fp) => 1 + fp.body.size(),
        }
    }

    /// Syntactic alternation depth: the longest chain of nested binders,
    /// counting one level per change of fixpoint kind along the chain.
    ///
    /// A formula without binders has depth 0; `mu X.<a>X` has depth 1;
    /// `nu X.mu Y.(X || Y)` has depth 2.
    pub fn alternation_depth(&self) -> usize {
        fn go(f: &Formula, outer: Option<(FixpointKind, usize)>) -> usize {
            match f {
                Formula::True | Formula::False | Formula::Var(_) => outer.map_or(0, |(_, d)| d),
                Formula::And(l, r) | Formula::Or(l, r) => go(l, outer).max(go(r, outer)),
                Formula::Not(g) | Formula::Diamond(_, g) | Formula::Box(_, g) => go(g, outer),
                Formula::Fixpoint(fp) => {
                    let depth = match outer {
                        None => 1,
                        Some((kind, d)) if kind == fp.kind => d,
                        Some((_, d)) => d + 1,
                    };
                    go(&fp.body, Some((fp.kind, depth)))
                }
            }
        }
        go(self, None)
    }

    /// Writes the formula so that re-parsing it yields the same tree.
    ///
    /// `tail` is true when nothing but a closing parenthesis or the end of input
    /// can follow. Fixed-point bodies and modal operands extend as far as
    /// possible, so a binder or a modality outside tail position has to be
    /// wrapped in parentheses.
    fn write(&self, f: &mut fmt::Formatter<'_>, tail: bool) -> fmt::Result {
        match self {
            Formula::True => write!(f, "true"),
            Formula::False => write!(f, "false"),
            Formula::Var(v) => write!(f, "{}", v.name),
            Formula::And(l, r) | Formula::Or(l, r) => {
                let op = if matches!(self, Formula::And(..)) { "&&" } else { "||" };
                write!(f, "(")?;
                l.write(f, false)?;
                write!(f, " {} ", op)?;
                r.write(f, true)?;
                write!(f, ")")
            }
            Formula::Not(g) => {
                write!(f, "!")?;
                g.write(f, tail)
            }
            Formula::Diamond(label, g) => Self::write_extending(f, tail, |f| {
                write!(f, "<{}>", label)?;
                g.write(f, true)
            }),
            Formula::Box(label, g) => Self::write_extending(f, tail, |f| {
                write!(f, "[{}]", label)?;
                g.write(f, true)
            }),
            Formula::Fixpoint(fp) => Self::write_extending(f, tail, |f| {
                write!(f, "{} {}.", fp.kind, fp.name)?;
                fp.body.write(f, true)
            }),
        }
    }

    /// Writes an operator whose operand runs to the end of the enclosing group.
    fn write_extending(
        f: &mut fmt::Formatter<'_>,
        tail: bool,
        inner: impl FnOnce(&mut fmt::Formatter<'_>) -> fmt::Result,
    ) -> fmt::Result {
        if tail {
            inner(f)
        } else {
            write!(f, "(")?;
            inner(f)?;
            write!(f, ")")
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, true)
    }
}

/// Declaration of a fixed-point binder, as recorded by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binder {
    name: char,
    kind: FixpointKind,
    id: BinderId,
    /// Fixed points nested (at any depth) inside this binder's body.
    descendants: Vec<BinderId>,
    /// For each variable occurrence inside the body, the binder it refers to.
    occurrences: Vec<BinderId>,
}

impl Binder {
    pub(crate) fn new(name: char, kind: FixpointKind, id: BinderId) -> Self {
        Self {
            name,
            kind,
            id,
            descendants: Vec::new(),
            occurrences: Vec::new(),
        }
    }

    pub(crate) fn add_descendant(&mut self, id: BinderId) {
        self.descendants.push(id);
    }

    pub(crate) fn add_occurrence(&mut self, id: BinderId) {
        self.occurrences.push(id);
    }

    pub fn name(&self) -> char {
        self.name
    }

    pub fn kind(&self) -> FixpointKind {
        self.kind
    }

    pub fn id(&self) -> BinderId {
        self.id
    }

    pub fn descendants(&self) -> &[BinderId] {
        &self.descendants
    }

    pub fn occurrences(&self) -> &[BinderId] {
        &self.occurrences
    }
}

/// A parsed formula: the AST root plus binder declarations in slot order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFormula {
    root: Formula,
    binders: Vec<Binder>,
}

impl ParsedFormula {
    pub(crate) fn new(root: Formula, binders: Vec<Binder>) -> Self {
        debug_assert!(binders.iter().enumerate().all(|(i, b)| b.id.slot() == i));
        Self { root, binders }
    }

    pub fn root(&self) -> &Formula {
        &self.root
    }

    /// Binder declarations, indexed by [`BinderId::slot`].
    pub fn binders(&self) -> &[Binder] {
        &self.binders
    }

    pub fn binder(&self, id: BinderId) -> &Binder {
        &self.binders[id.slot()]
    }

    pub fn num_binders(&self) -> usize {
        self.binders.len()
    }

    pub fn alternation_depth(&self) -> usize {
        self.root.alternation_depth()
    }
}

impl fmt::Display for ParsedFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: char, slot: usize) -> Formula {
        Formula::Var(Variable {
            name,
            binder: BinderId::new(slot),
        })
    }

    fn fix(kind: FixpointKind, name: char, slot: usize, body: Formula) -> Formula {
        Formula::Fixpoint(Fixpoint {
            kind,
            name,
            binder: BinderId::new(slot),
            body: Box::new(body),
        })
    }

    #[test]
    fn test_display_basic() {
        let f = Formula::diamond("a", Formula::True).and(Formula::boxed("b", Formula::False));
        assert_eq!(f.to_string(), "((<a>true) && [b]false)");
        assert_eq!(Formula::True.or(Formula::False).not().to_string(), "!(true || false)");
    }

    #[test]
    fn test_display_fixpoint_in_tail_position() {
        let f = fix(FixpointKind::Largest, 'X', 0, var('X', 0).and(Formula::boxed("a", Formula::False)));
        assert_eq!(f.to_string(), "nu X.(X && [a]false)");
    }

    #[test]
    fn test_display_fixpoint_guarded_on_the_left() {
        let inner = fix(FixpointKind::Smallest, 'Y', 1, var('Y', 1));
        let f = fix(FixpointKind::Largest, 'X', 0, Formula::diamond("a", inner).or(var('X', 0)));
        assert_eq!(f.to_string(), "nu X.((<a>mu Y.Y) || X)");
    }

    #[test]
    fn test_display_modality_scope() {
        let scoped = Formula::diamond("a", Formula::False).or(Formula::True);
        assert_eq!(scoped.to_string(), "((<a>false) || true)");

        let absorbing = Formula::diamond("a", Formula::False.or(Formula::True));
        assert_eq!(absorbing.to_string(), "<a>(false || true)");

        let negated = Formula::boxed("b", Formula::True).not().and(Formula::False);
        assert_eq!(negated.to_string(), "(!([b]true) && false)");
    }

    #[test]
    fn test_size() {
        let f = Formula::diamond("a", Formula::True).and(Formula::False);
        assert_eq!(f.size(), 4);
    }

    #[test]
    fn test_alternation_depth() {
        assert_eq!(Formula::True.alternation_depth(), 0);

        let mu = fix(FixpointKind::Smallest, 'X', 0, Formula::diamond("a", var('X', 0)));
        assert_eq!(mu.alternation_depth(), 1);

        let same = fix(FixpointKind::Smallest, 'Y', 0, mu.clone().or(var('Y', 0)));
        assert_eq!(same.alternation_depth(), 1);

        let alt = fix(FixpointKind::Largest, 'Z', 0, mu.clone());
        assert_eq!(alt.alternation_depth(), 2);

        let deep = fix(FixpointKind::Smallest, 'W', 0, alt.and(mu));
        assert_eq!(deep.alternation_depth(), 3);
    }

    #[test]
    fn test_kind_helpers() {
        assert_eq!(FixpointKind::Smallest.keyword(), "mu");
        assert_eq!(FixpointKind::Largest.to_string(), "nu");
        assert_eq!(FixpointKind::Smallest.opposite(), FixpointKind::Largest);
    }
}
