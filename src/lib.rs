//! # mucalc-rs: modal mu-calculus model checking in Rust
//!
//! **`mucalc-rs`** is an explicit-state model checker for the **modal mu-calculus** over
//! **labeled transition systems (LTS)**. Given a formula and a finite graph, it computes
//! the set of states satisfying the formula.
//!
//! ## The logic
//!
//! ```text
//! f, g ::= true | false | X | (f && g) | (f || g) | !f
//!        | <a>f | [a]f | mu X.f | nu X.f
//! ```
//!
//! `<a>f` holds in states with some `a`-successor satisfying `f`; `[a]f` holds in states
//! whose every `a`-successor satisfies `f`. `mu X.f` and `nu X.f` are the least and greatest
//! fixed points of `f` seen as a function of `X`. The action `true` matches every label.
//!
//! Modalities and binders extend as far right as possible: `<a>f || g` reads as
//! `<a>(f || g)`, and `(<a>f) || g` limits the modality to `f`.
//!
//! ## Key Features
//!
//! - **Set-based evaluation**: state sets are fixed-width bit vectors over a shared [`Universe`][crate::lts::Universe].
//! - **Emerson–Lei style warm starts**: fixed points resume from their last approximation and are
//!   only reset when an alternating outer fixed point has moved their free variables.
//! - **Immutable formulas**: all per-run state lives in an [`Evaluation`][crate::eval::Evaluation],
//!   so one parsed formula may be checked from several threads at once.
//!
//! ## Basic Usage
//!
//! ```rust
//! use mucalc_rs::checker::Checker;
//! use mucalc_rs::lts::Lts;
//! use mucalc_rs::parser::parse;
//!
//! // 1. Build (or load) a transition system
//! let lts = Lts::builder(4)
//!     .transition(0, "a", 1)
//!     .transition(1, "a", 0)
//!     .transition(1, "a", 2)
//!     .transition(2, "a", 3)
//!     .transition(2, "a", 1)
//!     .transition(3, "b", 3)
//!     .build()
//!     .unwrap();
//!
//! // 2. Parse a formula: "there is an infinite path"
//! let formula = parse("nu X.<true>X").unwrap();
//!
//! // 3. Check it
//! let sat = Checker::new(&lts).check(&formula);
//! assert!(sat.is_all());
//! ```
//!
//! ## Core Components
//!
//! - **[`parser`]**: formula syntax and binder bookkeeping.
//! - **[`eval`]**: the fixed-point evaluator.
//! - **[`checker`]**: the front-end tying formulas and graphs together.
//! - **[`aldebaran`]**: reading and writing `.aut` files.
//! - **[`dot`]**: Graphviz export with highlighted states.

pub mod aldebaran;
pub mod bitset;
pub mod checker;
pub mod dot;
pub mod error;
pub mod eval;
pub mod formula;
pub mod lts;
pub mod parser;
pub mod state_set;
pub mod types;
