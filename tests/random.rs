//! Randomized cross-checks on seeded random transition systems.
//!
//! Restarting every fixed point from its extreme value on each entry is the
//! textbook algorithm; the warm-start evaluator with alternation resets must
//! agree with it on every graph.

use mucalc_rs::checker::{Checker, CheckerConfig};
use mucalc_rs::eval::FixpointReset;
use mucalc_rs::lts::Lts;
use mucalc_rs::parser::parse;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use test_log::test;

const LABELS: [&str; 3] = ["a", "b", "c"];

fn random_lts(rng: &mut ChaCha8Rng, num_states: usize, num_transitions: usize) -> Lts {
    let mut builder = Lts::builder(num_states);
    for _ in 0..num_transitions {
        let from = rng.random_range(0..num_states);
        let to = rng.random_range(0..num_states);
        let label = LABELS[rng.random_range(0..LABELS.len())];
        builder.add_transition(from, label, to);
    }
    builder.build().unwrap()
}

const FORMULAS: [&str; 10] = [
    // alternation-free
    "mu X.((<c>true) || <a>X)",
    "nu X.((<true>true) && [b]X)",
    "mu X.((<a>X) || mu Y.((<b>Y) || [a]false))",
    // alternating
    "nu X.(([a] mu Y.([b]Y || X)) && nu Z.(<c>X || <b>Z))",
    "nu X.mu Y.((<a>X) || <b>Y)",
    "mu X.((nu Y.(([a]Y) && <true>X)) || <c>true)",
    "nu X.mu Y.(((<b>true) && <true>X) || <true>Y)",
    "nu X.mu Y.nu Z.((<a>X) || ((<b>Y) || <c>Z))",
    "mu W.nu X.mu Y.(((<c>true) && <a>W) || ((<b>X) || [a]Y))",
    "nu A.mu B.nu C.mu D.((<a>A) || ((<b>B) || ((<c>C) || [true]D)))",
];

#[test]
fn alternation_reset_agrees_with_full_restart() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let formulas: Vec<_> = FORMULAS.iter().map(|src| parse(src).unwrap()).collect();

    for _ in 0..200 {
        let num_states = rng.random_range(1..=7);
        let num_transitions = rng.random_range(0..=3 * num_states);
        let lts = random_lts(&mut rng, num_states, num_transitions);

        let warm = Checker::with_config(&lts, CheckerConfig::default().with_reset(FixpointReset::Alternation));
        let cold = Checker::with_config(&lts, CheckerConfig::default().with_reset(FixpointReset::Always));

        for formula in &formulas {
            assert_eq!(
                warm.check(formula),
                cold.check(formula),
                "formula `{}` on\n{}",
                formula,
                lts.to_aldebaran()
            );
        }
    }
}

#[test]
fn never_reset_is_fine_without_alternation() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let formulas: Vec<_> = FORMULAS[..3].iter().map(|src| parse(src).unwrap()).collect();

    for _ in 0..100 {
        let num_states = rng.random_range(1..=7);
        let lts = random_lts(&mut rng, num_states, 2 * num_states);

        let warm = Checker::with_config(&lts, CheckerConfig::default().with_reset(FixpointReset::Never));
        let cold = Checker::with_config(&lts, CheckerConfig::default().with_reset(FixpointReset::Always));
        for formula in &formulas {
            assert_eq!(warm.check(formula), cold.check(formula), "formula `{}`", formula);
        }
    }
}

#[test]
fn iterations_bounded_for_alternation_free_formulas() {
    let mut rng = ChaCha8Rng::seed_from_u64(1234);
    let formulas: Vec<_> = FORMULAS[..3].iter().map(|src| parse(src).unwrap()).collect();

    for _ in 0..100 {
        let num_states = rng.random_range(1..=10);
        let lts = random_lts(&mut rng, num_states, 2 * num_states);
        let checker = Checker::new(&lts);

        for formula in &formulas {
            let (_, stats) = checker.check_with_stats(formula);
            for b in stats.binders() {
                assert!(b.max_iterations <= num_states + 1);
            }
        }
    }
}

#[test]
fn double_negation_and_de_morgan() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    for _ in 0..50 {
        let lts = random_lts(&mut rng, 6, 12);
        let checker = Checker::new(&lts);

        let f = checker.check_str("<a>[b]false").unwrap();
        assert_eq!(checker.check_str("!!<a>[b]false").unwrap(), f);

        let lhs = checker.check_str("!((<a>true) && <b>true)").unwrap();
        let rhs = checker.check_str("(!(<a>true) || !(<b>true))").unwrap();
        assert_eq!(lhs, rhs);

        // Box is the dual of diamond.
        let boxed = checker.check_str("[c]<a>true").unwrap();
        let dual = checker.check_str("!<c>!<a>true").unwrap();
        assert_eq!(boxed, dual);
    }
}
