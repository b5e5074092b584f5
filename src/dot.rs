//! LTS to DOT (Graphviz) conversion.
//!
//! Renders a transition system as a directed graph, optionally highlighting a
//! set of states (typically the result of a model checking run).
//!
//! # DOT Format
//!
//! The generated DOT output follows these conventions:
//! - **States** are rendered with the configured node shape, labeled with their name
//! - **Highlighted states** are filled with the configured highlight color
//! - **The initial state** gets a double border and an incoming arrow from an invisible node
//! - **Transitions** are directed edges labeled with their action
//!
//! # Examples
//!
//! ```
//! use mucalc_rs::checker::Checker;
//! use mucalc_rs::lts::Lts;
//!
//! let lts = Lts::builder(2).transition(0, "a", 1).build().unwrap();
//! let sat = Checker::new(&lts).check_str("<a>true").unwrap();
//!
//! let dot = lts.to_dot(Some(&sat)).unwrap();
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! ```

use std::fmt::Write as _;

use crate::lts::Lts;
use crate::state_set::StateSet;

/// Configuration options for DOT output generation.
///
/// # Examples
///
/// ```
/// use mucalc_rs::dot::DotConfig;
/// use mucalc_rs::lts::Lts;
///
/// let lts = Lts::builder(1).transition(0, "tick", 0).build().unwrap();
/// let config = DotConfig {
///     node_shape: "box",
///     ..DotConfig::default()
/// };
///
/// let dot = lts.to_dot_with_config(None, &config).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for states (default: "circle")
    pub node_shape: &'static str,
    /// Fill color for highlighted states (default: "lightblue")
    pub highlight_color: &'static str,
    /// Left-to-right layout instead of top-down (default: true)
    pub left_to_right: bool,
    /// Whether to mark the initial state (default: true)
    pub mark_initial: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            node_shape: "circle",
            highlight_color: "lightblue",
            left_to_right: true,
            mark_initial: true,
        }
    }
}

/// Escapes a string for use inside a double-quoted DOT identifier.
fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

impl Lts {
    /// Converts the LTS to DOT format, highlighting the states of `highlight`.
    pub fn to_dot(&self, highlight: Option<&StateSet>) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(highlight, &DotConfig::default())
    }

    /// Converts the LTS to DOT format with custom configuration.
    ///
    /// # Panics
    ///
    /// Panics if `highlight` is a set over a different universe.
    pub fn to_dot_with_config(
        &self,
        highlight: Option<&StateSet>,
        config: &DotConfig,
    ) -> Result<String, std::fmt::Error> {
        if let Some(set) = highlight {
            assert!(
                set.universe().same_as(self.universe()),
                "highlighted states belong to a different universe"
            );
        }

        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        if config.left_to_right {
            writeln!(dot, "rankdir=LR;")?;
        }
        writeln!(dot, "node [shape={}];", config.node_shape)?;

        if config.mark_initial && self.num_states() > 0 {
            writeln!(dot, "init [shape=point, style=invis];")?;
        }

        for state in self.states() {
            let id = state.id();
            let mut attrs = vec![format!("label=\"{}\"", escape(state.name()))];
            if highlight.is_some_and(|set| set.contains(id)) {
                attrs.push(format!("style=filled, fillcolor={}", config.highlight_color));
            }
            if config.mark_initial && id == self.initial() {
                attrs.push("peripheries=2".to_string());
            }
            writeln!(dot, "{} [{}];", id.index(), attrs.join(", "))?;
        }

        if config.mark_initial && self.num_states() > 0 {
            writeln!(dot, "init -> {};", self.initial().index())?;
        }

        for t in self.transitions() {
            writeln!(
                dot,
                "{} -> {} [label=\"{}\"];",
                t.from.index(),
                t.to.index(),
                escape(t.label.as_str())
            )?;
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}
