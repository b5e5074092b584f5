//! Reading and writing labeled transition systems in the Aldebaran format.
//!
//! # Format (.aut)
//!
//! ```text
//! des (<first-state>, <nr-of-transitions>, <nr-of-states>)
//! (<from>, "<label>", <to>)      # one line per transition
//! ```
//!
//! States are numbered densely from `0` to `nr-of-states - 1`. Labels are
//! usually quoted; unquoted labels are accepted as well. A quoted label may
//! contain commas and parentheses. Blank lines are skipped.

use std::fs;
use std::io;
use std::path::Path;

use log::debug;
use thiserror::Error;

use crate::lts::{Lts, LtsBuilder};

/// Errors raised while reading an `.aut` file. Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum AldebaranError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("missing `des (...)` header")]
    MissingHeader,

    #[error("line {line}: malformed header `{text}`, expected `des (first, transitions, states)`")]
    MalformedHeader { line: usize, text: String },

    #[error("line {line}: malformed transition `{text}`, expected `(from, \"label\", to)`")]
    MalformedTransition { line: usize, text: String },

    #[error("line {line}: state {state} is outside 0..{num_states} in `{text}`")]
    StateOutOfRange {
        line: usize,
        state: usize,
        num_states: usize,
        text: String,
    },

    #[error("initial state {initial} is outside 0..{num_states}")]
    InitialOutOfRange { initial: usize, num_states: usize },

    #[error("header declares {declared} transitions, but {found} were found")]
    TransitionCount { declared: usize, found: usize },
}

struct Header {
    initial: usize,
    num_transitions: usize,
    num_states: usize,
}

/// Strips the surrounding parentheses of a `( ... )` tuple.
fn tuple_body(text: &str) -> Option<&str> {
    text.trim().strip_prefix('(')?.strip_suffix(')')
}

fn parse_header(line: usize, text: &str) -> Result<Header, AldebaranError> {
    let malformed = || AldebaranError::MalformedHeader {
        line,
        text: text.to_string(),
    };

    let rest = text.trim().strip_prefix("des").ok_or_else(malformed)?;
    let body = tuple_body(rest).ok_or_else(malformed)?;
    let fields: Vec<&str> = body.split(',').map(str::trim).collect();
    let [initial, num_transitions, num_states] = fields.as_slice() else {
        return Err(malformed());
    };

    Ok(Header {
        initial: initial.parse().map_err(|_| malformed())?,
        num_transitions: num_transitions.parse().map_err(|_| malformed())?,
        num_states: num_states.parse().map_err(|_| malformed())?,
    })
}

fn parse_transition(line: usize, text: &str) -> Result<(usize, String, usize), AldebaranError> {
    let malformed = || AldebaranError::MalformedTransition {
        line,
        text: text.to_string(),
    };

    let body = tuple_body(text).ok_or_else(malformed)?;
    // The label may itself contain commas, so split on the first and last one.
    let (from, rest) = body.split_once(',').ok_or_else(malformed)?;
    let (label, to) = rest.rsplit_once(',').ok_or_else(malformed)?;

    let from: usize = from.trim().parse().map_err(|_| malformed())?;
    let to: usize = to.trim().parse().map_err(|_| malformed())?;

    let label = label.trim();
    let label = match label.strip_prefix('"') {
        Some(quoted) => quoted.strip_suffix('"').ok_or_else(malformed)?,
        None => label,
    };
    if label.is_empty() {
        return Err(malformed());
    }

    Ok((from, label.to_string(), to))
}

impl Lts {
    /// Reads an LTS from an `.aut` file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mucalc_rs::lts::Lts;
    ///
    /// let lts = Lts::load("model.aut").unwrap();
    /// println!("{} states", lts.num_states());
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AldebaranError> {
        let content = fs::read_to_string(path)?;
        Self::from_aldebaran(&content)
    }

    /// Parses an LTS from Aldebaran text.
    pub fn from_aldebaran(content: &str) -> Result<Self, AldebaranError> {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(i, text)| (i + 1, text))
            .filter(|(_, text)| !text.trim().is_empty());

        let (line, text) = lines.next().ok_or(AldebaranError::MissingHeader)?;
        let header = parse_header(line, text)?;
        debug!(
            "from_aldebaran: initial = {}, transitions = {}, states = {}",
            header.initial, header.num_transitions, header.num_states
        );

        if header.initial >= header.num_states {
            return Err(AldebaranError::InitialOutOfRange {
                initial: header.initial,
                num_states: header.num_states,
            });
        }

        let mut builder = LtsBuilder::new(header.num_states).initial(header.initial);
        let mut found = 0;
        for (line, text) in lines {
            let (from, label, to) = parse_transition(line, text)?;
            for state in [from, to] {
                if state >= header.num_states {
                    return Err(AldebaranError::StateOutOfRange {
                        line,
                        state,
                        num_states: header.num_states,
                        text: text.to_string(),
                    });
                }
            }
            builder.add_transition(from, label, to);
            found += 1;
        }

        if found != header.num_transitions {
            return Err(AldebaranError::TransitionCount {
                declared: header.num_transitions,
                found,
            });
        }

        // All indices were validated above, so the builder cannot fail.
        builder.build().map_err(|_| AldebaranError::InitialOutOfRange {
            initial: header.initial,
            num_states: header.num_states,
        })
    }

    /// Renders the LTS in Aldebaran format.
    pub fn to_aldebaran(&self) -> String {
        let mut output = format!(
            "des ({}, {}, {})\n",
            self.initial().index(),
            self.num_transitions(),
            self.num_states()
        );
        for t in self.transitions() {
            output.push_str(&format!("({}, \"{}\", {})\n", t.from.index(), t.label, t.to.index()));
        }
        output
    }

    /// Writes the LTS to an `.aut` file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), AldebaranError> {
        fs::write(path, self.to_aldebaran())?;
        Ok(())
    }
}
