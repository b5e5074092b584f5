//! Recursive-descent parser for mu-calculus formulas.
//!
//! # Grammar
//!
//! ```text
//! f, g ::= true | false | X | (f && g) | (f || g) | !f
//!        | <a>f | [a]f | mu X.f | nu X.f
//! ```
//!
//! `X` is a single uppercase ASCII letter, `a` is an action label (the label
//! `true` matches every action). `%` starts a comment running to the end of
//! the line.
//!
//! # Precedence
//!
//! Each call of [`Parser::formula`] carries a priority ceiling. The infix
//! operators `&&` and `||` are only absorbed when [`Priority::Junction`] is
//! admissible under the ceiling; otherwise the call returns and leaves the
//! operator to its caller. Prefix operators parse their operand with their own
//! priority as the new ceiling:
//!
//! - `mu`, `nu` use [`Priority::Fixpoint`] and `<a>`, `[a]` use
//!   [`Priority::Modal`]. Both admit junctions, so the operand extends up to
//!   the closing parenthesis or the end of input: `<a>[b]X` is `<a>([b]X)` and
//!   `<a>X || Y` is `<a>(X || Y)`. Write `(<a>X) || Y` to stop the operand early.
//! - `&&`, `||` parse their right operand under [`Priority::Junction`], so
//!   `f && g || h` is `f && (g || h)`.
//! - `!` uses [`Priority::Negation`], under which no junction is admissible:
//!   `!f && g` is `(!f) && g`.
//!
//! # Binder bookkeeping
//!
//! Every binder receives the next free [`BinderId`] in order of encounter.
//! While its body is parsed, the binder sits on a stack of open binders: any
//! binder or variable occurrence parsed in the meantime is recorded on every
//! binder of the stack (see [`Binder::descendants`] and [`Binder::occurrences`]).

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use thiserror::Error;

use crate::error;
use crate::formula::{Binder, Fixpoint, FixpointKind, Formula, ParsedFormula, Variable};
use crate::types::{BinderId, Label};

/// Location of a parse error: byte offset plus 1-based line and column.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    fn locate(src: &str, offset: usize) -> Self {
        let before = &src[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Position { offset, line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Formula syntax errors. None of them is recovered from.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{position}: unexpected `{found}`, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        position: Position,
    },

    #[error("{position}: unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: &'static str, position: Position },

    #[error("{position}: binder `{name}` is already bound by an enclosing fixed point")]
    DuplicateBinder { name: char, position: Position },

    #[error("{position}: variable `{name}` is not bound by any enclosing fixed point")]
    UnboundVariable { name: char, position: Position },

    #[error("{position}: unterminated label `{open}{text}`")]
    UnterminatedLabel {
        open: char,
        text: String,
        position: Position,
    },

    #[error("{position}: invalid action label `{text}`")]
    InvalidLabel { text: String, position: Position },

    #[error("{position}: unexpected trailing input `{rest}`")]
    TrailingInput { rest: String, position: Position },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEnd { position, .. }
            | ParseError::DuplicateBinder { position, .. }
            | ParseError::UnboundVariable { position, .. }
            | ParseError::UnterminatedLabel { position, .. }
            | ParseError::InvalidLabel { position, .. }
            | ParseError::TrailingInput { position, .. } => *position,
        }
    }
}

/// How far a [`Parser::formula`] call may extend to the right.
///
/// Ordered from the tightest ceiling to the most open one.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Priority {
    Negation,
    Junction,
    Modal,
    Fixpoint,
    Max,
}

impl Priority {
    /// Returns true if an operator of priority `self` may be absorbed under `ceiling`.
    fn admissible_under(self, ceiling: Priority) -> bool {
        self <= ceiling
    }
}

/// Parses a formula.
///
/// ```
/// use mucalc_rs::parser::parse;
///
/// let f = parse("nu X.((<a>true) && [b]X)").unwrap();
/// assert_eq!(f.num_binders(), 1);
/// assert_eq!(f.to_string(), "nu X.((<a>true) && [b]X)");
/// ```
pub fn parse(src: &str) -> Result<ParsedFormula, ParseError> {
    let mut parser = Parser::new(src);
    let root = parser.formula(Priority::Max)?;
    parser.skip_trivia();
    if !parser.at_end() {
        return Err(ParseError::TrailingInput {
            rest: parser.rest().trim_end().to_string(),
            position: parser.position(),
        });
    }
    debug!("parse: {} binders, {} nodes", parser.binders.len(), root.size());
    Ok(ParsedFormula::new(root, parser.binders))
}

impl FromStr for ParsedFormula {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl ParsedFormula {
    /// Reads and parses a formula file.
    pub fn load<P: AsRef<Path>>(path: P) -> error::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(parse(&content)?)
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    binders: Vec<Binder>,
    /// Binders whose body is currently being parsed, innermost last.
    open: Vec<BinderId>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            binders: Vec::new(),
            open: Vec::new(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn position(&self) -> Position {
        Position::locate(self.src, self.pos)
    }

    fn position_at(&self, offset: usize) -> Position {
        Position::locate(self.src, offset)
    }

    /// Skips whitespace and `%` comments.
    fn skip_trivia(&mut self) {
        loop {
            let trimmed = self.rest().trim_start();
            self.pos = self.src.len() - trimmed.len();
            if trimmed.starts_with('%') {
                let len = trimmed.find('\n').unwrap_or(trimmed.len());
                self.pos += len;
            } else {
                break;
            }
        }
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.peek() {
            Some(c) => ParseError::UnexpectedToken {
                found: c.to_string(),
                expected,
                position: self.position(),
            },
            None => ParseError::UnexpectedEnd {
                expected,
                position: self.position(),
            },
        }
    }

    fn expect(&mut self, c: char, expected: &'static str) -> Result<(), ParseError> {
        self.skip_trivia();
        if self.peek() == Some(c) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Parses a formula, absorbing infix operators admissible under `ceiling`.
    fn formula(&mut self, ceiling: Priority) -> Result<Formula, ParseError> {
        let mut lhs = self.prefix()?;
        loop {
            self.skip_trivia();
            let rest = self.rest();
            let is_and = if rest.starts_with("&&") {
                true
            } else if rest.starts_with("||") {
                false
            } else {
                break;
            };
            if !Priority::Junction.admissible_under(ceiling) {
                break;
            }
            self.pos += 2;
            let rhs = self.formula(Priority::Junction)?;
            lhs = if is_and { lhs.and(rhs) } else { lhs.or(rhs) };
        }
        Ok(lhs)
    }

    fn prefix(&mut self) -> Result<Formula, ParseError> {
        self.skip_trivia();
        let Some(c) = self.peek() else {
            return Err(self.unexpected("a formula"));
        };
        match c {
            '(' => {
                self.bump();
                let inner = self.formula(Priority::Max)?;
                self.expect(')', "`)`, `&&` or `||`")?;
                Ok(inner)
            }
            '<' => {
                let label = self.label('<', '>')?;
                let operand = self.formula(Priority::Modal)?;
                Ok(Formula::Diamond(label, Box::new(operand)))
            }
            '[' => {
                let label = self.label('[', ']')?;
                let operand = self.formula(Priority::Modal)?;
                Ok(Formula::Box(label, Box::new(operand)))
            }
            '!' => {
                self.bump();
                let operand = self.formula(Priority::Negation)?;
                Ok(operand.not())
            }
            'A'..='Z' => self.variable(),
            'a'..='z' => {
                let start = self.pos;
                let word = self.word();
                match word {
                    "true" => Ok(Formula::True),
                    "false" => Ok(Formula::False),
                    "mu" => self.fixpoint(FixpointKind::Smallest),
                    "nu" => self.fixpoint(FixpointKind::Largest),
                    _ => Err(ParseError::UnexpectedToken {
                        found: word.to_string(),
                        expected: "a formula",
                        position: self.position_at(start),
                    }),
                }
            }
            _ => Err(self.unexpected("a formula")),
        }
    }

    /// Consumes a lowercase keyword-like word.
    fn word(&mut self) -> &'a str {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    /// Parses `<label>` or `[label]`, consuming both brackets.
    fn label(&mut self, open: char, close: char) -> Result<Label, ParseError> {
        let start = self.pos;
        self.bump();
        let rest = self.rest();
        let Some(end) = rest.find(close) else {
            return Err(ParseError::UnterminatedLabel {
                open,
                text: rest.lines().next().unwrap_or("").to_string(),
                position: self.position_at(start),
            });
        };
        let text = rest[..end].trim();
        let valid = !text.is_empty()
            && !text
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '[' | ']'));
        if !valid {
            return Err(ParseError::InvalidLabel {
                text: rest[..end].to_string(),
                position: self.position_at(start),
            });
        }
        self.pos += end + close.len_utf8();
        Ok(Label::new(text))
    }

    fn variable(&mut self) -> Result<Formula, ParseError> {
        let start = self.pos;
        let name = self.bump().ok_or_else(|| self.unexpected("a variable"))?;
        let binder = self
            .open
            .iter()
            .rev()
            .copied()
            .find(|&b| self.binders[b.slot()].name() == name)
            .ok_or(ParseError::UnboundVariable {
                name,
                position: self.position_at(start),
            })?;
        for &b in &self.open {
            self.binders[b.slot()].add_occurrence(binder);
        }
        Ok(Formula::Var(Variable { name, binder }))
    }

    /// Parses `X.body` after a `mu`/`nu` keyword.
    fn fixpoint(&mut self, kind: FixpointKind) -> Result<Formula, ParseError> {
        self.skip_trivia();
        let name_pos = self.pos;
        let name = match self.peek() {
            Some(c @ 'A'..='Z') => c,
            _ => return Err(self.unexpected("a binder name (`A`..`Z`)")),
        };
        self.bump();
        self.expect('.', "`.` after the binder name")?;

        if self.open.iter().any(|b| self.binders[b.slot()].name() == name) {
            return Err(ParseError::DuplicateBinder {
                name,
                position: self.position_at(name_pos),
            });
        }

        let id = BinderId::new(self.binders.len());
        for &b in &self.open {
            self.binders[b.slot()].add_descendant(id);
        }
        self.binders.push(Binder::new(name, kind, id));

        self.open.push(id);
        let body = self.formula(Priority::Fixpoint)?;
        self.open.pop();

        Ok(Formula::Fixpoint(Fixpoint {
            kind,
            name,
            binder: id,
            body: Box::new(body),
        }))
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn ids(v: &[BinderId]) -> Vec<usize> {
        v.iter().map(|b| b.slot()).collect()
    }

    #[test]
    fn test_constants() {
        assert_eq!(parse("true").unwrap().root(), &Formula::True);
        assert_eq!(parse("  false  ").unwrap().root(), &Formula::False);
    }

    #[test]
    fn test_modal_chain_is_right_nested() {
        let f = parse("mu X.<a>[b]X").unwrap();
        let Formula::Fixpoint(fp) = f.root() else {
            panic!("expected a fixpoint");
        };
        let Formula::Diamond(a, inner) = fp.body.as_ref() else {
            panic!("expected a diamond");
        };
        assert_eq!(a.as_str(), "a");
        let Formula::Box(b, x) = inner.as_ref() else {
            panic!("expected a box");
        };
        assert_eq!(b.as_str(), "b");
        assert!(matches!(x.as_ref(), Formula::Var(_)));
    }

    #[test]
    fn test_modal_absorbs_junction() {
        let f = parse("(<a>true && [b]false)").unwrap();
        let expected = Formula::diamond("a", Formula::True.and(Formula::boxed("b", Formula::False)));
        assert_eq!(f.root(), &expected);

        let f = parse("<a>false || true").unwrap();
        assert_eq!(f.root(), &Formula::diamond("a", Formula::False.or(Formula::True)));
    }

    #[test]
    fn test_parenthesized_modal_stops_early() {
        let f = parse("((<a>true) && [b]false)").unwrap();
        let expected = Formula::diamond("a", Formula::True).and(Formula::boxed("b", Formula::False));
        assert_eq!(f.root(), &expected);
    }

    #[test]
    fn test_junction_is_right_nested() {
        let f = parse("(true && false || true)").unwrap();
        let expected = Formula::True.and(Formula::False.or(Formula::True));
        assert_eq!(f.root(), &expected);
    }

    #[test]
    fn test_fixpoint_body_extends_to_paren() {
        let f = parse("(nu X.X && true)").unwrap();
        let Formula::Fixpoint(fp) = f.root() else {
            panic!("expected the binder to absorb the conjunction");
        };
        assert!(matches!(fp.body.as_ref(), Formula::And(..)));
    }

    #[test]
    fn test_negation() {
        let f = parse("!<a>true").unwrap();
        assert_eq!(f.root(), &Formula::diamond("a", Formula::True).not());
    }

    #[test]
    fn test_negation_does_not_absorb_junction() {
        let f = parse("!true && false").unwrap();
        assert_eq!(f.root(), &Formula::True.not().and(Formula::False));

        let f = parse("!<a>true && false").unwrap();
        assert_eq!(f.root(), &Formula::diamond("a", Formula::True.and(Formula::False)).not());
    }

    #[test]
    fn test_comments_and_newlines() {
        let src = "% infinitely often a\nnu X.\n  mu Y. % inner\n  ((<a>X) || <b>Y)\n";
        let f = parse(src).unwrap();
        assert_eq!(f.num_binders(), 2);
        assert_eq!(f.to_string(), "nu X.mu Y.((<a>X) || <b>Y)");
    }

    #[test]
    fn test_binder_metadata() {
        let f = parse("nu X.(([a] mu Y.([b]Y || X)) && nu Z.(<c>X || <b>Z))").unwrap();
        let [x, y, z] = f.binders() else {
            panic!("expected three binders");
        };

        assert_eq!((x.name(), x.kind()), ('X', FixpointKind::Largest));
        assert_eq!((y.name(), y.kind()), ('Y', FixpointKind::Smallest));
        assert_eq!((z.name(), z.kind()), ('Z', FixpointKind::Largest));

        assert_eq!(ids(x.descendants()), vec![1, 2]);
        assert!(y.descendants().is_empty());
        assert!(z.descendants().is_empty());

        assert_eq!(ids(x.occurrences()), vec![1, 0, 0, 2]);
        assert_eq!(ids(y.occurrences()), vec![1, 0]);
        assert_eq!(ids(z.occurrences()), vec![0, 2]);
    }

    #[test]
    fn test_sibling_binders_may_share_names() {
        let f = parse("((mu X.<a>X) && mu X.[a]X)").unwrap();
        assert_eq!(f.num_binders(), 2);
        assert_eq!(f.binder(BinderId::new(1)).name(), 'X');
    }

    #[test]
    fn test_variable_resolves_to_innermost_binder() {
        let f = parse("mu X.((<a>X) || mu Y.<b>X)").unwrap();
        assert_eq!(ids(f.binder(BinderId::new(1)).occurrences()), vec![0]);
    }

    #[test]
    fn test_wildcard_label() {
        let f = parse("<true>true").unwrap();
        let Formula::Diamond(label, _) = f.root() else {
            panic!("expected a diamond");
        };
        assert!(label.is_wildcard());
    }

    #[test]
    fn test_roundtrip() {
        let sources = [
            "true",
            "<a>[b]false",
            "nu X.(X && [a]false)",
            "((mu X.<a>X) || nu Y.[b]Y)",
            "<a>false || true",
            "nu X.(([a]mu Y.([b]Y || X)) && nu Z.(<c>X || <b>Z))",
            "mu W.nu X.mu Y.(((<c>true) && <a>W) || ((<b>X) || [a]Y))",
            "!((<a>mu X.<a>X) && !nu Y.[b]Y)",
            "<send_1>(mu X.X || true)",
        ];
        for src in sources {
            let f = parse(src).unwrap();
            let again = parse(&f.to_string()).unwrap();
            assert_eq!(f, again, "round-trip of `{}` via `{}`", src, f);
        }
    }

    #[test]
    fn test_error_duplicate_binder() {
        let err = parse("mu X.nu X.X").unwrap_err();
        assert_eq!(
            err,
            ParseError::DuplicateBinder {
                name: 'X',
                position: Position {
                    offset: 8,
                    line: 1,
                    column: 9
                }
            }
        );
    }

    #[test]
    fn test_error_unbound_variable() {
        let err = parse("mu X.(X || Y)").unwrap_err();
        assert!(matches!(err, ParseError::UnboundVariable { name: 'Y', .. }));
        assert_eq!(err.position().column, 12);
    }

    #[test]
    fn test_error_unterminated_label() {
        let err = parse("<abc true").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedLabel { open: '<', .. }));
        let err = parse("[a").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedLabel { open: '[', .. }));
    }

    #[test]
    fn test_error_invalid_label() {
        assert!(matches!(parse("<>true"), Err(ParseError::InvalidLabel { .. })));
        assert!(matches!(parse("[a b]true"), Err(ParseError::InvalidLabel { .. })));
    }

    #[test]
    fn test_error_malformed_binder_header() {
        let err = parse("mu x.true").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { ref found, .. } if found == "x"));
        let err = parse("nu X true").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { ref found, .. } if found == "t"));
    }

    #[test]
    fn test_error_unknown_word() {
        let err = parse("maybe").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { ref found, .. } if found == "maybe"));
    }

    #[test]
    fn test_error_unexpected_end() {
        assert!(matches!(parse(""), Err(ParseError::UnexpectedEnd { .. })));
        assert!(matches!(parse("(true &&"), Err(ParseError::UnexpectedEnd { .. })));
        assert!(matches!(parse("(true"), Err(ParseError::UnexpectedEnd { .. })));
    }

    #[test]
    fn test_error_trailing_input() {
        let err = parse("true )").unwrap_err();
        assert!(matches!(err, ParseError::TrailingInput { ref rest, .. } if rest == ")"));
    }

    #[test]
    fn test_error_position_on_later_line() {
        let err = parse("nu X.\n  (X && ?)").unwrap_err();
        let pos = err.position();
        assert_eq!((pos.line, pos.column), (2, 9));
    }
}
