//! Crate-level error type.

use std::io;

use thiserror::Error;

use crate::aldebaran::AldebaranError;
use crate::parser::ParseError;

/// Any error raised while loading a model or a formula.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("formula: {0}")]
    Parse(#[from] ParseError),

    #[error("aldebaran: {0}")]
    Aldebaran(#[from] AldebaranError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
