// src/error.rs
//
// Crate-wide error type. Every failure is a deterministic function of the
// input, so nothing here is retried and no partial output survives an error.

use std::str::Utf8Error;

use crate::ledger::LedgerError;

/// Errors returned by the renderer, the ledger glue and the CLI.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A tag, comment or declaration was opened but never closed.
    #[error("malformed markup at byte {offset}: {reason}")]
    MalformedMarkup { offset: usize, reason: &'static str },

    /// A required attribute is absent or empty.
    #[error("<{tag}> is missing required attribute `{attribute}'")]
    MissingAttribute {
        tag: String,
        attribute: &'static str,
    },

    /// An attribute is present but its value cannot be used.
    #[error("<{tag}> has invalid {attribute}=\"{value}\"")]
    InvalidAttribute {
        tag: String,
        attribute: &'static str,
        value: String,
    },

    /// Input handed to the byte entry point is not a UTF-8 string.
    #[error("input is not a UTF-8 string")]
    InvalidInput(#[from] Utf8Error),

    /// A render option was rejected before scanning started.
    #[error("invalid option `{name}': {reason}")]
    InvalidOption {
        name: &'static str,
        reason: &'static str,
    },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
