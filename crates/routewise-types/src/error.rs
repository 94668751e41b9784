//! Common error types

use thiserror::Error;

/// Error parsing a status or role string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    /// What was being parsed (e.g. "payment status")
    pub kind: &'static str,
    /// The rejected input
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Error validating a zip code
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZipCodeError {
    /// Nothing left after trimming
    #[error("zip code is empty")]
    Empty,

    /// Contains characters outside `[A-Za-z0-9 -]`
    #[error("zip code contains invalid characters: {0}")]
    InvalidCharacters(String),
}
