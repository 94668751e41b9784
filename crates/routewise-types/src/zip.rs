//! Zip code normalization
//!
//! Coverage matching compares customer zips against employee coverage zips
//! with plain set arithmetic, so both sides go through the same normalization.

use serde::{Deserialize, Serialize};

use crate::ZipCodeError;

/// A normalized postal code (trimmed, uppercased, inner whitespace collapsed)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ZipCode(String);

impl ZipCode {
    /// Longest accepted input after trimming
    pub const MAX_LEN: usize = 10;

    /// Normalize and validate a raw zip code
    pub fn parse(raw: &str) -> Result<Self, ZipCodeError> {
        let normalized = raw
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();

        if normalized.is_empty() {
            return Err(ZipCodeError::Empty);
        }

        if normalized.len() > Self::MAX_LEN
            || !normalized
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-')
        {
            return Err(ZipCodeError::InvalidCharacters(raw.to_string()));
        }

        Ok(Self(normalized))
    }

    /// Borrow the normalized form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ZipCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ZipCode {
    type Error = ZipCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ZipCode> for String {
    fn from(zip: ZipCode) -> Self {
        zip.0
    }
}
