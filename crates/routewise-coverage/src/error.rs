//! Coverage errors

use thiserror::Error;

/// Coverage errors
#[derive(Error, Debug)]
pub enum CoverageError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] routewise_db::DbError),
}
