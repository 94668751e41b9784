//! Database errors

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Record not found
    #[error("record not found")]
    NotFound,
}

impl DbError {
    /// A unique constraint rejected the write
    pub fn is_unique_violation(&self) -> bool {
        self.kind() == Some(ErrorKind::UniqueViolation)
    }

    /// A foreign key constraint rejected the write
    pub fn is_foreign_key_violation(&self) -> bool {
        self.kind() == Some(ErrorKind::ForeignKeyViolation)
    }

    fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Sqlx(sqlx::Error::Database(e)) => Some(e.kind()),
            _ => None,
        }
    }
}

/// Result alias for repository calls
pub type DbResult<T> = Result<T, DbError>;
