//! Billing errors

use thiserror::Error;

/// Billing errors
#[derive(Error, Debug)]
pub enum BillingError {
    /// Payment not found
    #[error("payment not found")]
    PaymentNotFound,

    /// Operation not allowed for the payment's current state
    #[error("invalid payment state: {0}")]
    InvalidState(String),

    /// Payment processor could not be reached or returned an unexpected error
    #[error("processor error: {0}")]
    Processor(String),

    /// Webhook verification or parsing error
    #[error("webhook error: {0}")]
    Webhook(String),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] routewise_db::DbError),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl BillingError {
    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PaymentNotFound)
    }

    /// Transient failures that may succeed if the work is redone
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Processor(_) | Self::Internal(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(BillingError::Processor("timeout".into()).is_retryable());
        assert!(BillingError::Database(routewise_db::DbError::NotFound).is_retryable());
        assert!(!BillingError::PaymentNotFound.is_retryable());
        assert!(!BillingError::Webhook("bad signature".into()).is_retryable());
        assert!(!BillingError::InvalidState("paid".into()).is_retryable());
    }
}
