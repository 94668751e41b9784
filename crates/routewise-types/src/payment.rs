//! Payment and payment retry types

use serde::{Deserialize, Serialize};

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Created, not yet settled by the processor
    Pending,
    /// Settled
    Paid,
    /// Declined at least once
    Failed,
    /// Voided before settlement
    Cancelled,
}

text_enum!(PaymentStatus, "payment status", {
    Pending => "PENDING",
    Paid => "PAID",
    Failed => "FAILED",
    Cancelled => "CANCELLED",
});

impl PaymentStatus {
    /// Whether a failure event may still move this payment
    pub const fn accepts_failure(&self) -> bool {
        matches!(self, Self::Pending | Self::Failed)
    }
}

/// Payment retry status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentRetryStatus {
    /// Waiting for its `scheduled_for` time
    Scheduled,
    /// Stopped by exhaustion or an admin
    Cancelled,
    /// Attempted, or made moot by a successful payment
    Completed,
}

text_enum!(PaymentRetryStatus, "payment retry status", {
    Scheduled => "SCHEDULED",
    Cancelled => "CANCELLED",
    Completed => "COMPLETED",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status_parse() {
        assert_eq!("FAILED".parse::<PaymentStatus>().unwrap(), PaymentStatus::Failed);
        assert!("failed".parse::<PaymentStatus>().is_err());
        assert_eq!(PaymentStatus::Paid.to_string(), "PAID");
    }

    #[test]
    fn test_accepts_failure() {
        assert!(PaymentStatus::Pending.accepts_failure());
        assert!(PaymentStatus::Failed.accepts_failure());
        assert!(!PaymentStatus::Paid.accepts_failure());
        assert!(!PaymentStatus::Cancelled.accepts_failure());
    }

    #[test]
    fn test_retry_status_try_from() {
        let status = PaymentRetryStatus::try_from("SCHEDULED".to_string()).unwrap();
        assert_eq!(status, PaymentRetryStatus::Scheduled);
        assert!(PaymentRetryStatus::try_from("LATER".to_string()).is_err());
    }
}
