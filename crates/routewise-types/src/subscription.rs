//! Subscription types

use serde::{Deserialize, Serialize};

/// Subscription status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    /// In good standing
    Active,
    /// A payment failed and a retry is pending
    PastDue,
    /// Ended, either by the customer or by retry exhaustion
    Cancelled,
}

text_enum!(SubscriptionStatus, "subscription status", {
    Active => "ACTIVE",
    PastDue => "PAST_DUE",
    Cancelled => "CANCELLED",
});
