//! Customer types

use serde::{Deserialize, Serialize};

/// Customer account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerStatus {
    /// Receives scheduled service
    Active,
    /// Temporarily on hold at the customer's request
    Paused,
    /// Left voluntarily
    Cancelled,
    /// Blocked from dispatch, usually after payment retries ran out
    DoNotService,
}

text_enum!(CustomerStatus, "customer status", {
    Active => "ACTIVE",
    Paused => "PAUSED",
    Cancelled => "CANCELLED",
    DoNotService => "DO_NOT_SERVICE",
});

impl CustomerStatus {
    /// Whether field staff should be dispatched to this customer
    pub const fn is_serviceable(&self) -> bool {
        matches!(self, Self::Active)
    }
}
