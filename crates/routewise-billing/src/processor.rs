//! Payment processor abstraction

use async_trait::async_trait;
use routewise_types::PaymentId;

use crate::BillingError;

/// A request to charge a customer's saved payment method
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub payment_id: PaymentId,
    pub processor_customer_id: String,
    pub amount_cents: i64,
    pub currency: String,
    /// Sent to the processor so a repeated request cannot charge twice
    pub idempotency_key: String,
}

/// What the processor did with a charge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeOutcome {
    /// Money collected
    Succeeded { charge_id: String },
    /// Card or bank refused the charge
    Declined { charge_id: String, reason: String },
    /// Accepted but not settled; the outcome arrives later as a webhook
    Pending { charge_id: String },
}

/// Payment processor trait
///
/// Abstracts payment processing to allow different providers (Stripe, etc.)
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Charge the customer off-session
    ///
    /// Declines are an `Ok` outcome; `Err` means the processor could not be
    /// reached or answered unexpectedly, and the charge may be retried.
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, BillingError>;
}
