//! Repository traits
//!
//! Define async repository interfaces for database operations.
//!
//! State-changing methods that return `bool` report whether a row actually
//! changed. Callers use that to keep retried work from repeating side effects.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use routewise_types::{
    CustomerId, CustomerStatus, PaymentId, PaymentRetryId, PaymentRetryStatus, PaymentStatus,
    SubscriptionId, SubscriptionStatus,
};

use crate::error::DbResult;
use crate::models::*;

/// Customer repository trait
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Find a customer by ID
    async fn find_by_id(&self, id: CustomerId) -> DbResult<Option<CustomerRow>>;

    /// List every customer in the given status
    async fn list_by_status(&self, status: CustomerStatus) -> DbResult<Vec<CustomerRow>>;

    /// Set the customer status; returns false if it already had that status
    async fn update_status(&self, id: CustomerId, status: CustomerStatus) -> DbResult<bool>;

    /// Add service credits and clear the depletion stamp
    async fn add_service_credits(&self, id: CustomerId, credits: i32) -> DbResult<()>;

    /// Zero service credits and stamp `credits_depleted_at`
    ///
    /// Returns false when the customer was already depleted.
    async fn deplete_service_credits(&self, id: CustomerId, at: DateTime<Utc>) -> DbResult<bool>;
}

/// Subscription repository trait
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Find a subscription by ID
    async fn find_by_id(&self, id: SubscriptionId) -> DbResult<Option<SubscriptionRow>>;

    /// Set the subscription status; returns false if it already had that status
    ///
    /// Moving away from CANCELLED clears `cancelled_at`. To cancel, use
    /// [`SubscriptionRepository::cancel`] so the timestamp is recorded.
    async fn update_status(&self, id: SubscriptionId, status: SubscriptionStatus)
        -> DbResult<bool>;

    /// Cancel a subscription; returns false if it was already cancelled
    async fn cancel(&self, id: SubscriptionId, at: DateTime<Utc>) -> DbResult<bool>;
}

/// Payment repository trait
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Find a payment by ID
    async fn find_by_id(&self, id: PaymentId) -> DbResult<Option<PaymentRow>>;

    /// Payments in a status, newest first
    async fn find_by_status(&self, status: PaymentStatus, limit: i64) -> DbResult<Vec<PaymentRow>>;

    /// Mark a payment FAILED with the given retry count and reason
    async fn mark_failed(
        &self,
        id: PaymentId,
        retry_count: i32,
        reason: Option<&str>,
    ) -> DbResult<()>;

    /// Mark a payment PAID
    async fn mark_paid(&self, id: PaymentId, paid_at: DateTime<Utc>) -> DbResult<()>;

    /// Set the retry counter; returns false if it already had that value
    async fn set_retry_count(&self, id: PaymentId, retry_count: i32) -> DbResult<bool>;
}

/// Payment retry repository trait
#[async_trait]
pub trait PaymentRetryRepository: Send + Sync {
    /// Schedule a new retry
    async fn create(&self, retry: CreatePaymentRetry) -> DbResult<PaymentRetryRow>;

    /// SCHEDULED retries for one payment, earliest first
    async fn find_scheduled_by_payment(&self, payment_id: PaymentId)
        -> DbResult<Vec<PaymentRetryRow>>;

    /// SCHEDULED retries due at or before `now`, earliest first
    async fn find_due(&self, now: DateTime<Utc>, limit: i64) -> DbResult<Vec<PaymentRetryRow>>;

    /// Move a SCHEDULED retry to `status`; returns false if it was no longer scheduled
    async fn finish(&self, id: PaymentRetryId, status: PaymentRetryStatus) -> DbResult<bool>;

    /// Move every SCHEDULED retry of a payment to `status`, returning how many changed
    async fn finish_all_for_payment(
        &self,
        payment_id: PaymentId,
        status: PaymentRetryStatus,
    ) -> DbResult<u64>;

    /// Put a COMPLETED retry back on the schedule; returns false if it was not COMPLETED
    async fn reschedule(&self, id: PaymentRetryId) -> DbResult<bool>;
}

/// Create payment retry input
#[derive(Debug, Clone)]
pub struct CreatePaymentRetry {
    pub id: PaymentRetryId,
    pub payment_id: PaymentId,
    pub scheduled_for: DateTime<Utc>,
    pub attempt: i32,
}

/// Coverage area repository trait
#[async_trait]
pub trait CoverageAreaRepository: Send + Sync {
    /// All coverage areas flagged active
    async fn list_active(&self) -> DbResult<Vec<CoverageAreaRow>>;
}

/// Processed event ledger used for idempotent webhook handling
#[async_trait]
pub trait ProcessedEventRepository: Send + Sync {
    /// Record `key` as processed; returns false if it was already claimed
    async fn claim(&self, key: &str, at: DateTime<Utc>) -> DbResult<bool>;

    /// Forget a claim so the work can be retried
    async fn release(&self, key: &str) -> DbResult<()>;
}

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub customers: Arc<dyn CustomerRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub retries: Arc<dyn PaymentRetryRepository>,
    pub coverage: Arc<dyn CoverageAreaRepository>,
    pub events: Arc<dyn ProcessedEventRepository>,
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}
