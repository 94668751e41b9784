//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.
//! Status columns are stored as their wire strings and decoded into the
//! typed enums from `routewise-types`.

use chrono::{DateTime, Utc};
use routewise_types::{
    CustomerId, CustomerStatus, EmployeeId, PaymentId, PaymentRetryId, PaymentRetryStatus,
    PaymentStatus, SubscriptionId, SubscriptionStatus,
};
use sqlx::FromRow;
use uuid::Uuid;

/// Customer row from the database
#[derive(Debug, Clone, FromRow)]
pub struct CustomerRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Raw zip as entered; normalized by consumers
    pub zip_code: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: CustomerStatus,
    pub service_credits: i32,
    pub credits_depleted_at: Option<DateTime<Utc>>,
    pub processor_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Subscription row from the database
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    #[sqlx(try_from = "String")]
    pub status: SubscriptionStatus,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Payment row from the database
#[derive(Debug, Clone, FromRow)]
pub struct PaymentRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub subscription_id: Option<Uuid>,
    pub amount_cents: i64,
    pub currency: String,
    #[sqlx(try_from = "String")]
    pub status: PaymentStatus,
    pub retry_count: i32,
    pub date: DateTime<Utc>,
    pub failure_reason: Option<String>,
    pub processor_payment_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// Payment retry row from the database
#[derive(Debug, Clone, FromRow)]
pub struct PaymentRetryRow {
    pub id: Uuid,
    pub payment_id: Uuid,
    #[sqlx(try_from = "String")]
    pub status: PaymentRetryStatus,
    pub scheduled_for: DateTime<Utc>,
    pub attempt: i32,
    pub created_at: DateTime<Utc>,
}

/// Coverage area row from the database
#[derive(Debug, Clone, FromRow)]
pub struct CoverageAreaRow {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub zip_code: String,
    pub active: bool,
}

impl CustomerRow {
    /// Convert to domain CustomerId
    pub fn customer_id(&self) -> CustomerId {
        CustomerId(self.id)
    }
}

impl SubscriptionRow {
    /// Convert to domain SubscriptionId
    pub fn subscription_id(&self) -> SubscriptionId {
        SubscriptionId(self.id)
    }

    /// Convert to domain CustomerId
    pub fn customer_id(&self) -> CustomerId {
        CustomerId(self.customer_id)
    }
}

impl PaymentRow {
    /// Convert to domain PaymentId
    pub fn payment_id(&self) -> PaymentId {
        PaymentId(self.id)
    }

    /// Convert to domain CustomerId
    pub fn customer_id(&self) -> CustomerId {
        CustomerId(self.customer_id)
    }

    /// Convert to domain SubscriptionId, if the payment belongs to one
    pub fn subscription_id(&self) -> Option<SubscriptionId> {
        self.subscription_id.map(SubscriptionId)
    }
}

impl PaymentRetryRow {
    /// Convert to domain PaymentRetryId
    pub fn retry_id(&self) -> PaymentRetryId {
        PaymentRetryId(self.id)
    }

    /// Convert to domain PaymentId
    pub fn payment_id(&self) -> PaymentId {
        PaymentId(self.payment_id)
    }
}

impl CoverageAreaRow {
    /// Convert to domain EmployeeId
    pub fn employee_id(&self) -> EmployeeId {
        EmployeeId(self.employee_id)
    }
}
