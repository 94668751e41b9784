//! In-memory repositories for tests
//!
//! [`MemoryStore`] implements every repository trait over `DashMap`s with the
//! same conditional-update semantics as the Postgres implementations.
//! Enabled by the `test-util` feature.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use routewise_types::{
    CustomerId, CustomerStatus, PaymentId, PaymentRetryId, PaymentRetryStatus, PaymentStatus,
    SubscriptionId, SubscriptionStatus,
};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::*;
use crate::repo::*;

/// In-memory backing store for all repositories
#[derive(Default)]
pub struct MemoryStore {
    customers: DashMap<Uuid, CustomerRow>,
    subscriptions: DashMap<Uuid, SubscriptionRow>,
    payments: DashMap<Uuid, PaymentRow>,
    retries: DashMap<Uuid, PaymentRetryRow>,
    coverage: DashMap<Uuid, CoverageAreaRow>,
    events: DashMap<String, DateTime<Utc>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Bundle this store as [`Repositories`]
    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            customers: self.clone(),
            subscriptions: self.clone(),
            payments: self.clone(),
            retries: self.clone(),
            coverage: self.clone(),
            events: self.clone(),
        }
    }

    /// Make every payment and retry write fail with a database error
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writes(&self) -> DbResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    pub fn insert_customer(&self, row: CustomerRow) {
        self.customers.insert(row.id, row);
    }

    pub fn insert_subscription(&self, row: SubscriptionRow) {
        self.subscriptions.insert(row.id, row);
    }

    pub fn insert_payment(&self, row: PaymentRow) {
        self.payments.insert(row.id, row);
    }

    pub fn insert_retry(&self, row: PaymentRetryRow) {
        self.retries.insert(row.id, row);
    }

    pub fn insert_coverage_area(&self, row: CoverageAreaRow) {
        self.coverage.insert(row.id, row);
    }

    pub fn customer(&self, id: CustomerId) -> Option<CustomerRow> {
        self.customers.get(&id.0).map(|r| r.value().clone())
    }

    pub fn subscription(&self, id: SubscriptionId) -> Option<SubscriptionRow> {
        self.subscriptions.get(&id.0).map(|r| r.value().clone())
    }

    pub fn payment(&self, id: PaymentId) -> Option<PaymentRow> {
        self.payments.get(&id.0).map(|r| r.value().clone())
    }

    /// Every retry row for a payment, ordered by `attempt`
    pub fn retries_for(&self, payment_id: PaymentId) -> Vec<PaymentRetryRow> {
        let mut rows: Vec<_> = self
            .retries
            .iter()
            .filter(|r| r.payment_id == payment_id.0)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by_key(|r| (r.attempt, r.created_at));
        rows
    }

    /// Number of claimed idempotency keys
    pub fn processed_event_count(&self) -> usize {
        self.events.len()
    }

    fn scheduled_for_payment(&self, payment_id: PaymentId) -> Vec<Uuid> {
        self.retries
            .iter()
            .filter(|r| r.payment_id == payment_id.0 && r.status == PaymentRetryStatus::Scheduled)
            .map(|r| r.id)
            .collect()
    }
}

/// Customer fixture with sensible defaults
pub fn customer(name: &str, zip_code: Option<&str>) -> CustomerRow {
    CustomerRow {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        zip_code: zip_code.map(str::to_string),
        status: CustomerStatus::Active,
        service_credits: 4,
        credits_depleted_at: None,
        processor_customer_id: Some(format!("cus_{}", Uuid::new_v4().simple())),
        created_at: Utc::now(),
    }
}

/// Active subscription fixture
pub fn subscription(customer_id: Uuid) -> SubscriptionRow {
    SubscriptionRow {
        id: Uuid::new_v4(),
        customer_id,
        status: SubscriptionStatus::Active,
        cancelled_at: None,
        created_at: Utc::now(),
    }
}

/// Pending payment fixture
pub fn payment(customer_id: Uuid, subscription_id: Option<Uuid>, amount_cents: i64) -> PaymentRow {
    PaymentRow {
        id: Uuid::new_v4(),
        customer_id,
        subscription_id,
        amount_cents,
        currency: "usd".to_string(),
        status: PaymentStatus::Pending,
        retry_count: 0,
        date: Utc::now(),
        failure_reason: None,
        processor_payment_id: None,
        paid_at: None,
    }
}

/// Active coverage area fixture
pub fn coverage_area(zip_code: &str) -> CoverageAreaRow {
    CoverageAreaRow {
        id: Uuid::new_v4(),
        employee_id: Uuid::new_v4(),
        zip_code: zip_code.to_string(),
        active: true,
    }
}

#[async_trait]
impl CustomerRepository for MemoryStore {
    async fn find_by_id(&self, id: CustomerId) -> DbResult<Option<CustomerRow>> {
        Ok(self.customer(id))
    }

    async fn list_by_status(&self, status: CustomerStatus) -> DbResult<Vec<CustomerRow>> {
        let mut rows: Vec<_> = self
            .customers
            .iter()
            .filter(|c| c.status == status)
            .map(|c| c.value().clone())
            .collect();
        rows.sort_by_key(|c| c.created_at);
        Ok(rows)
    }

    async fn update_status(&self, id: CustomerId, status: CustomerStatus) -> DbResult<bool> {
        Ok(match self.customers.get_mut(&id.0) {
            Some(mut c) if c.status != status => {
                c.status = status;
                true
            }
            _ => false,
        })
    }

    async fn add_service_credits(&self, id: CustomerId, credits: i32) -> DbResult<()> {
        if let Some(mut c) = self.customers.get_mut(&id.0) {
            c.service_credits += credits;
            c.credits_depleted_at = None;
        }
        Ok(())
    }

    async fn deplete_service_credits(&self, id: CustomerId, at: DateTime<Utc>) -> DbResult<bool> {
        Ok(match self.customers.get_mut(&id.0) {
            Some(mut c) if c.service_credits != 0 || c.credits_depleted_at.is_none() => {
                c.service_credits = 0;
                c.credits_depleted_at.get_or_insert(at);
                true
            }
            _ => false,
        })
    }
}

#[async_trait]
impl SubscriptionRepository for MemoryStore {
    async fn find_by_id(&self, id: SubscriptionId) -> DbResult<Option<SubscriptionRow>> {
        Ok(self.subscription(id))
    }

    async fn update_status(
        &self,
        id: SubscriptionId,
        status: SubscriptionStatus,
    ) -> DbResult<bool> {
        Ok(match self.subscriptions.get_mut(&id.0) {
            Some(mut s) if s.status != status => {
                if status != SubscriptionStatus::Cancelled {
                    s.cancelled_at = None;
                }
                s.status = status;
                true
            }
            _ => false,
        })
    }

    async fn cancel(&self, id: SubscriptionId, at: DateTime<Utc>) -> DbResult<bool> {
        Ok(match self.subscriptions.get_mut(&id.0) {
            Some(mut s) if s.status != SubscriptionStatus::Cancelled => {
                s.status = SubscriptionStatus::Cancelled;
                s.cancelled_at = Some(at);
                true
            }
            _ => false,
        })
    }
}

#[async_trait]
impl PaymentRepository for MemoryStore {
    async fn find_by_id(&self, id: PaymentId) -> DbResult<Option<PaymentRow>> {
        Ok(self.payment(id))
    }

    async fn find_by_status(&self, status: PaymentStatus, limit: i64) -> DbResult<Vec<PaymentRow>> {
        let mut rows: Vec<_> = self
            .payments
            .iter()
            .filter(|p| p.status == status)
            .map(|p| p.value().clone())
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn mark_failed(
        &self,
        id: PaymentId,
        retry_count: i32,
        reason: Option<&str>,
    ) -> DbResult<()> {
        self.check_writes()?;
        if let Some(mut p) = self.payments.get_mut(&id.0) {
            p.status = PaymentStatus::Failed;
            p.retry_count = retry_count;
            if let Some(reason) = reason {
                p.failure_reason = Some(reason.to_string());
            }
        }
        Ok(())
    }

    async fn mark_paid(&self, id: PaymentId, paid_at: DateTime<Utc>) -> DbResult<()> {
        self.check_writes()?;
        if let Some(mut p) = self.payments.get_mut(&id.0) {
            p.status = PaymentStatus::Paid;
            p.paid_at = Some(paid_at);
        }
        Ok(())
    }

    async fn set_retry_count(&self, id: PaymentId, retry_count: i32) -> DbResult<bool> {
        self.check_writes()?;
        Ok(match self.payments.get_mut(&id.0) {
            Some(mut p) if p.retry_count != retry_count => {
                p.retry_count = retry_count;
                true
            }
            _ => false,
        })
    }
}

#[async_trait]
impl PaymentRetryRepository for MemoryStore {
    async fn create(&self, retry: CreatePaymentRetry) -> DbResult<PaymentRetryRow> {
        self.check_writes()?;
        let row = PaymentRetryRow {
            id: retry.id.0,
            payment_id: retry.payment_id.0,
            status: PaymentRetryStatus::Scheduled,
            scheduled_for: retry.scheduled_for,
            attempt: retry.attempt,
            created_at: Utc::now(),
        };
        self.retries.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_scheduled_by_payment(
        &self,
        payment_id: PaymentId,
    ) -> DbResult<Vec<PaymentRetryRow>> {
        let mut rows: Vec<_> = self
            .retries_for(payment_id)
            .into_iter()
            .filter(|r| r.status == PaymentRetryStatus::Scheduled)
            .collect();
        rows.sort_by_key(|r| r.scheduled_for);
        Ok(rows)
    }

    async fn find_due(&self, now: DateTime<Utc>, limit: i64) -> DbResult<Vec<PaymentRetryRow>> {
        let mut rows: Vec<_> = self
            .retries
            .iter()
            .filter(|r| r.status == PaymentRetryStatus::Scheduled && r.scheduled_for <= now)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by_key(|r| r.scheduled_for);
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn finish(&self, id: PaymentRetryId, status: PaymentRetryStatus) -> DbResult<bool> {
        self.check_writes()?;
        Ok(match self.retries.get_mut(&id.0) {
            Some(mut r) if r.status == PaymentRetryStatus::Scheduled => {
                r.status = status;
                true
            }
            _ => false,
        })
    }

    async fn finish_all_for_payment(
        &self,
        payment_id: PaymentId,
        status: PaymentRetryStatus,
    ) -> DbResult<u64> {
        self.check_writes()?;
        let mut changed = 0;
        for id in self.scheduled_for_payment(payment_id) {
            if let Some(mut r) = self.retries.get_mut(&id) {
                if r.status == PaymentRetryStatus::Scheduled {
                    r.status = status;
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    async fn reschedule(&self, id: PaymentRetryId) -> DbResult<bool> {
        self.check_writes()?;
        Ok(match self.retries.get_mut(&id.0) {
            Some(mut r) if r.status == PaymentRetryStatus::Completed => {
                r.status = PaymentRetryStatus::Scheduled;
                true
            }
            _ => false,
        })
    }
}

#[async_trait]
impl CoverageAreaRepository for MemoryStore {
    async fn list_active(&self) -> DbResult<Vec<CoverageAreaRow>> {
        Ok(self
            .coverage
            .iter()
            .filter(|a| a.active)
            .map(|a| a.value().clone())
            .collect())
    }
}

#[async_trait]
impl ProcessedEventRepository for MemoryStore {
    async fn claim(&self, key: &str, at: DateTime<Utc>) -> DbResult<bool> {
        Ok(match self.events.entry(key.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(at);
                true
            }
        })
    }

    async fn release(&self, key: &str) -> DbResult<()> {
        self.events.remove(key);
        Ok(())
    }
}
