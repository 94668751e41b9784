//! Payment retry service
//!
//! Every state change here is a single-row conditional update, so running an
//! operation twice (a replayed webhook, two overlapping retry jobs) converges
//! on the same state. Emails are only sent for changes that actually happened.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use routewise_db::{CreatePaymentRetry, PaymentRetryRow, PaymentRow, Repositories};
use routewise_notify::{Notifier, Recipient};
use routewise_types::{
    CustomerId, CustomerStatus, PaymentId, PaymentRetryId, PaymentRetryStatus, PaymentStatus,
    SubscriptionId, SubscriptionStatus,
};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::config::RetryPolicy;
use crate::error::BillingError;
use crate::metrics;
use crate::processor::{ChargeOutcome, ChargeRequest, PaymentProcessor};
use crate::webhook::{PaymentEvent, PaymentEventKind};

/// Most retries charged in one job run
pub const RETRY_BATCH_SIZE: i64 = 100;

/// Largest page the failed-payment listing returns
pub const MAX_FAILED_PAGE: i64 = 200;

/// Result of recording a failed charge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FailureOutcome {
    /// Another retry was scheduled
    RetryScheduled {
        retry_count: i32,
        scheduled_for: DateTime<Utc>,
    },
    /// No retries left; the customer was cut off
    Exhausted {
        retries_cancelled: u64,
        cascaded: bool,
    },
    /// This charge was already recorded
    Duplicate,
    /// The payment is in a state that no longer takes failures
    Ignored { status: PaymentStatus },
}

/// Result of recording a successful charge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SuccessOutcome {
    /// Payment marked paid and credits granted
    Recorded {
        credits_granted: i32,
        customer_restored: bool,
    },
    /// The payment was already paid; nothing changed
    AlreadyPaid,
    /// This charge was already recorded
    Duplicate,
}

/// Result of an admin retry cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CancelRetriesOutcome {
    pub retries_cancelled: u64,
    pub cascaded: bool,
}

/// Counts from one run of the retry job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RetryRunSummary {
    /// Retries that were due
    pub due: usize,
    pub succeeded: usize,
    pub declined: usize,
    /// Accepted by the processor but not yet settled
    pub pending: usize,
    /// Left scheduled after a processor or database error
    pub errors: usize,
    /// Not charged (stale, taken by another run, or no processor configured)
    pub skipped: usize,
}

/// A failed payment as shown to admins
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedPayment {
    pub id: PaymentId,
    pub customer_id: CustomerId,
    pub subscription_id: Option<SubscriptionId>,
    pub amount_cents: i64,
    pub currency: String,
    pub retry_count: i32,
    pub failure_reason: Option<String>,
    pub date: DateTime<Utc>,
    /// When the next retry will run, if one is scheduled
    pub next_retry_at: Option<DateTime<Utc>>,
}

/// How a webhook event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookOutcome {
    Processed,
    Duplicate,
    Ignored,
    UnknownPayment,
}

impl WebhookOutcome {
    /// Metric label
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Duplicate => "duplicate",
            Self::Ignored => "ignored",
            Self::UnknownPayment => "unknown_payment",
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Cascade {
    subscription_cancelled: bool,
    customer_blocked: bool,
    credits_depleted: bool,
}

impl Cascade {
    fn changed(&self) -> bool {
        self.subscription_cancelled || self.customer_blocked || self.credits_depleted
    }
}

enum RetryAttempt {
    Succeeded,
    Declined,
    Pending,
    Skipped,
    Unreachable,
}

/// Tracks failed payments and drives their retries
#[derive(Clone)]
pub struct PaymentRetryService {
    repos: Repositories,
    notifier: Notifier,
    processor: Option<Arc<dyn PaymentProcessor>>,
    policy: RetryPolicy,
}

impl PaymentRetryService {
    /// Create a new service; retries are not charged until a processor is set
    pub fn new(repos: Repositories, notifier: Notifier, policy: RetryPolicy) -> Self {
        Self {
            repos,
            notifier,
            processor: None,
            policy,
        }
    }

    /// Charge due retries through `processor`
    pub fn with_processor(mut self, processor: Arc<dyn PaymentProcessor>) -> Self {
        self.processor = Some(processor);
        self
    }

    /// Active retry policy
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Record a failed charge for `payment_id`
    ///
    /// `idempotency_key` identifies the charge at the processor; a second
    /// failure with the same key is reported as [`FailureOutcome::Duplicate`].
    #[instrument(skip_all, fields(payment_id = %payment_id))]
    pub async fn record_failure(
        &self,
        payment_id: PaymentId,
        reason: Option<&str>,
        idempotency_key: Option<&str>,
    ) -> Result<FailureOutcome, BillingError> {
        let now = Utc::now();
        let claim_key = idempotency_key.map(|k| format!("charge:{k}"));

        if let Some(key) = &claim_key {
            if !self.repos.events.claim(key, now).await? {
                debug!(key = %key, "Charge failure already recorded");
                return Ok(FailureOutcome::Duplicate);
            }
        }

        let result = self.apply_failure(payment_id, reason, now).await;
        if let (Err(e), Some(key)) = (&result, &claim_key) {
            if e.is_retryable() {
                self.release(key).await;
            }
        }
        result
    }

    async fn apply_failure(
        &self,
        payment_id: PaymentId,
        reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<FailureOutcome, BillingError> {
        let payment = self
            .repos
            .payments
            .find_by_id(payment_id)
            .await?
            .ok_or(BillingError::PaymentNotFound)?;

        if !payment.status.accepts_failure() {
            info!(status = %payment.status, "Ignoring failure for settled payment");
            return Ok(FailureOutcome::Ignored {
                status: payment.status,
            });
        }

        let max_retries = i32::try_from(self.policy.max_retries).unwrap_or(i32::MAX);
        let cut_off = self.is_cut_off(&payment).await?;

        if payment.retry_count < max_retries && !cut_off {
            let retry_count = payment.retry_count + 1;
            let scheduled_for = now + self.policy.delay_for(payment.retry_count.max(0) as u32);

            self.repos
                .payments
                .mark_failed(payment_id, retry_count, reason)
                .await?;

            // At most one retry is pending per payment
            let superseded = self
                .repos
                .retries
                .finish_all_for_payment(payment_id, PaymentRetryStatus::Cancelled)
                .await?;

            self.repos
                .retries
                .create(CreatePaymentRetry {
                    id: PaymentRetryId::new(),
                    payment_id,
                    scheduled_for,
                    attempt: retry_count,
                })
                .await?;

            if let Some(subscription_id) = payment.subscription_id() {
                self.mark_past_due(subscription_id).await?;
            }

            metrics::record_failure(false);
            metrics::record_retry_scheduled(retry_count);
            info!(
                retry_count,
                max_retries,
                superseded,
                scheduled_for = %scheduled_for,
                "Payment failed, retry scheduled"
            );

            if let Some(customer) = self.recipient(payment.customer_id()).await {
                if let Err(e) = self
                    .notifier
                    .payment_failed(&customer, payment.amount_cents, &payment.currency, scheduled_for)
                    .await
                {
                    warn!(error = %e, "Failed to send payment failure notice");
                }
            }

            return Ok(FailureOutcome::RetryScheduled {
                retry_count,
                scheduled_for,
            });
        }

        self.repos
            .payments
            .mark_failed(payment_id, payment.retry_count, reason)
            .await?;

        let retries_cancelled = self
            .repos
            .retries
            .finish_all_for_payment(payment_id, PaymentRetryStatus::Cancelled)
            .await?;

        let cascade = self.cascade(&payment, now, "exhausted").await?;

        metrics::record_failure(true);
        warn!(
            retry_count = payment.retry_count,
            retries_cancelled,
            cut_off,
            cascaded = cascade.changed(),
            "Payment retries exhausted"
        );

        if cascade.changed() {
            self.notify_exhausted(&payment, true).await;
        }

        Ok(FailureOutcome::Exhausted {
            retries_cancelled,
            cascaded: cascade.changed(),
        })
    }

    /// Record a successful charge for `payment_id`
    ///
    /// Restores a customer who was cut off for non-payment.
    #[instrument(skip_all, fields(payment_id = %payment_id))]
    pub async fn record_success(
        &self,
        payment_id: PaymentId,
        idempotency_key: Option<&str>,
    ) -> Result<SuccessOutcome, BillingError> {
        let now = Utc::now();
        let claim_key = idempotency_key.map(|k| format!("charge:{k}"));

        if let Some(key) = &claim_key {
            if !self.repos.events.claim(key, now).await? {
                debug!(key = %key, "Charge success already recorded");
                return Ok(SuccessOutcome::Duplicate);
            }
        }

        let result = self.apply_success(payment_id, now).await;
        if let (Err(e), Some(key)) = (&result, &claim_key) {
            if e.is_retryable() {
                self.release(key).await;
            }
        }
        result
    }

    async fn apply_success(
        &self,
        payment_id: PaymentId,
        now: DateTime<Utc>,
    ) -> Result<SuccessOutcome, BillingError> {
        let payment = self
            .repos
            .payments
            .find_by_id(payment_id)
            .await?
            .ok_or(BillingError::PaymentNotFound)?;

        if payment.status == PaymentStatus::Paid {
            debug!("Payment already paid");
            return Ok(SuccessOutcome::AlreadyPaid);
        }

        self.repos.payments.mark_paid(payment_id, now).await?;

        let completed = self
            .repos
            .retries
            .finish_all_for_payment(payment_id, PaymentRetryStatus::Completed)
            .await?;

        if let Some(subscription_id) = payment.subscription_id() {
            self.repos
                .subscriptions
                .update_status(subscription_id, SubscriptionStatus::Active)
                .await?;
        }

        let customer_id = payment.customer_id();
        let credits_granted = self.policy.credits_per_payment;
        self.repos
            .customers
            .add_service_credits(customer_id, credits_granted)
            .await?;

        let customer_restored = match self.repos.customers.find_by_id(customer_id).await? {
            Some(c) if c.status == CustomerStatus::DoNotService => {
                self.repos
                    .customers
                    .update_status(customer_id, CustomerStatus::Active)
                    .await?
            }
            _ => false,
        };

        info!(
            retries_completed = completed,
            credits_granted,
            customer_restored,
            "Payment recorded as paid"
        );

        Ok(SuccessOutcome::Recorded {
            credits_granted,
            customer_restored,
        })
    }

    /// Cancel every scheduled retry and cut the customer off (admin action)
    ///
    /// Calling it again once everything is cancelled changes nothing and
    /// sends nothing.
    #[instrument(skip_all, fields(payment_id = %payment_id))]
    pub async fn cancel_retries(
        &self,
        payment_id: PaymentId,
    ) -> Result<CancelRetriesOutcome, BillingError> {
        let payment = self
            .repos
            .payments
            .find_by_id(payment_id)
            .await?
            .ok_or(BillingError::PaymentNotFound)?;

        if payment.status == PaymentStatus::Paid {
            return Err(BillingError::InvalidState(
                "payment has already been paid".to_string(),
            ));
        }

        let retries_cancelled = self
            .repos
            .retries
            .finish_all_for_payment(payment_id, PaymentRetryStatus::Cancelled)
            .await?;

        self.repos.payments.set_retry_count(payment_id, 0).await?;

        let cascade = self.cascade(&payment, Utc::now(), "admin").await?;

        info!(
            retries_cancelled,
            cascaded = cascade.changed(),
            "Payment retries cancelled"
        );

        if cascade.changed() {
            self.notify_exhausted(&payment, false).await;
        }

        Ok(CancelRetriesOutcome {
            retries_cancelled,
            cascaded: cascade.changed(),
        })
    }

    /// Charge every retry due at or before `now`
    ///
    /// Processor outages leave retries scheduled for the next run.
    #[instrument(skip(self))]
    pub async fn process_due_retries(
        &self,
        now: DateTime<Utc>,
    ) -> Result<RetryRunSummary, BillingError> {
        let due = self.repos.retries.find_due(now, RETRY_BATCH_SIZE).await?;
        let mut summary = RetryRunSummary {
            due: due.len(),
            ..Default::default()
        };

        if due.is_empty() {
            return Ok(summary);
        }

        let Some(processor) = self.processor.as_deref() else {
            warn!(due = due.len(), "Retries are due but no payment processor is configured");
            summary.skipped = due.len();
            return Ok(summary);
        };

        for retry in due {
            let retry_id = retry.retry_id();
            match self.run_retry(processor, &retry).await {
                Ok(RetryAttempt::Succeeded) => {
                    metrics::record_retry_attempt("succeeded");
                    summary.succeeded += 1;
                }
                Ok(RetryAttempt::Declined) => {
                    metrics::record_retry_attempt("declined");
                    summary.declined += 1;
                }
                Ok(RetryAttempt::Pending) => {
                    metrics::record_retry_attempt("pending");
                    summary.pending += 1;
                }
                Ok(RetryAttempt::Skipped) => summary.skipped += 1,
                Ok(RetryAttempt::Unreachable) => {
                    metrics::record_retry_attempt("error");
                    summary.errors += 1;
                }
                Err(e) => {
                    error!(retry_id = %retry_id, error = %e, "Retry processing failed");
                    metrics::record_retry_attempt("error");
                    summary.errors += 1;
                }
            }
        }

        info!(
            due = summary.due,
            succeeded = summary.succeeded,
            declined = summary.declined,
            pending = summary.pending,
            errors = summary.errors,
            skipped = summary.skipped,
            "Retry run finished"
        );

        Ok(summary)
    }

    async fn run_retry(
        &self,
        processor: &dyn PaymentProcessor,
        retry: &PaymentRetryRow,
    ) -> Result<RetryAttempt, BillingError> {
        let retry_id = retry.retry_id();
        let payment_id = retry.payment_id();

        let payment = match self.repos.payments.find_by_id(payment_id).await? {
            Some(p) if p.status == PaymentStatus::Failed => p,
            other => {
                debug!(
                    retry_id = %retry_id,
                    status = ?other.map(|p| p.status),
                    "Dropping retry for payment that is no longer failed"
                );
                self.repos
                    .retries
                    .finish(retry_id, PaymentRetryStatus::Cancelled)
                    .await?;
                return Ok(RetryAttempt::Skipped);
            }
        };

        let idempotency_key = format!("retry-{retry_id}");
        let processor_customer_id = self
            .repos
            .customers
            .find_by_id(payment.customer_id())
            .await?
            .and_then(|c| c.processor_customer_id);

        let Some(processor_customer_id) = processor_customer_id else {
            if !self
                .repos
                .retries
                .finish(retry_id, PaymentRetryStatus::Completed)
                .await?
            {
                return Ok(RetryAttempt::Skipped);
            }
            if let Err(e) = self
                .record_failure(
                    payment_id,
                    Some("no payment method on file"),
                    Some(idempotency_key.as_str()),
                )
                .await
            {
                self.restore_retry(retry_id, payment_id).await;
                return Err(e);
            }
            return Ok(RetryAttempt::Declined);
        };

        let request = ChargeRequest {
            payment_id,
            processor_customer_id,
            amount_cents: payment.amount_cents,
            currency: payment.currency.clone(),
            idempotency_key,
        };

        let outcome = match processor.charge(&request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(retry_id = %retry_id, error = %e, "Processor unavailable, retry stays scheduled");
                return Ok(RetryAttempt::Unreachable);
            }
        };

        // Another run or a webhook may have settled this retry meanwhile
        if !self
            .repos
            .retries
            .finish(retry_id, PaymentRetryStatus::Completed)
            .await?
        {
            return Ok(RetryAttempt::Skipped);
        }

        let result = match outcome {
            ChargeOutcome::Succeeded { charge_id } => self
                .record_success(payment_id, Some(charge_id.as_str()))
                .await
                .map(|_| RetryAttempt::Succeeded),
            ChargeOutcome::Declined { charge_id, reason } => self
                .record_failure(payment_id, Some(reason.as_str()), Some(charge_id.as_str()))
                .await
                .map(|_| RetryAttempt::Declined),
            ChargeOutcome::Pending { charge_id } => {
                debug!(charge_id = %charge_id, "Charge pending settlement");
                Ok(RetryAttempt::Pending)
            }
        };

        if result.is_err() {
            self.restore_retry(retry_id, payment_id).await;
        }
        result
    }

    /// Put a finished retry back on the schedule after its outcome failed to
    /// record, unless the failed write already scheduled a newer one
    async fn restore_retry(&self, retry_id: PaymentRetryId, payment_id: PaymentId) {
        match self.repos.retries.find_scheduled_by_payment(payment_id).await {
            Ok(scheduled) if !scheduled.is_empty() => {}
            Ok(_) => match self.repos.retries.reschedule(retry_id).await {
                Ok(true) => warn!(retry_id = %retry_id, "Outcome not recorded, retry rescheduled"),
                Ok(false) => debug!(retry_id = %retry_id, "Retry no longer completed, not rescheduled"),
                Err(e) => error!(retry_id = %retry_id, error = %e, "Failed to reschedule retry"),
            },
            Err(e) => error!(retry_id = %retry_id, error = %e, "Failed to look up scheduled retries"),
        }
    }

    /// Failed payments with their next retry, newest first
    #[instrument(skip(self))]
    pub async fn list_failed_payments(
        &self,
        limit: i64,
    ) -> Result<Vec<FailedPayment>, BillingError> {
        let limit = limit.clamp(1, MAX_FAILED_PAGE);
        let payments = self
            .repos
            .payments
            .find_by_status(PaymentStatus::Failed, limit)
            .await?;

        let mut failed = Vec::with_capacity(payments.len());
        for payment in payments {
            let next_retry_at = self
                .repos
                .retries
                .find_scheduled_by_payment(payment.payment_id())
                .await?
                .first()
                .map(|r| r.scheduled_for);

            failed.push(FailedPayment {
                id: payment.payment_id(),
                customer_id: payment.customer_id(),
                subscription_id: payment.subscription_id(),
                amount_cents: payment.amount_cents,
                currency: payment.currency,
                retry_count: payment.retry_count,
                failure_reason: payment.failure_reason,
                date: payment.date,
                next_retry_at,
            });
        }

        Ok(failed)
    }

    /// Apply a verified processor webhook event
    ///
    /// Each event id is applied at most once. Retryable errors release the
    /// claim so the processor's redelivery is processed.
    #[instrument(skip(self, event), fields(event_id = %event.id, event_type = %event.event_type))]
    pub async fn handle_webhook(&self, event: &PaymentEvent) -> Result<WebhookOutcome, BillingError> {
        let outcome = self.apply_webhook(event).await;
        match &outcome {
            Ok(o) => metrics::record_webhook(o.as_str()),
            Err(_) => metrics::record_webhook("error"),
        }
        outcome
    }

    async fn apply_webhook(&self, event: &PaymentEvent) -> Result<WebhookOutcome, BillingError> {
        if event.kind == PaymentEventKind::Ignored {
            debug!("Ignoring unhandled event type");
            return Ok(WebhookOutcome::Ignored);
        }

        let Some(payment_id) = event.payment_id else {
            warn!("Payment event without a payment id in metadata");
            return Ok(WebhookOutcome::Ignored);
        };

        let key = format!("event:{}", event.id);
        if !self.repos.events.claim(&key, Utc::now()).await? {
            info!("Duplicate webhook event");
            return Ok(WebhookOutcome::Duplicate);
        }

        let charge_id = event.charge_id.as_deref();
        let result = match &event.kind {
            PaymentEventKind::Failed { reason } => self
                .record_failure(payment_id, reason.as_deref(), charge_id)
                .await
                .map(|o| o == FailureOutcome::Duplicate),
            PaymentEventKind::Succeeded => self
                .record_success(payment_id, charge_id)
                .await
                .map(|o| o == SuccessOutcome::Duplicate),
            PaymentEventKind::Ignored => Ok(false),
        };

        match result {
            Ok(true) => Ok(WebhookOutcome::Duplicate),
            Ok(false) => Ok(WebhookOutcome::Processed),
            Err(BillingError::PaymentNotFound) => {
                warn!(payment_id = %payment_id, "Webhook refers to unknown payment");
                Ok(WebhookOutcome::UnknownPayment)
            }
            Err(e) => {
                if e.is_retryable() {
                    self.release(&key).await;
                }
                Err(e)
            }
        }
    }

    /// Whether service was already cut off, by exhaustion or by an admin
    async fn is_cut_off(&self, payment: &PaymentRow) -> Result<bool, BillingError> {
        let customer = self.repos.customers.find_by_id(payment.customer_id()).await?;
        if customer.is_some_and(|c| c.status == CustomerStatus::DoNotService) {
            return Ok(true);
        }

        let Some(subscription_id) = payment.subscription_id() else {
            return Ok(false);
        };
        Ok(self
            .repos
            .subscriptions
            .find_by_id(subscription_id)
            .await?
            .is_some_and(|s| s.status == SubscriptionStatus::Cancelled))
    }

    async fn mark_past_due(&self, subscription_id: SubscriptionId) -> Result<(), BillingError> {
        let Some(subscription) = self.repos.subscriptions.find_by_id(subscription_id).await? else {
            warn!(subscription_id = %subscription_id, "Payment references missing subscription");
            return Ok(());
        };

        // Cancelled subscriptions stay cancelled until a payment succeeds
        if subscription.status == SubscriptionStatus::Active {
            self.repos
                .subscriptions
                .update_status(subscription_id, SubscriptionStatus::PastDue)
                .await?;
        }
        Ok(())
    }

    async fn cascade(
        &self,
        payment: &PaymentRow,
        now: DateTime<Utc>,
        trigger: &'static str,
    ) -> Result<Cascade, BillingError> {
        let customer_id = payment.customer_id();
        let mut cascade = Cascade::default();

        if let Some(subscription_id) = payment.subscription_id() {
            cascade.subscription_cancelled = self
                .repos
                .subscriptions
                .cancel(subscription_id, now)
                .await?;
        }

        cascade.customer_blocked = self
            .repos
            .customers
            .update_status(customer_id, CustomerStatus::DoNotService)
            .await?;

        cascade.credits_depleted = self
            .repos
            .customers
            .deplete_service_credits(customer_id, now)
            .await?;

        if cascade.changed() {
            metrics::record_cascade(trigger);
            warn!(
                customer_id = %customer_id,
                subscription_cancelled = cascade.subscription_cancelled,
                customer_blocked = cascade.customer_blocked,
                credits_depleted = cascade.credits_depleted,
                trigger,
                "Customer moved to do-not-service"
            );
        }

        Ok(cascade)
    }

    async fn notify_exhausted(&self, payment: &PaymentRow, alert_admin: bool) {
        let Some(customer) = self.recipient(payment.customer_id()).await else {
            return;
        };

        if let Err(e) = self
            .notifier
            .retries_exhausted_customer(&customer, payment.amount_cents, &payment.currency)
            .await
        {
            warn!(error = %e, "Failed to send suspension notice");
        }

        if alert_admin {
            if let Err(e) = self
                .notifier
                .retries_exhausted_admin(
                    &customer,
                    &payment.payment_id().to_string(),
                    payment.amount_cents,
                    &payment.currency,
                )
                .await
            {
                warn!(error = %e, "Failed to send do-not-service alert");
            }
        }
    }

    async fn recipient(&self, customer_id: CustomerId) -> Option<Recipient> {
        match self.repos.customers.find_by_id(customer_id).await {
            Ok(Some(c)) => Some(Recipient {
                name: c.name,
                email: c.email,
            }),
            Ok(None) => {
                warn!(customer_id = %customer_id, "Customer not found; skipping email");
                None
            }
            Err(e) => {
                warn!(customer_id = %customer_id, error = %e, "Customer lookup failed; skipping email");
                None
            }
        }
    }

    async fn release(&self, key: &str) {
        if let Err(e) = self.repos.events.release(key).await {
            error!(key = %key, error = %e, "Failed to release idempotency claim");
        }
    }
}

impl std::fmt::Debug for PaymentRetryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentRetryService")
            .field("policy", &self.policy)
            .field("processor", &self.processor.is_some())
            .finish_non_exhaustive()
    }
}
