//! Billing metrics
//!
//! Names are exported through whatever `metrics` recorder the service installs.

use metrics::{counter, describe_counter, Unit};

/// Webhook events handled, by outcome
pub const WEBHOOKS_PROCESSED_TOTAL: &str = "routewise_webhooks_processed_total";
/// Payment failures recorded
pub const PAYMENT_FAILURES_TOTAL: &str = "routewise_payment_failures_total";
/// Retries scheduled
pub const RETRIES_SCHEDULED_TOTAL: &str = "routewise_retries_scheduled_total";
/// Subscriptions cancelled and customers flagged do-not-service
pub const CASCADES_TOTAL: &str = "routewise_cascades_total";
/// Retry job charge attempts, by outcome
pub const RETRY_ATTEMPTS_TOTAL: &str = "routewise_retry_attempts_total";

pub(crate) fn record_webhook(outcome: &'static str) {
    counter!(WEBHOOKS_PROCESSED_TOTAL, "outcome" => outcome).increment(1);
}

pub(crate) fn record_failure(exhausted: bool) {
    let stage = if exhausted { "exhausted" } else { "retrying" };
    counter!(PAYMENT_FAILURES_TOTAL, "stage" => stage).increment(1);
}

pub(crate) fn record_retry_scheduled(attempt: i32) {
    counter!(RETRIES_SCHEDULED_TOTAL, "attempt" => attempt.to_string()).increment(1);
}

pub(crate) fn record_cascade(trigger: &'static str) {
    counter!(CASCADES_TOTAL, "trigger" => trigger).increment(1);
}

pub(crate) fn record_retry_attempt(outcome: &'static str) {
    counter!(RETRY_ATTEMPTS_TOTAL, "outcome" => outcome).increment(1);
}

/// Describe billing metrics for registration with a recorder
pub fn describe_metrics() {
    describe_counter!(
        WEBHOOKS_PROCESSED_TOTAL,
        Unit::Count,
        "Payment processor webhook events handled"
    );
    describe_counter!(
        PAYMENT_FAILURES_TOTAL,
        Unit::Count,
        "Payment failures recorded"
    );
    describe_counter!(
        RETRIES_SCHEDULED_TOTAL,
        Unit::Count,
        "Payment retries scheduled"
    );
    describe_counter!(
        CASCADES_TOTAL,
        Unit::Count,
        "Subscriptions cancelled after retries were exhausted or cancelled"
    );
    describe_counter!(
        RETRY_ATTEMPTS_TOTAL,
        Unit::Count,
        "Charge attempts made by the retry job"
    );
}
