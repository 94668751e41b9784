//! Billing configuration

use chrono::Duration;

/// How failed payments are retried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries attempted before the customer is cut off
    pub max_retries: u32,
    /// Delay before each retry; the last entry repeats
    pub delays: Vec<Duration>,
    /// Service credits granted for every successful payment
    pub credits_per_payment: i32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delays: vec![Duration::days(1), Duration::days(3), Duration::days(7)],
            credits_per_payment: 1,
        }
    }
}

impl RetryPolicy {
    /// Set the retry limit
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the back-off schedule
    pub fn with_delays(mut self, delays: Vec<Duration>) -> Self {
        self.delays = delays;
        self
    }

    /// Set credits granted per payment
    pub fn with_credits_per_payment(mut self, credits: i32) -> Self {
        self.credits_per_payment = credits;
        self
    }

    /// Delay before the retry that follows `retry_count` earlier retries
    pub fn delay_for(&self, retry_count: u32) -> Duration {
        let idx = retry_count as usize;
        self.delays
            .get(idx)
            .or_else(|| self.delays.last())
            .copied()
            .unwrap_or_else(|| Duration::days(1))
    }
}

/// Billing service configuration
#[derive(Clone, Default)]
pub struct BillingConfig {
    /// Payment processor secret key; retries cannot charge without it
    pub processor_api_key: Option<String>,
    /// Webhook signing secret; unsigned events are accepted when unset
    pub webhook_secret: Option<String>,
    /// Retry schedule
    pub retry: RetryPolicy,
}

impl BillingConfig {
    /// Create a new billing config with the default retry policy
    pub fn new(processor_api_key: Option<String>, webhook_secret: Option<String>) -> Self {
        Self {
            processor_api_key,
            webhook_secret,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl std::fmt::Debug for BillingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingConfig")
            .field("processor_api_key", &self.processor_api_key.is_some())
            .field("webhook_secret", &self.webhook_secret.is_some())
            .field("retry", &self.retry)
            .finish()
    }
}
