//! Application state for the Routewise API service.

use std::sync::Arc;

use routewise_auth::TokenService;
use routewise_axum::SlidingWindowLimiter;
use routewise_billing::{PaymentProcessor, PaymentRetryService, WebhookVerifier};
use routewise_coverage::CoverageService;
use routewise_db::{DbPool, Repositories};
use routewise_notify::{Mailer, Notifier};

use crate::config::Config;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Failed payments, retries, and webhook handling
    pub billing: Arc<PaymentRetryService>,
    /// Coverage-risk detection
    pub coverage: Arc<CoverageService>,
    /// Session token issuing and verification
    pub tokens: Arc<TokenService>,
    /// Webhook signature verification
    pub webhooks: WebhookVerifier,
    /// Per-client request limiter
    pub limiter: Arc<SlidingWindowLimiter>,
    /// Database pool (readiness checks)
    pub pool: DbPool,
    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the services together from configuration
    ///
    /// Retries are only charged when a `processor` is given.
    pub fn new(
        config: Config,
        repos: Repositories,
        pool: DbPool,
        mailer: Arc<dyn Mailer>,
        processor: Option<Arc<dyn PaymentProcessor>>,
    ) -> Self {
        let notifier = Notifier::new(mailer, &config.email_from, &config.admin_email);

        let mut billing =
            PaymentRetryService::new(repos.clone(), notifier.clone(), config.billing.retry.clone());
        if let Some(processor) = processor {
            billing = billing.with_processor(processor);
        }

        Self {
            billing: Arc::new(billing),
            coverage: Arc::new(CoverageService::new(repos, notifier)),
            tokens: Arc::new(TokenService::new(config.auth.clone())),
            webhooks: WebhookVerifier::new(config.billing.webhook_secret.clone()),
            limiter: Arc::new(
                SlidingWindowLimiter::new(config.rate_limit_max_requests, config.rate_limit_window)
                    .trust_forwarded(config.rate_limit_trust_forwarded),
            ),
            pool,
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
