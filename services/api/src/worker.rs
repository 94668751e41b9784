//! Background jobs

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use routewise_axum::SlidingWindowLimiter;
use routewise_billing::PaymentRetryService;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Run due payment retries every `period`
pub fn spawn_retry_job(billing: Arc<PaymentRetryService>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(period_secs = period.as_secs(), "Retry job started");

        loop {
            ticker.tick().await;
            match billing.process_due_retries(Utc::now()).await {
                Ok(summary) if summary.due > 0 => info!(
                    due = summary.due,
                    succeeded = summary.succeeded,
                    declined = summary.declined,
                    pending = summary.pending,
                    errors = summary.errors,
                    skipped = summary.skipped,
                    "Retry job run complete"
                ),
                Ok(_) => debug!("No retries due"),
                Err(e) => error!(error = %e, "Retry job run failed"),
            }
        }
    })
}

/// Drop rate-limiter entries that have aged out, once per window
pub fn spawn_limiter_sweep(limiter: Arc<SlidingWindowLimiter>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(limiter.window());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let purged = limiter.purge_stale();
            if purged > 0 {
                debug!(purged, tracked = limiter.tracked_keys(), "Rate limiter swept");
            }
        }
    })
}
