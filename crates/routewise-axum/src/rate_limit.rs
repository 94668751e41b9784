//! Per-client sliding-window rate limiting.
//!
//! Each key keeps the timestamps of its requests inside the trailing window.
//! A request is admitted while fewer than `max_requests` remain; otherwise
//! the caller is told how long until the oldest one ages out.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use metrics::counter;
use tracing::{debug, warn};

use crate::error::AuthRejection;

/// Requests rejected by the rate limiter
pub const RATE_LIMITED_TOTAL: &str = "routewise_rate_limited_total";

/// A rejected request and how long the caller should wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimited {
    /// Whole seconds until a request would be admitted (at least 1).
    pub retry_after_secs: u64,
}

impl From<RateLimited> for AuthRejection {
    fn from(limited: RateLimited) -> Self {
        AuthRejection::rate_limited(limited.retry_after_secs)
    }
}

/// Sliding-window limiter keyed by client.
pub struct SlidingWindowLimiter {
    window: Duration,
    max_requests: usize,
    trust_forwarded: bool,
    hits: DashMap<String, VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    /// Allow `max_requests` per `window` for each key.
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            window,
            max_requests,
            trust_forwarded: false,
            hits: DashMap::new(),
        }
    }

    /// Key clients by `X-Forwarded-For` instead of the socket peer.
    ///
    /// Only for deployments behind a proxy that overwrites the header;
    /// otherwise any client can pick its own key.
    #[must_use]
    pub fn trust_forwarded(mut self, trust: bool) -> Self {
        self.trust_forwarded = trust;
        self
    }

    pub fn trusts_forwarded(&self) -> bool {
        self.trust_forwarded
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Check and record a request for `key` now.
    pub fn check(&self, key: &str) -> Result<(), RateLimited> {
        self.check_at(key, Instant::now())
    }

    /// Check and record a request for `key` at `now`.
    ///
    /// Rejected requests are not recorded, so a client hammering the limit
    /// is admitted again as soon as its window clears.
    pub fn check_at(&self, key: &str, now: Instant) -> Result<(), RateLimited> {
        let mut hits = self.hits.entry(key.to_string()).or_default();
        evict(&mut hits, now, self.window);

        if hits.len() >= self.max_requests {
            let oldest = hits.front().copied().unwrap_or(now);
            let wait = (oldest + self.window).saturating_duration_since(now);
            let retry_after_secs = (wait.as_secs() + u64::from(wait.subsec_nanos() > 0)).max(1);
            return Err(RateLimited { retry_after_secs });
        }

        hits.push_back(now);
        Ok(())
    }

    /// Drop keys with no requests left in the window; returns how many.
    pub fn purge_stale(&self) -> usize {
        self.purge_stale_at(Instant::now())
    }

    /// [`Self::purge_stale`] as of `now`.
    pub fn purge_stale_at(&self, now: Instant) -> usize {
        let before = self.hits.len();
        self.hits.retain(|_, hits| {
            evict(hits, now, self.window);
            !hits.is_empty()
        });
        let purged = before.saturating_sub(self.hits.len());
        if purged > 0 {
            debug!(purged, remaining = self.hits.len(), "Purged idle rate-limit keys");
        }
        purged
    }

    /// Number of tracked keys.
    pub fn tracked_keys(&self) -> usize {
        self.hits.len()
    }
}

fn evict(hits: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&oldest) = hits.front() {
        if now.saturating_duration_since(oldest) >= window {
            hits.pop_front();
        } else {
            break;
        }
    }
}

impl std::fmt::Debug for SlidingWindowLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlidingWindowLimiter")
            .field("window", &self.window)
            .field("max_requests", &self.max_requests)
            .field("trust_forwarded", &self.trust_forwarded)
            .field("tracked_keys", &self.hits.len())
            .finish()
    }
}

/// Client identity used as the rate-limit key.
///
/// The socket peer, or the first `X-Forwarded-For` hop when
/// `trust_forwarded` is set and the header is present.
pub fn client_key(req: &Request, trust_forwarded: bool) -> String {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .filter(|_| trust_forwarded)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware answering 429 with `Retry-After` once a client is over the limit.
///
/// ```ignore
/// let app = Router::new()
///     .route("/webhooks/payments", post(webhook))
///     .layer(axum::middleware::from_fn_with_state(limiter.clone(), rate_limit));
/// ```
pub async fn rate_limit(
    State(limiter): State<Arc<SlidingWindowLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let key = client_key(&req, limiter.trusts_forwarded());

    match limiter.check(&key) {
        Ok(()) => next.run(req).await,
        Err(limited) => {
            warn!(
                client = %key,
                path = %req.uri().path(),
                retry_after_secs = limited.retry_after_secs,
                "Rate limit exceeded"
            );
            counter!(RATE_LIMITED_TOTAL).increment(1);
            AuthRejection::from(limited).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_max() {
        let limiter = SlidingWindowLimiter::new(3, Duration::from_secs(60));
        let t0 = Instant::now();

        for _ in 0..3 {
            assert!(limiter.check_at("1.2.3.4", t0).is_ok());
        }
        assert!(limiter.check_at("1.2.3.4", t0).is_err());
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(60));
        let t0 = Instant::now();

        assert!(limiter.check_at("a", t0).is_ok());
        assert!(limiter.check_at("a", t0).is_err());
        assert!(limiter.check_at("b", t0).is_ok());
    }

    #[test]
    fn test_retry_after_counts_from_oldest() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(60));
        let t0 = Instant::now();

        limiter.check_at("k", t0).unwrap();
        limiter.check_at("k", t0 + Duration::from_secs(10)).unwrap();

        let err = limiter
            .check_at("k", t0 + Duration::from_millis(20_500))
            .unwrap_err();
        // 60s window from t0, 20.5s elapsed: 39.5s rounds up
        assert_eq!(err.retry_after_secs, 40);
    }

    #[test]
    fn test_retry_after_is_at_least_one() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_millis(500));
        let t0 = Instant::now();

        limiter.check_at("k", t0).unwrap();
        let err = limiter.check_at("k", t0 + Duration::from_millis(499)).unwrap_err();
        assert_eq!(err.retry_after_secs, 1);
    }

    #[test]
    fn test_window_slides() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(60));
        let t0 = Instant::now();

        limiter.check_at("k", t0).unwrap();
        limiter.check_at("k", t0 + Duration::from_secs(30)).unwrap();
        assert!(limiter.check_at("k", t0 + Duration::from_secs(59)).is_err());
        // The first request ages out; the second is still inside the window
        assert!(limiter.check_at("k", t0 + Duration::from_secs(60)).is_ok());
        assert!(limiter.check_at("k", t0 + Duration::from_secs(61)).is_err());
    }

    #[test]
    fn test_purge_stale() {
        let limiter = SlidingWindowLimiter::new(5, Duration::from_secs(60));
        let t0 = Instant::now();

        limiter.check_at("old", t0).unwrap();
        limiter.check_at("new", t0 + Duration::from_secs(50)).unwrap();
        assert_eq!(limiter.tracked_keys(), 2);

        assert_eq!(limiter.purge_stale_at(t0 + Duration::from_secs(70)), 1);
        assert_eq!(limiter.tracked_keys(), 1);
        assert!(limiter.check_at("new", t0 + Duration::from_secs(70)).is_ok());
    }

    fn forwarded_from_peer() -> Request {
        let mut req = axum::http::Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(axum::body::Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 4711))));
        req
    }

    #[test]
    fn test_client_key_uses_forwarded_for_behind_trusted_proxy() {
        assert_eq!(client_key(&forwarded_from_peer(), true), "203.0.113.7");
    }

    #[test]
    fn test_client_key_ignores_forwarded_for_by_default() {
        assert_eq!(client_key(&forwarded_from_peer(), false), "192.0.2.1");
        assert!(!SlidingWindowLimiter::new(1, Duration::from_secs(1)).trusts_forwarded());
    }

    #[test]
    fn test_client_key_falls_back_to_peer() {
        let mut req = axum::http::Request::builder().body(axum::body::Body::empty()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 4711))));
        assert_eq!(client_key(&req, true), "192.0.2.1");

        let bare = axum::http::Request::builder().body(axum::body::Body::empty()).unwrap();
        assert_eq!(client_key(&bare, true), "unknown");
    }
}
