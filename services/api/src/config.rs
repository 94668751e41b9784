//! Configuration for the Routewise API service.

use std::time::Duration;

use routewise_auth::AuthConfig;
use routewise_billing::{BillingConfig, RetryPolicy};

/// Routewise API configuration
#[derive(Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,
    /// Database URL
    pub database_url: String,
    /// Database pool size
    pub database_max_connections: u32,
    /// Session token configuration
    pub auth: AuthConfig,
    /// Payment processor and retry configuration
    pub billing: BillingConfig,
    /// How often the retry job runs
    pub retry_job_interval: Duration,
    /// Requests allowed per client per window
    pub rate_limit_max_requests: usize,
    /// Rate-limit window
    pub rate_limit_window: Duration,
    /// Key rate limits by `X-Forwarded-For`; only behind a proxy that sets it
    pub rate_limit_trust_forwarded: bool,
    /// Email provider API key; emails are only logged when unset
    pub email_api_key: Option<String>,
    /// Sender address for all email
    pub email_from: String,
    /// Where staff alerts and coverage digests go
    pub admin_email: String,
    /// Request timeout
    pub request_timeout: Duration,
    /// Metrics enabled
    pub metrics_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        // Database
        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let database_max_connections = parse_or(&var, "DATABASE_MAX_CONNECTIONS", 10)?;

        // Server
        let http_port = parse_or(&var, "HTTP_PORT", 8080)?;
        let request_timeout_secs: u64 = parse_or(&var, "REQUEST_TIMEOUT_SECS", 30)?;

        // Session tokens
        let token_secret =
            var("AUTH_TOKEN_SECRET").ok_or(ConfigError::Missing("AUTH_TOKEN_SECRET"))?;
        let token_ttl_hours: u64 = parse_or(&var, "AUTH_TOKEN_TTL_HOURS", 168)?;
        if token_ttl_hours == 0 {
            return Err(ConfigError::Invalid("AUTH_TOKEN_TTL_HOURS"));
        }
        let auth = AuthConfig::new(token_secret)
            .map_err(|_| ConfigError::Invalid("AUTH_TOKEN_SECRET"))?
            .with_token_ttl(Duration::from_secs(token_ttl_hours * 3600));

        // Payments
        let max_retries = parse_or(&var, "RETRY_MAX_ATTEMPTS", 3)?;
        let delays = match var("RETRY_DELAYS_HOURS") {
            Some(raw) => parse_delays(&raw).ok_or(ConfigError::Invalid("RETRY_DELAYS_HOURS"))?,
            None => RetryPolicy::default().delays,
        };
        let credits_per_payment = parse_or(&var, "CREDITS_PER_PAYMENT", 1)?;
        let retry = RetryPolicy::default()
            .with_max_retries(max_retries)
            .with_delays(delays)
            .with_credits_per_payment(credits_per_payment);
        let billing = BillingConfig::new(
            var("PAYMENT_PROCESSOR_API_KEY"),
            var("PAYMENT_WEBHOOK_SECRET"),
        )
        .with_retry_policy(retry);

        let retry_job_interval_secs: u64 = parse_or(&var, "RETRY_JOB_INTERVAL_SECS", 300)?;
        if retry_job_interval_secs == 0 {
            return Err(ConfigError::Invalid("RETRY_JOB_INTERVAL_SECS"));
        }

        // Rate limiting
        let rate_limit_max_requests: usize = parse_or(&var, "RATE_LIMIT_MAX_REQUESTS", 60)?;
        let rate_limit_window_secs: u64 = parse_or(&var, "RATE_LIMIT_WINDOW_SECS", 60)?;
        if rate_limit_max_requests == 0 {
            return Err(ConfigError::Invalid("RATE_LIMIT_MAX_REQUESTS"));
        }
        if rate_limit_window_secs == 0 {
            return Err(ConfigError::Invalid("RATE_LIMIT_WINDOW_SECS"));
        }
        let rate_limit_trust_forwarded = parse_or(&var, "RATE_LIMIT_TRUST_FORWARDED", false)?;

        // Email
        let admin_email = var("ADMIN_EMAIL").ok_or(ConfigError::Missing("ADMIN_EMAIL"))?;
        let email_from =
            var("EMAIL_FROM").unwrap_or_else(|| "Routewise <noreply@routewise.app>".to_string());

        // Metrics
        let metrics_enabled = var("METRICS_ENABLED")
            .map(|v| v.parse().unwrap_or(true))
            .unwrap_or(true);

        Ok(Self {
            http_port,
            database_url,
            database_max_connections,
            auth,
            billing,
            retry_job_interval: Duration::from_secs(retry_job_interval_secs),
            rate_limit_max_requests,
            rate_limit_window: Duration::from_secs(rate_limit_window_secs),
            rate_limit_trust_forwarded,
            email_api_key: var("EMAIL_API_KEY"),
            email_from,
            admin_email,
            request_timeout: Duration::from_secs(request_timeout_secs),
            metrics_enabled,
        })
    }
}

fn parse_or<T, V>(var: &V, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    V: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        None => Ok(default),
    }
}

/// Parse `24,72,168` into back-off delays
fn parse_delays(raw: &str) -> Option<Vec<chrono::Duration>> {
    let hours = raw
        .split(',')
        .map(|part| part.trim().parse::<i64>().ok().filter(|h| *h > 0))
        .collect::<Option<Vec<_>>>()?;
    (!hours.is_empty()).then(|| hours.into_iter().map(chrono::Duration::hours).collect())
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("http_port", &self.http_port)
            .field("database_max_connections", &self.database_max_connections)
            .field("auth", &self.auth)
            .field("billing", &self.billing)
            .field("retry_job_interval", &self.retry_job_interval)
            .field("rate_limit_max_requests", &self.rate_limit_max_requests)
            .field("rate_limit_window", &self.rate_limit_window)
            .field("rate_limit_trust_forwarded", &self.rate_limit_trust_forwarded)
            .field("email_api_key", &self.email_api_key.is_some())
            .field("email_from", &self.email_from)
            .field("admin_email", &self.admin_email)
            .field("request_timeout", &self.request_timeout)
            .field("metrics_enabled", &self.metrics_enabled)
            .finish_non_exhaustive()
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let mut env: HashMap<String, String> = [
            ("DATABASE_URL", "postgres://localhost/routewise"),
            ("AUTH_TOKEN_SECRET", SECRET),
            ("ADMIN_EMAIL", "ops@example.com"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in vars {
            env.insert(k.to_string(), v.to_string());
        }
        Config::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.auth.token_ttl, Duration::from_secs(168 * 3600));
        assert_eq!(config.billing.retry, RetryPolicy::default());
        assert_eq!(config.billing.webhook_secret, None);
        assert_eq!(config.retry_job_interval, Duration::from_secs(300));
        assert_eq!(config.rate_limit_max_requests, 60);
        assert_eq!(config.rate_limit_window, Duration::from_secs(60));
        assert!(!config.rate_limit_trust_forwarded);
        assert!(config.email_api_key.is_none());
        assert!(config.metrics_enabled);
    }

    #[test]
    fn test_required_variables() {
        for name in ["DATABASE_URL", "AUTH_TOKEN_SECRET", "ADMIN_EMAIL"] {
            let err = load(&[(name, "")]).unwrap_err();
            assert!(matches!(err, ConfigError::Missing(n) if n == name));
        }
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = load(&[("AUTH_TOKEN_SECRET", "short")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("AUTH_TOKEN_SECRET")));
    }

    #[test]
    fn test_retry_schedule() {
        let config = load(&[
            ("RETRY_MAX_ATTEMPTS", "5"),
            ("RETRY_DELAYS_HOURS", "2, 12,48"),
            ("CREDITS_PER_PAYMENT", "4"),
        ])
        .unwrap();
        let retry = &config.billing.retry;
        assert_eq!(retry.max_retries, 5);
        assert_eq!(
            retry.delays,
            vec![
                chrono::Duration::hours(2),
                chrono::Duration::hours(12),
                chrono::Duration::hours(48)
            ]
        );
        assert_eq!(retry.credits_per_payment, 4);
    }

    #[test]
    fn test_invalid_values() {
        for (name, value) in [
            ("HTTP_PORT", "eighty"),
            ("RETRY_DELAYS_HOURS", "24,,72"),
            ("RETRY_DELAYS_HOURS", "0"),
            ("RETRY_MAX_ATTEMPTS", "-1"),
            ("RATE_LIMIT_MAX_REQUESTS", "0"),
            ("RETRY_JOB_INTERVAL_SECS", "0"),
            ("RATE_LIMIT_TRUST_FORWARDED", "yes"),
        ] {
            assert!(
                matches!(load(&[(name, value)]), Err(ConfigError::Invalid(_))),
                "{name}={value}"
            );
        }
    }

    #[test]
    fn test_trusted_proxy_flag() {
        let config = load(&[("RATE_LIMIT_TRUST_FORWARDED", "true")]).unwrap();
        assert!(config.rate_limit_trust_forwarded);
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = load(&[("EMAIL_API_KEY", "re_secret"), ("PAYMENT_WEBHOOK_SECRET", "whsec_x")]).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("re_secret"));
        assert!(!debug.contains("whsec_x"));
        assert!(!debug.contains(SECRET));
    }
}
