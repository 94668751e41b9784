//! Configuration types for session tokens

use std::time::Duration;

use crate::AuthError;

/// Name of the cookie that carries the session token
pub const SESSION_COOKIE: &str = "routewise_session";

/// Token service configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign tokens
    secret: String,
    /// Token lifetime
    pub token_ttl: Duration,
    /// Cookie the token is read from and written to
    pub cookie_name: String,
}

impl AuthConfig {
    /// Minimum allowed secret length in bytes (256 bits)
    pub const MIN_SECRET_LENGTH: usize = 32;

    /// Create a new auth config
    ///
    /// # Errors
    /// Returns [`AuthError::Configuration`] if the secret is shorter than
    /// [`AuthConfig::MIN_SECRET_LENGTH`].
    pub fn new(secret: impl Into<String>) -> Result<Self, AuthError> {
        let secret = secret.into();
        if secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(AuthError::Configuration(format!(
                "token secret too short: got {} bytes, need at least {}",
                secret.len(),
                Self::MIN_SECRET_LENGTH
            )));
        }

        Ok(Self {
            secret,
            token_ttl: Duration::from_secs(7 * 24 * 60 * 60), // 7 days
            cookie_name: SESSION_COOKIE.to_string(),
        })
    }

    /// Set token lifetime
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Set the session cookie name
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub(crate) fn secret(&self) -> &[u8] {
        self.secret.as_bytes()
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_length", &self.secret.len())
            .field("token_ttl", &self.token_ttl)
            .field("cookie_name", &self.cookie_name)
            .finish()
    }
}
