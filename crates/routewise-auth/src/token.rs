//! Signed session tokens
//!
//! Tokens are HS256 JWTs. The role claim is what route guards check; the
//! subject is the user id of whoever signed in.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use routewise_types::Role;
use serde::{Deserialize, Serialize};

use crate::{AuthConfig, AuthError};

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Role of the subject
    pub role: Role,
    /// Email, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

impl Claims {
    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// A freshly issued token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies session tokens
#[derive(Clone)]
pub struct TokenService {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Create a new token service
    pub fn new(config: AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret()),
            decoding_key: DecodingKey::from_secret(config.secret()),
            validation,
            config,
        }
    }

    /// Service configuration
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Issue a token for `subject` with the configured lifetime
    pub fn issue(
        &self,
        subject: impl Into<String>,
        role: Role,
        email: Option<String>,
    ) -> Result<IssuedToken, AuthError> {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(self.config.token_ttl.as_secs())
            .map_err(|_| AuthError::Configuration("token lifetime out of range".to_string()))?;

        let claims = Claims {
            sub: subject.into(),
            role,
            email,
            iat: now,
            exp: now + ttl,
        };

        let token = self.sign(&claims)?;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or_else(|| AuthError::Internal("token expiry out of range".to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Re-issue a token for an already verified caller
    pub fn refresh(&self, claims: &Claims) -> Result<IssuedToken, AuthError> {
        self.issue(claims.sub.clone(), claims.role, claims.email.clone())
    }

    /// Sign arbitrary claims
    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign token: {}", e);
            AuthError::Internal("failed to sign token".to_string())
        })
    }

    /// Verify a token and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!("Token validation failed: {}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            }
        })?;

        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
