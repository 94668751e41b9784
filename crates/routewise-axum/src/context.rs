//! Authentication context types.
//!
//! The [`AuthContext`] struct contains the verified caller information
//! available to request handlers.

use routewise_auth::Claims;
use routewise_types::Role;

/// Where the session token was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Bearer token from the Authorization header.
    BearerToken,
    /// Session cookie.
    Cookie,
}

/// A verified caller.
///
/// Populated by [`crate::AuthLayer`] and read through the extractors.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Subject of the token (user id).
    pub subject: String,
    /// The caller's role.
    pub role: Role,
    /// Email, when the token carries one.
    pub email: Option<String>,
    /// Source of the credentials.
    pub source: AuthSource,
}

impl AuthContext {
    /// Create a context with no email, as if from a bearer token.
    #[must_use]
    pub fn new(subject: impl Into<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            role,
            email: None,
            source: AuthSource::BearerToken,
        }
    }

    /// Build a context from verified claims.
    #[must_use]
    pub fn from_claims(claims: Claims, source: AuthSource) -> Self {
        Self {
            subject: claims.sub,
            role: claims.role,
            email: claims.email,
            source,
        }
    }

    /// Set the email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the auth source.
    #[must_use]
    pub fn with_source(mut self, source: AuthSource) -> Self {
        self.source = source;
        self
    }

    /// Check if the caller is an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Check if the caller is staff (admin or field employee).
    #[must_use]
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_context_builder() {
        let ctx = AuthContext::new("user_1", Role::Admin)
            .with_email("ops@example.com")
            .with_source(AuthSource::Cookie);

        assert!(ctx.is_admin());
        assert!(ctx.is_staff());
        assert_eq!(ctx.email.as_deref(), Some("ops@example.com"));
        assert_eq!(ctx.source, AuthSource::Cookie);
    }

    #[test]
    fn test_role_checks() {
        let employee = AuthContext::new("e", Role::Employee);
        assert!(!employee.is_admin());
        assert!(employee.is_staff());

        let customer = AuthContext::new("c", Role::Customer);
        assert!(!customer.is_admin());
        assert!(!customer.is_staff());
    }

    #[test]
    fn test_from_claims() {
        let claims = Claims {
            sub: "user_9".to_string(),
            role: Role::Customer,
            email: Some("c@example.com".to_string()),
            iat: 0,
            exp: 1,
        };
        let ctx = AuthContext::from_claims(claims, AuthSource::BearerToken);
        assert_eq!(ctx.subject, "user_9");
        assert_eq!(ctx.role, Role::Customer);
        assert_eq!(ctx.email.as_deref(), Some("c@example.com"));
    }
}
