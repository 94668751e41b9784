//! Axum extractors for authentication and authorization.
//!
//! These extractors read the [`AuthContext`] that [`crate::AuthLayer`] stored
//! in the request extensions. Without the layer every request is anonymous.
//!
//! # Usage
//!
//! ```ignore
//! use routewise_axum::{MaybeAuth, RequireAdmin, RequireAuth};
//!
//! // Any signed-in caller (401 otherwise)
//! async fn me(auth: RequireAuth) -> String {
//!     format!("{} ({})", auth.subject, auth.role)
//! }
//!
//! // Admins only (403 for other roles)
//! async fn failed_payments(auth: RequireAdmin) -> String {
//!     "...".to_string()
//! }
//!
//! // Optional authentication
//! async fn landing(auth: MaybeAuth) -> String {
//!     match auth.0 {
//!         Some(ctx) => format!("Hello, {}!", ctx.subject),
//!         None => "Hello, guest!".to_string(),
//!     }
//! }
//! ```

use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::context::AuthContext;
use crate::error::AuthRejection;

/// Extension key for storing auth context in request extensions.
#[derive(Debug, Clone)]
pub struct AuthContextExt(pub AuthContext);

fn context(parts: &Parts) -> Option<AuthContext> {
    parts
        .extensions
        .get::<AuthContextExt>()
        .map(|ext| ext.0.clone())
}

/// Extractor that requires authentication.
///
/// Returns 401 Unauthorized if no valid session token is present.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthContext);

impl Deref for RequireAuth {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        context(parts)
            .map(Self)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

/// Extractor for optional authentication.
///
/// Returns `None` if no authentication is present, rather than failing.
#[derive(Debug, Clone)]
pub struct MaybeAuth(pub Option<AuthContext>);

impl Deref for MaybeAuth {
    type Target = Option<AuthContext>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for MaybeAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(context(parts)))
    }
}

/// Extractor that requires the admin role.
///
/// Returns 401 if unauthenticated and 403 if the caller is not an admin.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthContext);

impl Deref for RequireAdmin {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl RequireAdmin {
    /// Check an already extracted context.
    pub fn new(context: AuthContext) -> Result<Self, AuthRejection> {
        if context.is_admin() {
            Ok(Self(context))
        } else {
            Err(AuthRejection::InsufficientRole("admin"))
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = context(parts).ok_or(AuthRejection::Unauthenticated)?;
        Self::new(auth)
    }
}

/// Extractor that requires a staff role (admin or employee).
///
/// Returns 401 if unauthenticated and 403 for customers.
#[derive(Debug, Clone)]
pub struct RequireStaff(pub AuthContext);

impl Deref for RequireStaff {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl RequireStaff {
    /// Check an already extracted context.
    pub fn new(context: AuthContext) -> Result<Self, AuthRejection> {
        if context.is_staff() {
            Ok(Self(context))
        } else {
            Err(AuthRejection::InsufficientRole("staff"))
        }
    }
}

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = context(parts).ok_or(AuthRejection::Unauthenticated)?;
        Self::new(auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use routewise_types::Role;

    #[test]
    fn test_require_admin() {
        assert!(RequireAdmin::new(AuthContext::new("a", Role::Admin)).is_ok());
        assert!(matches!(
            RequireAdmin::new(AuthContext::new("e", Role::Employee)),
            Err(AuthRejection::InsufficientRole("admin"))
        ));
    }

    #[test]
    fn test_require_staff() {
        assert!(RequireStaff::new(AuthContext::new("a", Role::Admin)).is_ok());
        assert!(RequireStaff::new(AuthContext::new("e", Role::Employee)).is_ok());
        assert!(matches!(
            RequireStaff::new(AuthContext::new("c", Role::Customer)),
            Err(AuthRejection::InsufficientRole("staff"))
        ));
    }
}
