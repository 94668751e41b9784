//! Rejections from auth extractors and the rate limiter.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Authentication, authorization and rate-limit rejections.
#[derive(Debug, thiserror::Error)]
pub enum AuthRejection {
    /// No valid session token on the request.
    #[error("authentication required")]
    Unauthenticated,

    /// Caller lacks the required role.
    #[error("insufficient permissions: requires {0} role")]
    InsufficientRole(&'static str),

    /// Rate limit exceeded.
    #[error("rate limit exceeded: retry after {retry_after_secs} seconds")]
    RateLimitExceeded { retry_after_secs: u64 },
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl AuthRejection {
    /// Create a rate limit exceeded error.
    #[must_use]
    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self::RateLimitExceeded { retry_after_secs }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::InsufficientRole(_) => StatusCode::FORBIDDEN,
            Self::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::InsufficientRole(_) => "FORBIDDEN",
            Self::RateLimitExceeded { .. } => "RATE_LIMITED",
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.error_code(),
                message: self.to_string(),
            },
        };

        let mut response = (self.status_code(), Json(body)).into_response();
        if let Self::RateLimitExceeded { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthRejection::Unauthenticated;
        assert_eq!(err.to_string(), "authentication required");

        let err = AuthRejection::InsufficientRole("admin");
        assert!(err.to_string().contains("admin"));

        let err = AuthRejection::rate_limited(60);
        assert!(err.to_string().contains("60 seconds"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuthRejection::Unauthenticated.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::InsufficientRole("admin").into_response().status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = AuthRejection::rate_limited(17).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "17");
    }
}
