//! Error types for the Routewise API service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use routewise_billing::BillingError;
use routewise_coverage::CoverageError;
use serde::Serialize;

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Payment not found")]
    PaymentNotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Webhook error: {0}")]
    WebhookError(String),

    #[error("{0}")]
    Auth(#[from] routewise_auth::AuthError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error")]
    Database(#[from] routewise_db::DbError),

    #[error("Billing error")]
    Billing(BillingError),
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::PaymentNotFound => Self::PaymentNotFound,
            BillingError::InvalidState(msg) => Self::Conflict(msg),
            BillingError::Webhook(msg) => Self::WebhookError(msg),
            BillingError::Database(e) => Self::Database(e),
            other => Self::Billing(other),
        }
    }
}

impl From<CoverageError> for ApiError {
    fn from(err: CoverageError) -> Self {
        match err {
            CoverageError::Database(e) => Self::Database(e),
        }
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::PaymentNotFound => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) | Self::WebhookError(_) => StatusCode::BAD_REQUEST,
            Self::Auth(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::UNAUTHORIZED)
            }
            Self::Database(e) if e.is_unique_violation() => StatusCode::CONFLICT,
            Self::Internal(_) | Self::Database(_) | Self::Billing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::PaymentNotFound => "PAYMENT_NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::WebhookError(_) => "WEBHOOK_ERROR",
            Self::Auth(e) => e.error_code(),
            Self::Database(e) if e.is_unique_violation() => "CONFLICT",
            Self::Internal(_) | Self::Database(_) | Self::Billing(_) => {
                "INTERNAL_ERROR"
            }
        }
    }

    fn is_internal(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log internal errors
        if self.is_internal() {
            tracing::error!(error = ?self, "Internal API error");
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
