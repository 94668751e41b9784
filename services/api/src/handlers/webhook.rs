//! Payment processor webhook handler

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use routewise_billing::{WebhookOutcome, SIGNATURE_HEADER};
use serde::Serialize;

use super::shared::record_op_duration;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    pub outcome: WebhookOutcome,
}

/// Handle payment processor webhooks
///
/// The raw body is needed for signature verification. Duplicates, unknown
/// payments, and unhandled event types are acknowledged with 200 so the
/// processor stops redelivering; transient failures return 500 so it retries.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookAck>> {
    let start = Instant::now();

    let signature = headers
        .get(SIGNATURE_HEADER)
        .map(|v| v.to_str())
        .transpose()
        .map_err(|_| ApiError::WebhookError("Invalid signature header".into()))?;

    let event = match state.webhooks.verify_and_parse(&body, signature) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected payment webhook");
            record_op_duration("payment_webhook", start, false);
            return Err(e.into());
        }
    };

    let result = state.billing.handle_webhook(&event).await;
    record_op_duration("payment_webhook", start, result.is_ok());

    let outcome = result?;
    tracing::info!(
        event_id = %event.id,
        event_type = %event.event_type,
        outcome = outcome.as_str(),
        "Payment webhook handled"
    );

    Ok(Json(WebhookAck {
        received: true,
        outcome,
    }))
}
