//! Failed-payment administration

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use routewise_axum::RequireAdmin;
use routewise_billing::{CancelRetriesOutcome, FailedPayment, RetryRunSummary};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::shared::{parse_payment_id, record_op_duration};
use crate::error::ApiResult;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct FailedPaymentsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct FailedPaymentsResponse {
    pub payments: Vec<FailedPayment>,
    pub count: usize,
}

/// List failed payments with their next scheduled retry
pub async fn list_failed_payments(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<FailedPaymentsQuery>,
) -> ApiResult<Json<FailedPaymentsResponse>> {
    let start = Instant::now();
    let result = state
        .billing
        .list_failed_payments(query.limit.unwrap_or(DEFAULT_PAGE_SIZE))
        .await;
    record_op_duration("list_failed_payments", start, result.is_ok());

    let payments = result?;
    Ok(Json(FailedPaymentsResponse {
        count: payments.len(),
        payments,
    }))
}

/// Cancel all retries for a payment and cut the customer off
pub async fn cancel_retries(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> ApiResult<Json<CancelRetriesOutcome>> {
    let payment_id = parse_payment_id(&id)?;
    let start = Instant::now();
    let result = state.billing.cancel_retries(payment_id).await;
    record_op_duration("cancel_retries", start, result.is_ok());

    let outcome = result?;
    info!(
        admin = %admin.subject,
        payment_id = %payment_id,
        retries_cancelled = outcome.retries_cancelled,
        "Admin cancelled payment retries"
    );
    Ok(Json(outcome))
}

/// Run the retry job now instead of waiting for the next tick
pub async fn run_retries(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> ApiResult<Json<RetryRunSummary>> {
    let start = Instant::now();
    let result = state.billing.process_due_retries(Utc::now()).await;
    record_op_duration("run_retries", start, result.is_ok());

    let summary = result?;
    info!(admin = %admin.subject, due = summary.due, "Retry job triggered manually");
    Ok(Json(summary))
}
