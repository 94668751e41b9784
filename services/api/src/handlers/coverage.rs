//! Coverage-risk reports

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use routewise_axum::RequireAdmin;
use routewise_coverage::{CoverageNotification, CoverageReport};
use serde::Deserialize;
use tracing::info;

use super::shared::record_op_duration;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct NotifyRequest {
    /// Also email each affected customer
    #[serde(default)]
    pub notify_customers: bool,
}

/// Zips with active customers but no active coverage
pub async fn coverage_risk(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> ApiResult<Json<CoverageReport>> {
    let start = Instant::now();
    let result = state.coverage.detect().await;
    record_op_duration("coverage_risk", start, result.is_ok());
    Ok(Json(result?))
}

/// Detect coverage risk and email the admin digest
pub async fn notify_coverage_risk(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<NotifyRequest>,
) -> ApiResult<Json<CoverageNotification>> {
    let start = Instant::now();
    let result = state
        .coverage
        .detect_and_notify(request.notify_customers)
        .await;
    record_op_duration("notify_coverage_risk", start, result.is_ok());

    let notification = result?;
    info!(
        admin = %admin.subject,
        emails_sent = notification.emails_sent,
        emails_failed = notification.emails_failed,
        "Coverage risk notification sent"
    );
    Ok(Json(notification))
}
