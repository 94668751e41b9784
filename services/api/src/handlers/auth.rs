//! Session handlers

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use routewise_axum::RequireAuth;
use routewise_types::Role;
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub role: Role,
}

/// Re-issue the caller's session token and set it as an HttpOnly cookie
pub async fn refresh(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> ApiResult<impl IntoResponse> {
    let issued = state
        .tokens
        .issue(auth.subject.clone(), auth.role, auth.email.clone())?;

    let config = state.tokens.config();
    let cookie = format!(
        "{}={}; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age={}",
        config.cookie_name,
        issued.token,
        config.token_ttl.as_secs()
    );

    tracing::debug!(subject = %auth.subject, "Session refreshed");

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(SessionResponse {
            token: issued.token,
            expires_at: issued.expires_at,
            role: auth.role,
        }),
    ))
}
