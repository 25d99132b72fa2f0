// ============================================================================
// Custody API - Auth Handlers
// File: crates/custody-api/src/handlers/auth.rs
// ============================================================================
//! Registration, login, and logout

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    pub user_id: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: String,
    pub account_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterResponse>>), ApiError> {
    let Json(payload) = payload?;
    let registration = state.auth.register(&payload.user_id, &payload.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(RegisterResponse {
            user_id: registration.user_id,
            account_id: registration.account_id,
            message: "Registration successful".to_string(),
        })),
    ))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let Json(payload) = payload?;
    let issued = state.auth.login(&payload.user_id, &payload.password).await?;

    Ok(Json(ApiResponse::success(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
    })))
}

/// POST /logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<LogoutResponse>>, ApiError> {
    state.auth.revoke(&user.token).await?;

    let message = if state.auth.revocable() {
        tracing::info!("User {} logged out", user.user_id);
        "Logged out successfully"
    } else {
        tracing::info!("User {} logged out; signed token stays valid until expiry", user.user_id);
        "Signed tokens cannot be revoked; this token stays valid until it expires"
    };

    Ok(Json(ApiResponse::success(LogoutResponse {
        message: message.to_string(),
    })))
}
