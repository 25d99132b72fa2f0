//! Balance queries and mutations on the caller's own account

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub account_id: String,
    pub balance: i64,
}

type BalanceResult = Result<Json<ApiResponse<BalanceResponse>>, ApiError>;

/// GET /account
pub async fn get_account(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> BalanceResult {
    let account = state.ledger.account_for_owner(&user.user_id).await?;
    respond(account.id, account.balance)
}

/// POST /account/deposit
pub async fn deposit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<AmountRequest>, JsonRejection>,
) -> BalanceResult {
    let Json(payload) = payload?;
    let account = state.ledger.account_for_owner(&user.user_id).await?;
    let balance = state.ledger.deposit(&account.id, payload.amount).await?;
    respond(account.id, balance)
}

/// POST /account/withdraw
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<AmountRequest>, JsonRejection>,
) -> BalanceResult {
    let Json(payload) = payload?;
    let account = state.ledger.account_for_owner(&user.user_id).await?;
    let balance = state.ledger.withdraw(&account.id, payload.amount).await?;
    respond(account.id, balance)
}

fn respond(account_id: String, balance: i64) -> BalanceResult {
    Ok(Json(ApiResponse::success(BalanceResponse { account_id, balance })))
}
