//! 库存与余额接口

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use super::extract::CurrentUser;
use crate::error::EconomyError;
use crate::models::RewardView;
use crate::response::ApiResponse;
use crate::service::dto::ApplyOutcome;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ApplyItemQuery {
    pub lot_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: i64,
}

pub async fn get_balance(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ApiResponse<BalanceResponse>>, EconomyError> {
    let balance = state.economy.ledger().get_balance(user_id).await?;
    Ok(Json(ApiResponse::success(BalanceResponse { balance })))
}

pub async fn list_inventory(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ApiResponse<Vec<RewardView>>>, EconomyError> {
    let items = state.economy.list_inventory(user_id).await?;
    Ok(Json(ApiResponse::success(items)))
}

pub async fn apply_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(reward_id): Path<i64>,
    Query(query): Query<ApplyItemQuery>,
) -> Result<Json<ApiResponse<ApplyOutcome>>, EconomyError> {
    let outcome = state
        .economy
        .apply_item(reward_id, user_id, query.lot_name.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(outcome)))
}
