//! 管理端目录接口
//!
//! 管理员鉴权由外层网关负责

use axum::{
    Json,
    extract::{Path, State},
};

use crate::error::EconomyError;
use crate::models::{Case, CaseReward, ShopItem};
use crate::response::ApiResponse;
use crate::service::dto::{
    AddCaseRewardRequest, CreateBadgeItemRequest, CreateCaseRequest, CreateVipItemRequest,
};
use crate::state::AppState;

pub async fn create_badge_item(
    State(state): State<AppState>,
    Json(req): Json<CreateBadgeItemRequest>,
) -> Result<Json<ApiResponse<ShopItem>>, EconomyError> {
    let item = state.economy.catalog().create_badge_item(req).await?;
    Ok(Json(ApiResponse::success(item)))
}

pub async fn create_vip_item(
    State(state): State<AppState>,
    Json(req): Json<CreateVipItemRequest>,
) -> Result<Json<ApiResponse<ShopItem>>, EconomyError> {
    let item = state.economy.catalog().create_vip_item(req).await?;
    Ok(Json(ApiResponse::success(item)))
}

pub async fn create_case(
    State(state): State<AppState>,
    Json(req): Json<CreateCaseRequest>,
) -> Result<Json<ApiResponse<Case>>, EconomyError> {
    let case = state.economy.catalog().create_case(req).await?;
    Ok(Json(ApiResponse::success(case)))
}

pub async fn add_case_reward(
    State(state): State<AppState>,
    Path(case_id): Path<i64>,
    Json(req): Json<AddCaseRewardRequest>,
) -> Result<Json<ApiResponse<CaseReward>>, EconomyError> {
    let reward = state.economy.catalog().add_case_reward(case_id, req).await?;
    Ok(Json(ApiResponse::success(reward)))
}
