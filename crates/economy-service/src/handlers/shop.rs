//! 商店与徽章接口

use axum::{
    Json,
    extract::{Path, State},
};

use super::extract::CurrentUser;
use crate::error::EconomyError;
use crate::models::Badge;
use crate::response::ApiResponse;
use crate::service::dto::{PurchaseResult, ShopItemView, ShopOverview};
use crate::state::AppState;

/// 商店总览：余额、商品（含持有状态）与箱子
pub async fn shop_overview(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ApiResponse<ShopOverview>>, EconomyError> {
    let overview = state.economy.shop_overview(user_id).await?;
    Ok(Json(ApiResponse::success(overview)))
}

pub async fn list_shop_items(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ApiResponse<Vec<ShopItemView>>>, EconomyError> {
    let items = state.economy.list_shop_items(user_id).await?;
    Ok(Json(ApiResponse::success(items)))
}

pub async fn buy_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(item_id): Path<i64>,
) -> Result<Json<ApiResponse<PurchaseResult>>, EconomyError> {
    let result = state.economy.purchase_item(user_id, item_id).await?;
    Ok(Json(ApiResponse::success(result)))
}

pub async fn list_badges(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Badge>>>, EconomyError> {
    let badges = state.economy.catalog().list_badges().await?;
    Ok(Json(ApiResponse::success(badges)))
}

pub async fn list_owned_badges(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ApiResponse<Vec<Badge>>>, EconomyError> {
    let badges = state.economy.list_owned_badges(user_id).await?;
    Ok(Json(ApiResponse::success(badges)))
}

pub async fn apply_badge(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(badge_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, EconomyError> {
    state.economy.apply_badge(badge_id, user_id).await?;
    Ok(Json(ApiResponse::success_empty()))
}
