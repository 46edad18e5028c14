//! 箱子接口

use axum::{
    Json,
    extract::{Path, State},
};

use super::extract::CurrentUser;
use crate::error::EconomyError;
use crate::models::{Case, RewardView};
use crate::response::ApiResponse;
use crate::service::dto::OpenCaseResult;
use crate::state::AppState;

pub async fn list_cases(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Case>>>, EconomyError> {
    let cases = state.economy.catalog().list_cases().await?;
    Ok(Json(ApiResponse::success(cases)))
}

pub async fn case_rewards(
    State(state): State<AppState>,
    Path(case_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<RewardView>>>, EconomyError> {
    let rewards = state.economy.list_case_rewards(case_id).await?;
    Ok(Json(ApiResponse::success(rewards)))
}

pub async fn open_case(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(case_id): Path<i64>,
) -> Result<Json<ApiResponse<OpenCaseResult>>, EconomyError> {
    let result = state.economy.open_case(case_id, user_id).await?;
    Ok(Json(ApiResponse::success(result)))
}
