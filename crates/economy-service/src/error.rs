//! 经济服务错误类型
//!
//! 业务错误原样返回给调用方，由 HTTP 层映射为 400/401/500，任何错误都不会自动重试。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::gateway::GatewayError;
use crate::response::ApiResponse;

/// 经济服务错误类型
#[derive(Debug, Error)]
pub enum EconomyError {
    // === 资源不存在 ===
    #[error("用户不存在: {0}")]
    UserNotFound(i64),

    #[error("商品不存在: {0}")]
    ShopItemNotFound(i64),

    #[error("箱子不存在: {0}")]
    CaseNotFound(i64),

    #[error("奖励不存在: {0}")]
    RewardNotFound(i64),

    #[error("徽章不存在: {0}")]
    BadgeNotFound(i64),

    // === 业务规则 ===
    #[error("余额不足: 需要 {required}, 可用 {available}")]
    InsufficientBalance { required: i64, available: i64 },

    #[error("用户未持有该物品: user_id={user_id}, reward_id={reward_id}")]
    NotOwned { user_id: i64, reward_id: i64 },

    #[error("用户已拥有该商品: user_id={user_id}, item_id={item_id}")]
    AlreadyOwned { user_id: i64, item_id: i64 },

    #[error("未抽中任何奖励: case_id={case_id}")]
    NoRewardSelected { case_id: i64 },

    #[error("参数验证失败: {0}")]
    Validation(String),

    #[error("未授权")]
    Unauthorized,

    // === 外部服务 ===
    #[error("特权网关错误: {0}")]
    Gateway(#[from] GatewayError),

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, EconomyError>;

impl EconomyError {
    /// 仅数据库错误可重试；引擎内部不做自动重试
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }

    /// 是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            Self::Gateway(_) | Self::Database(_) | Self::Internal(_) | Self::Unauthorized
        )
    }

    /// 获取错误码
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::ShopItemNotFound(_) => "SHOP_ITEM_NOT_FOUND",
            Self::CaseNotFound(_) => "CASE_NOT_FOUND",
            Self::RewardNotFound(_) => "REWARD_NOT_FOUND",
            Self::BadgeNotFound(_) => "BADGE_NOT_FOUND",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::NotOwned { .. } => "NOT_OWNED",
            Self::AlreadyOwned { .. } => "ALREADY_OWNED",
            Self::NoRewardSelected { .. } => "NO_REWARD_SELECTED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Gateway(_) => "GATEWAY_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 是否为"资源不存在"类错误
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::ShopItemNotFound(_)
                | Self::CaseNotFound(_)
                | Self::RewardNotFound(_)
                | Self::BadgeNotFound(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Gateway(_) | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for EconomyError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Gateway(e) => {
                tracing::error!(error = %e, "特权网关调用失败");
                "外部服务暂时不可用，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        (status, axum::Json(ApiResponse::failure(self.error_code(), message))).into_response()
    }
}
