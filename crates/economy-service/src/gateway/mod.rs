//! 特权网关
//!
//! 对接第三方平台授予/撤销聊天 VIP 身份。网关是独立的故障域：
//! 所有失败统一表现为 `GatewayError`，不做自动重试。

mod twitch;

pub use twitch::TwitchGateway;

use async_trait::async_trait;
use thiserror::Error;

/// 特权网关错误
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("请求超时")]
    Timeout,

    #[error("网络错误: {0}")]
    Network(String),

    #[error("凭证无效或已被撤销")]
    Unauthorized,

    #[error("上游用户不存在: {0}")]
    UserNotFound(String),

    #[error("上游返回异常: status={status}, body={body}")]
    Upstream { status: u16, body: String },

    #[error("凭证存储错误: {0}")]
    Token(String),
}

impl GatewayError {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Network(_) => "network",
            Self::Unauthorized => "unauthorized",
            Self::UserNotFound(_) => "user_not_found",
            Self::Upstream { .. } => "upstream",
            Self::Token(_) => "token",
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// 特权网关接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PrivilegeGateway: Send + Sync {
    /// 授予 VIP；用户已是 VIP 时视为成功
    async fn grant_vip(&self, login: &str) -> Result<(), GatewayError>;

    /// 撤销 VIP
    async fn revoke_vip(&self, login: &str) -> Result<(), GatewayError>;
}
