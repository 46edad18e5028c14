//! 请求提取器

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

pub use economy_shared::observability::middleware::USER_ID_HEADER;

use crate::error::EconomyError;

/// 当前登录用户
///
/// 缺失或无法解析时返回 401
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub i64);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = EconomyError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .map(CurrentUser)
            .ok_or(EconomyError::Unauthorized)
    }
}
