//! HTTP 中间件
//!
//! `request_id` 需挂在 `http_tracing` 外层（后添加），span 才能带上请求 ID。

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, field, info_span};

use super::metrics;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
/// 会话层注入的调用方用户 ID
pub const USER_ID_HEADER: &str = "x-user-id";

const MAX_REQUEST_ID_LEN: usize = 128;

/// 请求 span 与 HTTP 指标
///
/// ```ignore
/// let app = Router::new()
///     .route("/api/shop", get(shop_overview))
///     .layer(middleware::from_fn(http_tracing))
///     .layer(middleware::from_fn(request_id));
/// ```
pub async fn http_tracing(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    // 指标标签使用路由模板，箱子/商品 ID 不进入维度
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let user_id = header_str(request.headers(), USER_ID_HEADER).unwrap_or("-").to_string();

    let span = info_span!(
        "http_request",
        %method,
        route = %route,
        request_id = %request_id,
        user_id = %user_id,
        status = field::Empty,
        latency_ms = field::Empty,
    );

    let start = Instant::now();
    let response = next.run(request).instrument(span.clone()).await;
    let elapsed = start.elapsed();
    let status = response.status().as_u16();

    span.record("status", status);
    span.record("latency_ms", elapsed.as_millis() as u64);
    metrics::record_http_request(method.as_str(), &route, status, elapsed.as_secs_f64());

    response
}

/// 传递或生成请求 ID，并回写到响应头
///
/// 上游 ID 为空、过长或含非法字符时重新生成。
pub async fn request_id(mut request: Request, next: Next) -> Response {
    let id = header_str(request.headers(), REQUEST_ID_HEADER)
        .filter(|id| is_acceptable_id(id))
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    request.extensions_mut().insert(RequestId(id.clone()));
    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn is_acceptable_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_REQUEST_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// 请求 ID，存放在请求 extensions 中
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
