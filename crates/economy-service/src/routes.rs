//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    Json, Router, middleware,
    routing::{get, post},
};
use economy_shared::observability::middleware as obs_middleware;
use tower_http::cors::{Any, CorsLayer};

use crate::{handlers, state::AppState};

/// 构建商店与徽章路由
pub fn shop_routes() -> Router<AppState> {
    Router::new()
        .route("/shop", get(handlers::shop::shop_overview))
        .route("/shop/items", get(handlers::shop::list_shop_items))
        .route("/buy_item/{id}", post(handlers::shop::buy_item))
        .route("/badges", get(handlers::shop::list_badges))
        .route("/badges/owned", get(handlers::shop::list_owned_badges))
        .route("/apply-badge/{id}", post(handlers::shop::apply_badge))
}

/// 构建箱子路由
pub fn case_routes() -> Router<AppState> {
    Router::new()
        .route("/cases", get(handlers::case::list_cases))
        .route("/case-rewards/{id}", get(handlers::case::case_rewards))
        .route("/case-open/{id}", post(handlers::case::open_case))
}

/// 构建库存与余额路由
pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(handlers::inventory::list_inventory))
        .route("/apply-item/{id}", post(handlers::inventory::apply_item))
        .route("/balance", get(handlers::inventory::get_balance))
}

/// 构建管理端目录路由
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/badges", post(handlers::admin::create_badge_item))
        .route("/vip-items", post(handlers::admin::create_vip_item))
        .route("/cases", post(handlers::admin::create_case))
        .route("/cases/{id}/rewards", post(handlers::admin::add_case_reward))
}

/// 构建完整的 API 路由
///
/// 不含前缀，由 [`app`] 挂载到 `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(shop_routes())
        .merge(case_routes())
        .merge(inventory_routes())
        .nest("/admin", admin_routes())
}

/// 组装完整应用：API、存活探针与中间件
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api_routes())
        .route("/health", get(health_check))
        .layer(cors)
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}

/// 存活探针：服务进程正常即返回 ok
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "economy-service"
    }))
}
