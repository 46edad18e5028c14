//! 虚拟经济服务
//!
//! 提供商店、开箱、库存与管理端目录的 REST API。

use std::sync::Arc;

use economy::{
    AppState, EconomyRepositories, EconomyService, RewardSelector, TwitchGateway, routes,
};
use economy_shared::{config::AppConfig, database::Database, observability};
use sqlx::migrate::Migrator;
use tokio::net::TcpListener;
use tracing::{info, warn};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load("economy-service")?;
    let _telemetry = observability::init(&config.service_name, &config.observability).await?;

    info!("Starting economy-service on {}", config.server_addr());

    let db = Database::connect(&config.database).await?;
    db.run_migrations(&MIGRATOR).await?;

    let repos = EconomyRepositories::postgres(db.pool().clone());
    let missing = config.twitch.missing_credentials();
    if !missing.is_empty() {
        warn!(?missing, "Twitch 凭证不完整，VIP 相关操作将失败");
    }
    let gateway = Arc::new(TwitchGateway::new(config.twitch.clone(), repos.tokens.clone())?);
    let economy = Arc::new(EconomyService::new(repos, gateway, RewardSelector::random()));

    let app = routes::app(AppState::new(economy));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 收到 SIGTERM 或 Ctrl+C 后停止接收新连接，等待已有请求处理完毕
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "注册 Ctrl+C 处理器失败");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
