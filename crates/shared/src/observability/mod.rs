//! 日志、指标与 HTTP 中间件
//!
//! 二进制入口只调用 [`init`]，拿到的 [`Telemetry`] 需保持存活直到进程退出。

pub mod metrics;
pub mod middleware;
pub mod tracing;

use std::net::SocketAddr;

use ::tracing::info;
use anyhow::Result;

pub use crate::config::ObservabilityConfig;
use metrics::MetricsExporter;

/// 可观测性资源，drop 时停止指标抓取服务
#[derive(Default)]
pub struct Telemetry {
    exporter: Option<MetricsExporter>,
}

impl Telemetry {
    /// 不带指标服务的实例，测试和 `metrics_enabled = false` 时使用
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn metrics_addr(&self) -> Option<SocketAddr> {
        self.exporter.as_ref().map(MetricsExporter::local_addr)
    }
}

impl Drop for Telemetry {
    fn drop(&mut self) {
        if let Some(exporter) = self.exporter.take() {
            exporter.stop();
            info!("指标抓取服务已停止");
        }
    }
}

/// 安装 tracing subscriber，并按配置启动指标抓取服务
///
/// ```ignore
/// let config = AppConfig::load("economy-service")?;
/// let _telemetry = observability::init(&config.service_name, &config.observability).await?;
/// ```
pub async fn init(service_name: &str, config: &ObservabilityConfig) -> Result<Telemetry> {
    tracing::init(config)?;

    let exporter = if config.metrics_enabled {
        Some(MetricsExporter::start(service_name, config).await?)
    } else {
        None
    };
    let telemetry = Telemetry { exporter };

    info!(
        service = %service_name,
        json_logs = config.json_logs,
        metrics_addr = ?telemetry.metrics_addr(),
        "可观测性初始化完成"
    );
    Ok(telemetry)
}
