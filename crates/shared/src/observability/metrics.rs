//! Prometheus 指标
//!
//! recorder 全局只安装一次；抓取端点在 `metrics_port` 上单独监听，不经过业务路由。

use std::net::SocketAddr;
use std::sync::OnceLock;

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::{net::TcpListener, task::JoinHandle};
use tracing::{error, info};

use super::ObservabilityConfig;
use crate::error::SharedError;

static RECORDER: OnceLock<PrometheusHandle> = OnceLock::new();

enum Kind {
    Counter,
    Histogram,
}

const DESCRIPTIONS: &[(&str, Kind, &str)] = &[
    ("http_requests_total", Kind::Counter, "HTTP 请求数，按方法、路由模板与状态类别区分"),
    ("http_request_duration_seconds", Kind::Histogram, "HTTP 请求耗时（秒）"),
    ("economy_purchases_total", Kind::Counter, "商店购买次数，按商品类型与结果区分"),
    ("economy_case_opens_total", Kind::Counter, "开箱次数，按结果区分"),
    ("economy_item_applies_total", Kind::Counter, "库存物品使用次数，按奖励类型与结果区分"),
    ("economy_gateway_calls_total", Kind::Counter, "特权网关调用次数，按操作与结果区分"),
    ("economy_gateway_call_duration_seconds", Kind::Histogram, "特权网关调用耗时（秒）"),
];

/// `/metrics` 抓取服务
pub struct MetricsExporter {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl MetricsExporter {
    /// 安装 recorder 并在 `metrics_port` 上启动抓取服务
    pub async fn start(service_name: &str, config: &ObservabilityConfig) -> Result<Self> {
        let handle = install_recorder()?;

        let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], config.metrics_port))).await?;
        let addr = listener.local_addr()?;
        let app = Router::new().route("/metrics", get(move || std::future::ready(handle.render())));

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!(error = %e, "指标抓取服务异常退出");
            }
        });

        metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
        info!(%addr, "指标抓取服务已启动");

        Ok(Self { addr, task })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

fn install_recorder() -> Result<PrometheusHandle> {
    if let Some(handle) = RECORDER.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| SharedError::Observability(e.to_string()))?;
    for (name, kind, help) in DESCRIPTIONS {
        match kind {
            Kind::Counter => metrics::describe_counter!(*name, *help),
            Kind::Histogram => metrics::describe_histogram!(*name, *help),
        }
    }
    Ok(RECORDER.get_or_init(|| handle).clone())
}

/// 已安装的 recorder，未启用指标时为 None
pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    RECORDER.get()
}

/// 200 -> "2xx"，非法状态码归入 "unknown"
fn status_class(status: u16) -> &'static str {
    match status {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "unknown",
    }
}

pub fn record_http_request(method: &str, route: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status_class(status).to_string()),
    ];
    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_request_duration_seconds", &labels).record(duration_secs);
}

pub fn record_purchase(kind: &str, result: &str) {
    metrics::counter!(
        "economy_purchases_total",
        "kind" => kind.to_string(),
        "result" => result.to_string()
    )
    .increment(1);
}

pub fn record_case_open(result: &str) {
    metrics::counter!("economy_case_opens_total", "result" => result.to_string()).increment(1);
}

pub fn record_item_apply(kind: &str, result: &str) {
    metrics::counter!(
        "economy_item_applies_total",
        "kind" => kind.to_string(),
        "result" => result.to_string()
    )
    .increment(1);
}

/// 特权网关调用，`op` 为 grant_vip / revoke_vip
pub fn record_gateway_call(op: &str, result: &str, duration_secs: f64) {
    let op = op.to_string();
    metrics::counter!(
        "economy_gateway_calls_total",
        "op" => op.clone(),
        "result" => result.to_string()
    )
    .increment(1);
    metrics::histogram!("economy_gateway_call_duration_seconds", "op" => op).record(duration_secs);
}
