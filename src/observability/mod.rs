//! 可观测性模块
//!
//! 提供 Prometheus 文本格式指标、结构化日志和健康检查。

use axum::{Json, Router, response::IntoResponse, routing::get};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

use crate::config::config::LoggingConfig;

// ===== Simple Metrics =====

/// 简单应用指标
#[derive(Debug, Default)]
pub struct AppMetrics {
    pub http_requests_total: AtomicU64,
    pub http_request_duration_sum: AtomicU64,
    pub targets_connected_total: AtomicU64,
    pub automation_runs_total: AtomicU64,
    pub automation_actions_total: AtomicU64,
    pub automation_action_failures_total: AtomicU64,
    pub telemetry_snapshots_total: AtomicU64,
    pub memory_scans_total: AtomicU64,
    pub memory_edits_total: AtomicU64,
    pub errors_total: AtomicU64,
}

impl AppMetrics {
    /// 记录 HTTP 请求
    pub fn record_http_request(&self, duration_ms: u64) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);
        self.http_request_duration_sum
            .fetch_add(duration_ms, Ordering::Relaxed);
    }

    pub fn record_connect(&self) {
        self.targets_connected_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_run_started(&self) {
        self.automation_runs_total.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录一次动作分发
    pub fn record_action(&self, ok: bool) {
        self.automation_actions_total.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.automation_action_failures_total
                .fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_snapshot(&self) {
        self.telemetry_snapshots_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scan(&self) {
        self.memory_scans_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_edit(&self) {
        self.memory_edits_total.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录错误
    pub fn record_error(&self) {
        self.errors_total.fetch_add(1, Ordering::Relaxed);
    }

    /// 生成 Prometheus 格式指标
    ///
    /// 运行中的订阅数和自动化状态由调用方以 gauge 形式传入。
    pub fn gather(&self, telemetry_streams: usize, automation_contexts: usize) -> String {
        format!(
            r#"# HELP http_requests_total Total HTTP requests
# TYPE http_requests_total counter
http_requests_total {}
# HELP http_request_duration_seconds HTTP request duration in seconds
# TYPE http_request_duration_seconds summary
http_request_duration_seconds_sum {}
http_request_duration_seconds_count {}
# HELP targets_connected_total Successful connect operations
# TYPE targets_connected_total counter
targets_connected_total {}
# HELP automation_runs_total Automation runs started
# TYPE automation_runs_total counter
automation_runs_total {}
# HELP automation_actions_total Actions dispatched to the input injector
# TYPE automation_actions_total counter
automation_actions_total {}
# HELP automation_action_failures_total Action dispatches that failed
# TYPE automation_action_failures_total counter
automation_action_failures_total {}
# HELP automation_contexts Active automation execution contexts
# TYPE automation_contexts gauge
automation_contexts {}
# HELP telemetry_streams Open telemetry subscriptions
# TYPE telemetry_streams gauge
telemetry_streams {}
# HELP telemetry_snapshots_total Telemetry snapshots emitted
# TYPE telemetry_snapshots_total counter
telemetry_snapshots_total {}
# HELP memory_scans_total Memory scans recorded
# TYPE memory_scans_total counter
memory_scans_total {}
# HELP memory_edits_total Memory edits applied
# TYPE memory_edits_total counter
memory_edits_total {}
# HELP errors_total Total errors
# TYPE errors_total counter
errors_total {}
"#,
            self.http_requests_total.load(Ordering::Relaxed),
            self.http_request_duration_sum.load(Ordering::Relaxed) as f64 / 1000.0,
            self.http_requests_total.load(Ordering::Relaxed),
            self.targets_connected_total.load(Ordering::Relaxed),
            self.automation_runs_total.load(Ordering::Relaxed),
            self.automation_actions_total.load(Ordering::Relaxed),
            self.automation_action_failures_total.load(Ordering::Relaxed),
            automation_contexts,
            telemetry_streams,
            self.telemetry_snapshots_total.load(Ordering::Relaxed),
            self.memory_scans_total.load(Ordering::Relaxed),
            self.memory_edits_total.load(Ordering::Relaxed),
            self.errors_total.load(Ordering::Relaxed),
        )
    }
}

// ===== Health Check =====

/// 健康检查状态
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime_seconds: f64,
}

/// 可观测性状态
#[derive(Clone)]
pub struct ObservabilityState {
    pub metrics: Arc<AppMetrics>,
    pub start_time: DateTime<Utc>,
    pub version: String,
    gauges: Arc<dyn Fn() -> (usize, usize) + Send + Sync>,
}

impl ObservabilityState {
    /// `gauges` 返回 (遥测订阅数, 自动化执行上下文数)
    pub fn new(
        version: String,
        metrics: Arc<AppMetrics>,
        gauges: Arc<dyn Fn() -> (usize, usize) + Send + Sync>,
    ) -> Self {
        Self {
            metrics,
            start_time: Utc::now(),
            version,
            gauges,
        }
    }

    /// 获取应用正常运行时间
    pub fn uptime_seconds(&self) -> f64 {
        (Utc::now() - self.start_time).num_seconds() as f64
    }
}

// ===== Health Check Handlers =====

/// 获取健康状态
pub async fn health_check(
    state: axum::extract::State<Arc<ObservabilityState>>,
) -> impl IntoResponse {
    Json(HealthStatus {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        version: state.version.clone(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// 简单存活检查
pub async fn liveness() -> impl IntoResponse {
    "OK"
}

/// Prometheus 指标端点
pub async fn metrics(state: axum::extract::State<Arc<ObservabilityState>>) -> impl IntoResponse {
    let (streams, contexts) = (state.gauges)();
    let output = state.metrics.gather(streams, contexts);
    (axum::http::StatusCode::OK, output)
}

/// 版本信息端点
pub async fn version(state: axum::extract::State<Arc<ObservabilityState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "version": state.version,
        "uptime_seconds": state.uptime_seconds(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// 创建可观测性路由
pub fn create_observability_router(state: Arc<ObservabilityState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
        .route("/metrics", get(metrics))
        .route("/version", get(version))
        .with_state(state)
}

// ===== Structured Logging =====

/// 初始化日志
///
/// `RUST_LOG` 优先于配置中的级别；`structured` 为 true 时输出 JSON。
pub fn init_tracing(config: &LoggingConfig) -> Result<(), String> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("{},procpilot={}", config.level, config.level)))
        .map_err(|e| e.to_string())?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_line_number(true);

    if config.structured {
        builder.json().try_init().map_err(|e| e.to_string())
    } else {
        builder.try_init().map_err(|e| e.to_string())
    }
}

// ===== Request Metrics Middleware =====

/// 记录请求指标的中间件
pub async fn metrics_middleware(
    axum::extract::State(metrics): axum::extract::State<Arc<AppMetrics>>,
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let start = std::time::Instant::now();

    let response = next.run(req).await;

    metrics.record_http_request(start.elapsed().as_millis() as u64);
    if response.status().is_server_error() {
        metrics.record_error();
    }

    response
}
