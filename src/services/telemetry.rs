//! 遥测服务
//!
//! 每个订阅一个采样任务，任务生命周期与订阅句柄绑定：句柄被丢弃即取消任务。
//! 同一订阅上的探针调用严格串行，慢探针只会推迟下一次采样。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use crate::config::config::TelemetryConfig;
use crate::models::MemoryUsage;
use crate::observability::AppMetrics;
use crate::services::target_registry::TargetRegistry;

pub const NOT_CONNECTED: &str = "Process not connected";
pub const PROCESS_GONE: &str = "Process no longer exists";

/// 单次采样
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelemetrySnapshot {
    /// 从 1 开始，每个快照加一
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub cpu_percent: f64,
    pub memory_info: MemoryUsage,
    pub status: String,
    pub num_threads: u32,
}

/// 推送给订阅者的事件
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TelemetryEvent {
    Snapshot(TelemetrySnapshot),
    /// 终止通知，之后不再有事件
    Error { error: String },
}

impl TelemetryEvent {
    fn terminal(message: &str) -> Self {
        TelemetryEvent::Error {
            error: message.to_string(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TelemetryEvent::Error { .. })
    }
}

/// 订阅句柄
pub struct TelemetrySubscription {
    pid: u32,
    rx: mpsc::Receiver<TelemetryEvent>,
    _cancel: DropGuard,
}

impl TelemetrySubscription {
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// 下一个事件；流结束后返回 None
    pub async fn next(&mut self) -> Option<TelemetryEvent> {
        self.rx.recv().await
    }
}

pub struct TelemetryService {
    registry: Arc<TargetRegistry>,
    metrics: Arc<AppMetrics>,
    tick: Duration,
    capacity: usize,
    active_streams: Arc<AtomicUsize>,
}

impl TelemetryService {
    pub fn new(registry: Arc<TargetRegistry>, metrics: Arc<AppMetrics>, config: &TelemetryConfig) -> Self {
        Self {
            registry,
            metrics,
            tick: Duration::from_millis(config.tick_interval_ms.max(1)),
            capacity: config.channel_capacity.max(1),
            active_streams: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 正在运行的采样任务数
    pub fn active_streams(&self) -> usize {
        self.active_streams.load(Ordering::SeqCst)
    }

    /// 打开订阅，第一次采样立即进行
    pub fn subscribe(&self, pid: u32) -> TelemetrySubscription {
        let (tx, rx) = mpsc::channel(self.capacity);
        let cancel = CancellationToken::new();

        self.active_streams.fetch_add(1, Ordering::SeqCst);
        let sampler = Sampler {
            pid,
            registry: self.registry.clone(),
            metrics: self.metrics.clone(),
            tick: self.tick,
            tx,
            cancel: cancel.clone(),
            seq: 0,
            last_timestamp: None,
        };
        let active_streams = self.active_streams.clone();
        tokio::spawn(async move {
            sampler.run().await;
            active_streams.fetch_sub(1, Ordering::SeqCst);
        });

        info!(pid, "telemetry subscription opened");
        TelemetrySubscription {
            pid,
            rx,
            _cancel: cancel.drop_guard(),
        }
    }
}

struct Sampler {
    pid: u32,
    registry: Arc<TargetRegistry>,
    metrics: Arc<AppMetrics>,
    tick: Duration,
    tx: mpsc::Sender<TelemetryEvent>,
    cancel: CancellationToken,
    seq: u64,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Sampler {
    async fn run(mut self) {
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = self.tx.closed() => break,
                _ = interval.tick() => {}
            }

            if !self.registry.is_connected(self.pid) {
                self.send(TelemetryEvent::terminal(NOT_CONNECTED)).await;
                break;
            }

            let probed = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                probed = self.registry.probe().probe(self.pid) => probed,
            };

            match probed {
                Ok(Some(stats)) => {
                    self.seq += 1;
                    let snapshot = TelemetrySnapshot {
                        seq: self.seq,
                        timestamp: self.next_timestamp(),
                        cpu_percent: stats.cpu_percent,
                        memory_info: stats.memory_info,
                        status: stats.status,
                        num_threads: stats.num_threads,
                    };
                    if !self.send(TelemetryEvent::Snapshot(snapshot)).await {
                        break;
                    }
                    self.metrics.record_snapshot();
                }
                Ok(None) => {
                    self.registry.mark_disconnected(self.pid).await;
                    self.send(TelemetryEvent::terminal(PROCESS_GONE)).await;
                    break;
                }
                Err(e) => {
                    warn!(pid = self.pid, error = %e, "telemetry probe failed, skipping tick");
                }
            }
        }

        info!(pid = self.pid, snapshots = self.seq, "telemetry subscription closed");
    }

    /// 发送事件，订阅者已离开时返回 false
    async fn send(&self, event: TelemetryEvent) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.tx.send(event) => sent.is_ok(),
        }
    }

    /// 严格递增的时间戳，墙上时钟回拨时顺延 1 微秒
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let timestamp = match self.last_timestamp {
            Some(last) if now <= last => {
                debug!(pid = self.pid, "wall clock did not advance, nudging timestamp");
                last + chrono::Duration::microseconds(1)
            }
            _ => now,
        };
        self.last_timestamp = Some(timestamp);
        timestamp
    }
}
