//! 目标进程注册表
//!
//! 记录检测到的进程，维护"已连接"集合，供自动化与遥测读取。

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::backend::{ProcessEnumerator, ProcessProbe};
use crate::error::{AppError, Result};
use crate::models::{Target, TargetInfo};
use crate::observability::AppMetrics;
use crate::storage::TargetRepository;

pub struct TargetRegistry {
    repository: Arc<TargetRepository>,
    enumerator: Arc<dyn ProcessEnumerator>,
    probe: Arc<dyn ProcessProbe>,
    metrics: Arc<AppMetrics>,
    /// 已连接目标的连接时快照
    connected: DashMap<u32, TargetInfo>,
    /// 串行化 targets 表上的读-改-写
    write_lock: Mutex<()>,
}

impl TargetRegistry {
    pub fn new(
        repository: Arc<TargetRepository>,
        enumerator: Arc<dyn ProcessEnumerator>,
        probe: Arc<dyn ProcessProbe>,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            repository,
            enumerator,
            probe,
            metrics,
            connected: DashMap::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// 进程探针，遥测每个周期都会使用
    pub fn probe(&self) -> &Arc<dyn ProcessProbe> {
        &self.probe
    }

    /// 枚举匹配关键字的进程并逐个 upsert
    ///
    /// 单条记录的存储失败只记录日志，不影响返回结果。
    pub async fn detect(&self, keywords: &[String]) -> Result<Vec<Target>> {
        let entries = self.enumerator.enumerate(keywords).await?;
        let mut targets = Vec::with_capacity(entries.len());

        for entry in entries {
            let detected = Target::detected(entry.pid, &entry.name, &entry.exe_path);
            match self.upsert_detected(&detected).await {
                Ok(stored) => targets.push(stored),
                Err(e) => {
                    warn!(pid = entry.pid, error = %e, "failed to record detected target");
                    targets.push(detected);
                }
            }
        }

        debug!(count = targets.len(), "detected targets");
        Ok(targets)
    }

    /// 按 pid 幂等插入或更新，已连接的目标保持 connected
    pub async fn upsert_detected(&self, target: &Target) -> Result<Target> {
        let _guard = self.write_lock.lock().await;
        let id = target.pid.to_string();

        let merged = match self.repository.get_by_id(&id).await? {
            Some(mut existing) => {
                existing.merge_detection(target);
                existing
            }
            None => target.clone(),
        };

        self.repository.upsert(&id, &merged).await
    }

    /// 连接目标进程
    pub async fn connect(&self, pid: u32) -> Result<TargetInfo> {
        let stats = self
            .probe
            .probe(pid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Process not found: {}", pid)))?;

        let info = TargetInfo::from_stats(pid, &stats);

        {
            let _guard = self.write_lock.lock().await;
            let id = pid.to_string();
            let mut target = self
                .repository
                .get_by_id(&id)
                .await?
                .unwrap_or_else(|| Target::detected(pid, &stats.name, "Unknown"));
            target.name = stats.name.clone();
            target.mark_connected();
            self.repository.upsert(&id, &target).await?;
            self.connected.insert(pid, info.clone());
        }

        self.metrics.record_connect();
        info!(pid, name = %info.name, "connected to process");
        Ok(info)
    }

    /// 是否已连接（只读，不阻塞）
    pub fn is_connected(&self, pid: u32) -> bool {
        self.connected.contains_key(&pid)
    }

    /// 连接时的目标信息
    pub fn connected_info(&self, pid: u32) -> Option<TargetInfo> {
        self.connected.get(&pid).map(|entry| entry.value().clone())
    }

    pub fn connected_count(&self) -> usize {
        self.connected.len()
    }

    /// 标记目标已断开，可重复调用
    pub async fn mark_disconnected(&self, pid: u32) {
        let _guard = self.write_lock.lock().await;
        let was_connected = self.connected.remove(&pid).is_some();
        let id = pid.to_string();
        let result = match self.repository.get_by_id(&id).await {
            Ok(Some(mut target)) => {
                target.mark_disconnected();
                self.repository.update(&id, &target).await.map(|_| ())
            }
            Ok(None) => Ok(()),
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            warn!(pid, error = %e, "failed to persist disconnected status");
        }
        if was_connected {
            info!(pid, "process disconnected");
        }
    }

    /// 列出已知目标
    pub async fn list(&self, limit: usize) -> Result<Vec<Target>> {
        self.repository.list(limit, 0).await
    }
}
