//! 内存地址存储服务
//!
//! 扫描结果只追加，编辑只原地修改已有记录；历史按创建顺序分页读取。

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::backend::MemoryBackend;
use crate::error::{AppError, Result};
use crate::models::{MemoryAddress, TypedValue, WriteState};
use crate::observability::AppMetrics;
use crate::services::target_registry::TargetRegistry;
use crate::storage::AddressRepository;

/// 历史记录分页结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPage {
    pub items: Vec<MemoryAddress>,
    /// 下一页的起始偏移，已到末尾时为 None
    pub next_cursor: Option<usize>,
    pub total: u64,
}

pub struct MemoryStore {
    repository: Arc<AddressRepository>,
    backend: Arc<dyn MemoryBackend>,
    registry: Arc<TargetRegistry>,
    metrics: Arc<AppMetrics>,
    page_size: usize,
    /// 每个目标一把编辑锁，串行化同一目标上的读-改-写
    edit_locks: DashMap<u32, Arc<Mutex<()>>>,
}

impl MemoryStore {
    pub fn new(
        repository: Arc<AddressRepository>,
        backend: Arc<dyn MemoryBackend>,
        registry: Arc<TargetRegistry>,
        metrics: Arc<AppMetrics>,
        page_size: usize,
    ) -> Self {
        Self {
            repository,
            backend,
            registry,
            metrics,
            page_size: page_size.max(1),
            edit_locks: DashMap::new(),
        }
    }

    fn ensure_connected(&self, pid: u32) -> Result<()> {
        if self.registry.is_connected(pid) {
            Ok(())
        } else {
            Err(AppError::NotConnected(pid))
        }
    }

    fn edit_lock(&self, pid: u32) -> Arc<Mutex<()>> {
        self.edit_locks
            .entry(pid)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 记录一次扫描
    ///
    /// 每个命中都作为新记录追加，同一批次共享 scan_id。
    pub async fn record_scan_results(
        &self,
        pid: u32,
        value: &TypedValue,
    ) -> Result<Vec<MemoryAddress>> {
        self.ensure_connected(pid)?;

        let hits = self.backend.scan(pid, value).await?;
        let scan_id = Uuid::new_v4().to_string();
        let addresses: Vec<MemoryAddress> = hits
            .into_iter()
            .enumerate()
            .map(|(i, hit)| {
                MemoryAddress::from_scan(
                    pid,
                    &scan_id,
                    hit,
                    Some(format!("Memory location {}", i + 1)),
                )
            })
            .collect();

        let created = self.repository.create_many(&addresses).await?;
        self.metrics.record_scan();
        info!(
            pid,
            scan_id = %scan_id,
            data_type = %value.value_type(),
            found = created.len(),
            "memory scan recorded"
        );
        Ok(created)
    }

    /// 修改 (pid, location) 上最新的一条记录
    ///
    /// 先记录意图值，再交给后端写入；后端失败时记录 write_failed 并返回错误。
    pub async fn apply_edit(
        &self,
        pid: u32,
        location: &str,
        new_value: TypedValue,
    ) -> Result<MemoryAddress> {
        self.ensure_connected(pid)?;

        let lock = self.edit_lock(pid);
        let _guard = lock.lock().await;

        let mut address = self
            .repository
            .find_by_location(pid, location)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No memory address {} for process {}", location, pid))
            })?;

        address.apply_value(new_value);
        self.repository.update(&address.id, &address).await?;

        let write_result = self.backend.write(pid, location, &address.value).await;
        address.write_state = match write_result {
            Ok(()) => WriteState::Written,
            Err(_) => WriteState::WriteFailed,
        };
        self.repository.update(&address.id, &address).await?;
        self.metrics.record_edit();

        match write_result {
            Ok(()) => {
                info!(pid, location, value = %address.value, "memory edited");
                Ok(address)
            }
            Err(e) => {
                warn!(pid, location, error = %e, "memory write failed, intended value recorded");
                Err(e)
            }
        }
    }

    /// 读取目标的历史记录
    pub async fn history(&self, pid: u32, cursor: usize, limit: Option<usize>) -> Result<HistoryPage> {
        let limit = limit.unwrap_or(self.page_size).clamp(1, self.page_size);
        let items = self.repository.list_by_target(pid, limit, cursor).await?;
        let total = self.repository.count_by_target(pid).await?;

        let end = cursor + items.len();
        let next_cursor = if (end as u64) < total && !items.is_empty() {
            Some(end)
        } else {
            None
        };

        Ok(HistoryPage {
            items,
            next_cursor,
            total,
        })
    }
}
