use async_trait::async_trait;
use tracing::debug;

use crate::config::config::MemoryConfig;
use crate::error::Result;
use crate::models::{ScanHit, TypedValue};

/// 内存后端
///
/// 实际的进程内存读写由实现者负责，上层只依赖这两个操作的契约。
#[async_trait]
pub trait MemoryBackend: Send + Sync {
    /// 扫描与 `value` 匹配的位置
    async fn scan(&self, pid: u32, value: &TypedValue) -> Result<Vec<ScanHit>>;

    /// 向指定位置写入值
    async fn write(&self, pid: u32, location: &str, value: &TypedValue) -> Result<()>;
}

/// 模拟内存后端：每次扫描在固定地址区间内生成若干命中，写入总是成功
#[derive(Debug, Clone)]
pub struct SimulatedMemoryBackend {
    hits: usize,
    base_address: u64,
    stride: u64,
}

impl SimulatedMemoryBackend {
    pub fn new(hits: usize, base_address: u64, stride: u64) -> Self {
        Self {
            hits,
            base_address,
            stride,
        }
    }

    pub fn from_config(config: &MemoryConfig) -> Self {
        Self::new(
            config.simulated_hits,
            config.base_address,
            config.address_stride,
        )
    }

    fn location(&self, index: usize) -> String {
        format!("0x{:X}", self.base_address + index as u64 * self.stride)
    }
}

#[async_trait]
impl MemoryBackend for SimulatedMemoryBackend {
    async fn scan(&self, pid: u32, value: &TypedValue) -> Result<Vec<ScanHit>> {
        debug!(pid, value = %value, hits = self.hits, "simulated memory scan");
        Ok((0..self.hits)
            .map(|i| ScanHit {
                location: self.location(i),
                value: value.clone(),
            })
            .collect())
    }

    async fn write(&self, pid: u32, location: &str, value: &TypedValue) -> Result<()> {
        debug!(pid, location, value = %value, "simulated memory write");
        Ok(())
    }
}
