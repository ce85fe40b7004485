use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ActionScript, HackSession, MemoryAddress, Target};

/// 可存储记录
pub trait StoredRecord: Clone + Send + Sync + 'static {
    /// 主键
    fn record_id(&self) -> String;

    /// 所属目标进程（用于按目标过滤）
    fn target_pid(&self) -> Option<u32> {
        None
    }

    /// 地址（用于按 (pid, address) 查找）
    fn location(&self) -> Option<&str> {
        None
    }
}

impl StoredRecord for Target {
    fn record_id(&self) -> String {
        self.pid.to_string()
    }

    fn target_pid(&self) -> Option<u32> {
        Some(self.pid)
    }
}

impl StoredRecord for MemoryAddress {
    fn record_id(&self) -> String {
        self.id.clone()
    }

    fn target_pid(&self) -> Option<u32> {
        Some(self.pid)
    }

    fn location(&self) -> Option<&str> {
        Some(&self.address)
    }
}

impl StoredRecord for ActionScript {
    fn record_id(&self) -> String {
        self.id.clone()
    }
}

impl StoredRecord for HackSession {
    fn record_id(&self) -> String {
        self.id.clone()
    }

    fn target_pid(&self) -> Option<u32> {
        Some(self.pid)
    }
}

/// 仓储 trait
///
/// 列表方法按插入顺序（即创建顺序）返回。
#[async_trait]
pub trait Repository<T: Clone + Send + Sync>: Send + Sync {
    /// 创建实体，主键重复时返回存储错误
    async fn create(&self, entity: &T) -> Result<T>;

    /// 批量创建
    async fn create_many(&self, entities: &[T]) -> Result<Vec<T>> {
        let mut created = Vec::with_capacity(entities.len());
        for entity in entities {
            created.push(self.create(entity).await?);
        }
        Ok(created)
    }

    /// 根据 ID 获取实体
    async fn get_by_id(&self, id: &str) -> Result<Option<T>>;

    /// 更新实体，不存在时返回 None
    async fn update(&self, id: &str, entity: &T) -> Result<Option<T>>;

    /// 插入或替换
    async fn upsert(&self, id: &str, entity: &T) -> Result<T>;

    /// 列出实体
    async fn list(&self, limit: usize, start: usize) -> Result<Vec<T>>;

    /// 统计数量
    async fn count(&self) -> Result<u64>;

    // === 目标过滤方法 ===

    /// 按目标进程列出实体
    async fn list_by_target(&self, _pid: u32, _limit: usize, _start: usize) -> Result<Vec<T>> {
        Ok(vec![])
    }

    /// 按目标进程统计数量
    async fn count_by_target(&self, _pid: u32) -> Result<u64> {
        Ok(0)
    }

    /// 查找 (pid, location) 上最新创建的实体
    async fn find_by_location(&self, _pid: u32, _location: &str) -> Result<Option<T>> {
        Ok(None)
    }
}

pub type TargetRepository = dyn Repository<Target>;
pub type AddressRepository = dyn Repository<MemoryAddress>;
pub type ScriptRepository = dyn Repository<ActionScript>;
pub type HackSessionRepository = dyn Repository<HackSession>;
