//! 内存表实现

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::{AppError, Result};
use crate::storage::repository::{Repository, StoredRecord};

struct Table<T> {
    rows: Vec<T>,
    index: HashMap<String, usize>,
}

/// 基于内存的仓储实现
///
/// 行按插入顺序保存，只追加不删除，写操作在表级写锁内串行化。
pub struct InMemoryRepository<T> {
    table: RwLock<Table<T>>,
    name: &'static str,
}

impl<T: StoredRecord> InMemoryRepository<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            table: RwLock::new(Table {
                rows: Vec::new(),
                index: HashMap::new(),
            }),
            name,
        }
    }
}

#[async_trait]
impl<T: StoredRecord> Repository<T> for InMemoryRepository<T> {
    async fn create(&self, entity: &T) -> Result<T> {
        let id = entity.record_id();
        let mut table = self.table.write();
        if table.index.contains_key(&id) {
            return Err(AppError::Store(format!(
                "duplicate key {} in {}",
                id, self.name
            )));
        }
        let position = table.rows.len();
        table.rows.push(entity.clone());
        table.index.insert(id, position);
        Ok(entity.clone())
    }

    async fn create_many(&self, entities: &[T]) -> Result<Vec<T>> {
        let mut table = self.table.write();
        let mut seen = std::collections::HashSet::new();
        for entity in entities {
            let id = entity.record_id();
            if table.index.contains_key(&id) || !seen.insert(id.clone()) {
                return Err(AppError::Store(format!(
                    "duplicate key {} in {}",
                    id, self.name
                )));
            }
        }
        for entity in entities {
            let position = table.rows.len();
            table.rows.push(entity.clone());
            table.index.insert(entity.record_id(), position);
        }
        Ok(entities.to_vec())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<T>> {
        let table = self.table.read();
        Ok(table.index.get(id).map(|&i| table.rows[i].clone()))
    }

    async fn update(&self, id: &str, entity: &T) -> Result<Option<T>> {
        let mut table = self.table.write();
        match table.index.get(id).copied() {
            Some(position) => {
                table.rows[position] = entity.clone();
                Ok(Some(entity.clone()))
            }
            None => Ok(None),
        }
    }

    async fn upsert(&self, id: &str, entity: &T) -> Result<T> {
        let mut table = self.table.write();
        match table.index.get(id).copied() {
            Some(position) => table.rows[position] = entity.clone(),
            None => {
                let position = table.rows.len();
                table.rows.push(entity.clone());
                table.index.insert(id.to_string(), position);
            }
        }
        Ok(entity.clone())
    }

    async fn list(&self, limit: usize, start: usize) -> Result<Vec<T>> {
        let table = self.table.read();
        Ok(table.rows.iter().skip(start).take(limit).cloned().collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.table.read().rows.len() as u64)
    }

    async fn list_by_target(&self, pid: u32, limit: usize, start: usize) -> Result<Vec<T>> {
        let table = self.table.read();
        Ok(table
            .rows
            .iter()
            .filter(|row| row.target_pid() == Some(pid))
            .skip(start)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_by_target(&self, pid: u32) -> Result<u64> {
        let table = self.table.read();
        Ok(table
            .rows
            .iter()
            .filter(|row| row.target_pid() == Some(pid))
            .count() as u64)
    }

    async fn find_by_location(&self, pid: u32, location: &str) -> Result<Option<T>> {
        let table = self.table.read();
        Ok(table
            .rows
            .iter()
            .rev()
            .find(|row| row.target_pid() == Some(pid) && row.location() == Some(location))
            .cloned())
    }
}
