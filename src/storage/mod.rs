//! 存储层模块
//!
//! 提供数据持久化抽象与内存实现。

pub mod memory;
pub mod repository;

pub use memory::InMemoryRepository;
pub use repository::{
    AddressRepository, HackSessionRepository, Repository, ScriptRepository, StoredRecord,
    TargetRepository,
};
