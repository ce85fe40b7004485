//! 数据模型模块
//!
//! 目标进程、内存地址、自动化脚本与能力会话。

pub mod automation;
pub mod hack_session;
pub mod memory_address;
pub mod target;

pub use automation::{Action, ActionScript};
pub use hack_session::{Capability, HackSession, HackSessionStatus};
pub use memory_address::{MemoryAddress, ScanHit, TypedValue, ValueType, WriteState};
pub use target::{MemoryUsage, ProcessStats, Target, TargetInfo, TargetStatus};
