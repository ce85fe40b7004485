use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 目标进程连接状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetStatus {
    /// 已被枚举器检测到
    #[default]
    Detected,
    /// 已通过 connect 显式连接
    Connected,
    /// 探针报告进程已不存在
    Disconnected,
}

/// 目标进程
///
/// 以 pid 为唯一键，重复检测时按 upsert 语义更新。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    /// 进程标识
    pub pid: u32,
    /// 进程名
    pub name: String,
    /// 可执行文件路径
    pub exe_path: String,
    /// 连接状态
    pub status: TargetStatus,
    /// 首次记录时间
    pub created_at: DateTime<Utc>,
    /// 最后一次检测或状态变化时间
    pub last_seen_at: DateTime<Utc>,
    /// 最近一次连接时间
    pub connected_at: Option<DateTime<Utc>>,
}

impl Target {
    /// 创建新检测到的目标
    pub fn detected(pid: u32, name: &str, exe_path: &str) -> Self {
        let now = Utc::now();
        Self {
            pid,
            name: name.to_string(),
            exe_path: exe_path.to_string(),
            status: TargetStatus::Detected,
            created_at: now,
            last_seen_at: now,
            connected_at: None,
        }
    }

    /// 合并一次新的检测结果，已连接的目标保持连接状态
    pub fn merge_detection(&mut self, detected: &Target) {
        self.name = detected.name.clone();
        self.exe_path = detected.exe_path.clone();
        self.last_seen_at = detected.last_seen_at;
        if self.status != TargetStatus::Connected {
            self.status = TargetStatus::Detected;
        }
    }

    pub fn mark_connected(&mut self) {
        let now = Utc::now();
        self.status = TargetStatus::Connected;
        self.last_seen_at = now;
        self.connected_at = Some(now);
    }

    pub fn mark_disconnected(&mut self) {
        self.status = TargetStatus::Disconnected;
        self.last_seen_at = Utc::now();
    }
}

/// 进程内存占用（字节）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct MemoryUsage {
    /// 常驻内存
    pub rss: u64,
    /// 虚拟内存
    pub vms: u64,
}

/// 进程资源使用快照
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessStats {
    pub name: String,
    pub cpu_percent: f64,
    pub memory_info: MemoryUsage,
    pub num_threads: u32,
    /// 运行状态，例如 "running"、"sleeping"
    pub status: String,
}

/// connect 返回的目标信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetInfo {
    pub pid: u32,
    pub name: String,
    pub status: TargetStatus,
    pub memory_info: MemoryUsage,
    pub cpu_percent: f64,
    pub connected_at: DateTime<Utc>,
}

impl TargetInfo {
    pub fn from_stats(pid: u32, stats: &ProcessStats) -> Self {
        Self {
            pid,
            name: stats.name.clone(),
            status: TargetStatus::Connected,
            memory_info: stats.memory_info,
            cpu_percent: stats.cpu_percent,
            connected_at: Utc::now(),
        }
    }
}
