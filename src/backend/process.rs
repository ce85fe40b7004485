use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::ProcessStats;

/// 枚举器返回的进程条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
    pub exe_path: String,
}

/// 进程枚举器
#[async_trait]
pub trait ProcessEnumerator: Send + Sync {
    /// 列出进程名包含任一关键字的运行中进程
    async fn enumerate(&self, keywords: &[String]) -> Result<Vec<ProcessEntry>>;
}

/// 进程探针
#[async_trait]
pub trait ProcessProbe: Send + Sync {
    /// 进程不存在时返回 `Ok(None)`
    async fn probe(&self, pid: u32) -> Result<Option<ProcessStats>>;
}

/// 关键字匹配（不区分大小写），空关键字列表匹配所有进程
pub fn matches_keywords(name: &str, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let name = name.to_lowercase();
    keywords
        .iter()
        .any(|keyword| name.contains(&keyword.to_lowercase()))
}
