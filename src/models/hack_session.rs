use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 能力会话状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HackSessionStatus {
    #[default]
    Active,
    Ended,
}

/// 能力开关
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    UnlimitedResources,
    SpeedBoost,
    AutoAim,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::UnlimitedResources => "unlimited_resources",
            Capability::SpeedBoost => "speed_boost",
            Capability::AutoAim => "auto_aim",
        }
    }
}

/// 能力会话审计记录，创建后不再修改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HackSession {
    pub id: String,
    /// 目标进程名
    pub game_name: String,
    pub pid: u32,
    pub tools_enabled: Vec<Capability>,
    pub status: HackSessionStatus,
    pub created_at: DateTime<Utc>,
}

impl HackSession {
    pub fn new(game_name: &str, pid: u32, tools_enabled: Vec<Capability>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            game_name: game_name.to_string(),
            pid,
            tools_enabled,
            status: HackSessionStatus::Active,
            created_at: Utc::now(),
        }
    }
}
