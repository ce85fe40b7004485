use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::error::{AppError, Result};

fn default_coordinate() -> i32 {
    100
}

fn default_key() -> String {
    "space".to_string()
}

fn default_wait_seconds() -> f64 {
    1.0
}

/// 脚本动作
///
/// 线上格式以 `type` 字段作为标签，未知标签反序列化为 [`Action::Unknown`]，
/// 执行时跳过。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    /// 在屏幕坐标处点击
    Click {
        #[serde(default = "default_coordinate")]
        x: i32,
        #[serde(default = "default_coordinate")]
        y: i32,
    },
    /// 按下单个按键
    #[serde(alias = "keypress")]
    Key {
        #[serde(default = "default_key")]
        key: String,
    },
    /// 输入一段文本
    Type {
        #[serde(default)]
        text: String,
    },
    /// 等待若干秒
    Wait {
        #[serde(default = "default_wait_seconds")]
        duration: f64,
    },
    #[serde(other)]
    Unknown,
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Click { .. } => "click",
            Action::Key { .. } => "key",
            Action::Type { .. } => "type",
            Action::Wait { .. } => "wait",
            Action::Unknown => "unknown",
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Action::Wait { duration } = self {
            if !duration.is_finite() || *duration < 0.0 {
                return Err(AppError::Validation(format!(
                    "wait duration must be a non-negative number of seconds, got {}",
                    duration
                )));
            }
            if Duration::try_from_secs_f64(*duration).is_err() {
                return Err(AppError::Validation(format!(
                    "wait duration {} is too large",
                    duration
                )));
            }
        }
        Ok(())
    }

    /// wait 动作的时长
    pub fn wait_duration(&self) -> Option<Duration> {
        match self {
            Action::Wait { duration } => Duration::try_from_secs_f64(duration.max(0.0)).ok(),
            _ => None,
        }
    }
}

/// 自动化脚本
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionScript {
    /// 脚本唯一标识
    pub id: String,
    /// 名称
    pub name: String,
    /// 描述
    pub description: String,
    /// 有序动作序列，提交运行后不可变
    pub actions: Vec<Action>,
    /// 是否正在运行
    pub active: bool,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl ActionScript {
    pub fn new(name: &str, description: &str, actions: Vec<Action>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            actions,
            active: false,
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.actions.iter().try_for_each(Action::validate)
    }
}
