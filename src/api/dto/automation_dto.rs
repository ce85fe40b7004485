//! 自动化 DTO

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Action;
use crate::services::{EngineState, RunHandle};

/// 启动脚本请求
#[derive(Debug, Deserialize)]
pub struct StartAutomationRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub actions: Vec<Action>,
}

/// 启动脚本响应
#[derive(Debug, Serialize, Deserialize)]
pub struct StartAutomationResponse {
    pub message: String,
    pub script_id: String,
    pub run_id: String,
    pub started_at: DateTime<Utc>,
}

impl From<RunHandle> for StartAutomationResponse {
    fn from(handle: RunHandle) -> Self {
        Self {
            message: "Automation started successfully".to_string(),
            script_id: handle.script_id,
            run_id: handle.run_id,
            started_at: handle.started_at,
        }
    }
}

/// 停止响应
#[derive(Debug, Serialize, Deserialize)]
pub struct StopAutomationResponse {
    pub message: String,
    /// 是否确实停止了一次运行
    pub stopped: bool,
}

/// 引擎状态响应
#[derive(Debug, Serialize, Deserialize)]
pub struct AutomationStatusResponse {
    pub state: EngineState,
    pub active: bool,
    pub run: Option<RunHandle>,
}
