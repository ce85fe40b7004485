//! 服务状态 DTO

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::EngineState;

/// 通用消息响应
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// 服务状态
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub connected_processes: usize,
    pub automation_active: bool,
    pub automation_state: EngineState,
    pub telemetry_streams: usize,
    pub timestamp: DateTime<Utc>,
}
