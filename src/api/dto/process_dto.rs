//! 进程 DTO

use serde::{Deserialize, Serialize};

use crate::models::TargetInfo;

/// 连接进程响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectResponse {
    pub message: String,
    pub process_info: TargetInfo,
}
