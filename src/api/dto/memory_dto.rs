//! 内存 DTO
//!
//! 扫描、编辑与历史查询的请求和响应。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::MemoryAddress;

fn default_data_type() -> String {
    "int".to_string()
}

/// 扫描请求
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub pid: u32,
    /// 待搜索的值，按 `data_type` 解析
    pub value: Value,
    /// int / float / string / bytes
    #[serde(default = "default_data_type")]
    pub data_type: String,
}

/// 扫描响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ScanResponse {
    pub message: String,
    pub addresses: Vec<MemoryAddress>,
}

/// 编辑请求
#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub pid: u32,
    /// 地址，例如 "0x1000000"
    pub address: String,
    pub new_value: Value,
    #[serde(default = "default_data_type")]
    pub data_type: String,
}

/// 编辑响应
#[derive(Debug, Serialize, Deserialize)]
pub struct EditResponse {
    pub message: String,
    pub address: MemoryAddress,
}

/// 历史查询参数
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HistoryParams {
    /// 起始偏移
    pub cursor: Option<usize>,
    /// 单页数量，上限为配置的页大小
    pub limit: Option<usize>,
}
