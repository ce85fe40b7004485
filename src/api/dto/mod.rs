//! DTO 模块
//!
//! 定义 API 请求和响应数据结构。

pub mod automation_dto;
pub mod hack_dto;
pub mod memory_dto;
pub mod process_dto;
pub mod status_dto;
