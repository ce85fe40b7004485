//! Handlers 模块
//!
//! 定义 API 请求处理器。

pub mod automation_handler;
pub mod hack_handler;
pub mod memory_handler;
pub mod process_handler;
pub mod status_handler;
