//! Routes 模块
//!
//! 定义 API 路由。

pub mod automation_routes;
pub mod hack_routes;
pub mod memory_routes;
pub mod process_routes;
pub mod status_routes;
