//! procpilot - 远程进程控制服务
//!
//! 检测并连接目标进程，记录内存扫描与编辑，在独立执行上下文中循环运行
//! 输入自动化脚本，并通过 WebSocket 推送进程遥测。

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;
pub mod websocket;
