//! Status Routes
//!
//! 问候、服务状态与会话日志。

use axum::{Router, routing::get};

use crate::api::app_state::AppState;
use crate::api::handlers::status_handler::*;

pub fn create_status_router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/status", get(status))
        .route("/sessions", get(list_sessions))
}
