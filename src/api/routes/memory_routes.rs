//! Memory Routes
//!
//! 内存扫描、编辑与历史。

use axum::{
    Router,
    routing::{get, post},
};

use crate::api::app_state::AppState;
use crate::api::handlers::memory_handler::*;

pub fn create_memory_router() -> Router<AppState> {
    Router::new()
        .route("/memory/scan", post(scan_memory))
        .route("/memory/edit", post(edit_memory))
        .route("/memory/history/:pid", get(memory_history))
}
