//! Process Routes
//!
//! 进程检测与连接。

use axum::{
    Router,
    routing::{get, post},
};

use crate::api::app_state::AppState;
use crate::api::handlers::process_handler::*;

pub fn create_process_router() -> Router<AppState> {
    Router::new()
        .route("/processes", get(list_processes))
        .route("/processes/:pid/connect", post(connect_process))
}
