//! Automation Routes

use axum::{
    Router,
    routing::{get, post},
};

use crate::api::app_state::AppState;
use crate::api::handlers::automation_handler::*;

pub fn create_automation_router() -> Router<AppState> {
    Router::new()
        .route("/automation/start", post(start_automation))
        .route("/automation/stop", post(stop_automation))
        .route("/automation/status", get(automation_status))
        .route("/automation/scripts", get(list_scripts))
}
