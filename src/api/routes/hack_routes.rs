//! Hack Routes

use axum::{Router, routing::post};

use crate::api::app_state::AppState;
use crate::api::handlers::hack_handler::*;

pub fn create_hack_router() -> Router<AppState> {
    Router::new()
        .route("/hacks/unlimited-resources", post(unlimited_resources))
        .route("/hacks/speed-boost", post(speed_boost))
        .route("/hacks/auto-aim", post(auto_aim))
}
