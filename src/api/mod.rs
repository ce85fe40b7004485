//! API 模块
//!
//! 提供 REST API 支持。

pub mod app_state;
pub mod dto;
pub mod handlers;
pub mod routes;

use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::app_state::AppState;
use crate::observability::metrics_middleware;

pub fn create_router(app_state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::status_routes::create_status_router())
        .merge(routes::process_routes::create_process_router())
        .merge(routes::memory_routes::create_memory_router())
        .merge(routes::automation_routes::create_automation_router())
        .merge(routes::hack_routes::create_hack_router())
        .merge(crate::websocket::create_websocket_router());

    Router::new()
        .nest("/api", api)
        .route("/api/", get(handlers::status_handler::root))
        .layer(axum::middleware::from_fn_with_state(
            app_state.metrics.clone(),
            metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
