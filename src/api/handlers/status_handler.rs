use axum::{Json, extract::State, response::IntoResponse};
use chrono::Utc;

use crate::{
    api::{app_state::AppState, dto::status_dto::*},
    error::AppError,
    services::EngineState,
};

pub async fn root() -> impl IntoResponse {
    Json(MessageResponse {
        message: "procpilot control API - ready".to_string(),
    })
}

pub async fn status(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let automation_state = state.automation.state().await;

    Ok(Json(StatusResponse {
        status: "online".to_string(),
        connected_processes: state.registry.connected_count(),
        automation_active: automation_state == EngineState::Running,
        automation_state,
        telemetry_streams: state.telemetry.active_streams(),
        timestamp: Utc::now(),
    }))
}

pub async fn list_sessions(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let sessions = state.hacks.list_sessions().await?;
    Ok(Json(sessions))
}
