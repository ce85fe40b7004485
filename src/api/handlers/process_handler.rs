use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::process_dto::*},
    error::AppError,
};

pub async fn list_processes(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let targets = state.registry.detect(&state.config.process.keywords).await?;
    debug!("Detected {} candidate processes", targets.len());
    Ok(Json(targets))
}

pub async fn connect_process(
    State(state): State<AppState>,
    Path(pid): Path<u32>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Connecting to process: {}", pid);

    let info = state.registry.connect(pid).await?;
    Ok(Json(ConnectResponse {
        message: format!("Successfully connected to process {}", pid),
        process_info: info,
    }))
}
