use axum::{Json, extract::State, response::IntoResponse};

use crate::{
    api::{app_state::AppState, dto::hack_dto::*},
    error::AppError,
};

pub async fn unlimited_resources(
    State(state): State<AppState>,
    Json(request): Json<UnlimitedResourcesRequest>,
) -> Result<impl IntoResponse, AppError> {
    let grant = state
        .hacks
        .enable_unlimited_resources(request.pid, &request.resource_type)
        .await?;
    Ok(Json(HackResponse::from(grant)))
}

pub async fn speed_boost(
    State(state): State<AppState>,
    Json(request): Json<SpeedBoostRequest>,
) -> Result<impl IntoResponse, AppError> {
    let grant = state
        .hacks
        .enable_speed_boost(request.pid, request.multiplier)
        .await?;
    Ok(Json(HackResponse::from(grant)))
}

pub async fn auto_aim(
    State(state): State<AppState>,
    Json(request): Json<AutoAimRequest>,
) -> Result<impl IntoResponse, AppError> {
    let grant = state
        .hacks
        .enable_auto_aim(request.pid, request.sensitivity)
        .await?;
    Ok(Json(HackResponse::from(grant)))
}
