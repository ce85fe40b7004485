use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::memory_dto::*},
    error::AppError,
    models::{TypedValue, ValueType},
};

fn parse_value(data_type: &str, raw: &serde_json::Value) -> Result<TypedValue, AppError> {
    let value_type: ValueType = data_type.parse()?;
    TypedValue::from_json(value_type, raw)
}

pub async fn scan_memory(
    State(state): State<AppState>,
    Json(request): Json<ScanRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Scanning memory of {} for {}", request.pid, request.value);

    let value = parse_value(&request.data_type, &request.value)?;
    let addresses = state
        .memory_store
        .record_scan_results(request.pid, &value)
        .await?;

    Ok(Json(ScanResponse {
        message: format!("Found {} memory addresses", addresses.len()),
        addresses,
    }))
}

pub async fn edit_memory(
    State(state): State<AppState>,
    Json(request): Json<EditRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Editing {} at {}", request.pid, request.address);

    let value = parse_value(&request.data_type, &request.new_value)?;
    let address = state
        .memory_store
        .apply_edit(request.pid, &request.address, value)
        .await?;

    Ok(Json(EditResponse {
        message: format!(
            "Successfully updated memory at {} to {}",
            address.address, address.value
        ),
        address,
    }))
}

pub async fn memory_history(
    State(state): State<AppState>,
    Path(pid): Path<u32>,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = state
        .memory_store
        .history(pid, params.cursor.unwrap_or(0), params.limit)
        .await?;
    Ok(Json(page))
}
