use axum::{Json, extract::State, response::IntoResponse};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::automation_dto::*},
    error::AppError,
    models::ActionScript,
    services::EngineState,
};

pub async fn start_automation(
    State(state): State<AppState>,
    Json(request): Json<StartAutomationRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!(
        "Starting script {} with {} actions",
        request.name,
        request.actions.len()
    );

    let script = ActionScript::new(&request.name, &request.description, request.actions);
    let handle = state.automation.start(script).await?;
    Ok(Json(StartAutomationResponse::from(handle)))
}

pub async fn stop_automation(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stopped = state.automation.stop().await;
    Ok(Json(StopAutomationResponse {
        message: if stopped {
            "Automation stopped".to_string()
        } else {
            "Automation not running".to_string()
        },
        stopped,
    }))
}

pub async fn automation_status(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let engine_state = state.automation.state().await;
    Ok(Json(AutomationStatusResponse {
        state: engine_state,
        active: engine_state == EngineState::Running,
        run: state.automation.current_run().await,
    }))
}

pub async fn list_scripts(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let scripts = state
        .automation
        .scripts(state.config.listing.max_items)
        .await?;
    Ok(Json(scripts))
}
