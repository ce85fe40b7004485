use anyhow::Context;
use procpilot::api::{
    self,
    app_state::{AppState, Collaborators},
};
use procpilot::backend::{ProcfsProcesses, SimulatedMemoryBackend, create_input_injector};
use procpilot::config::ConfigLoader;
use procpilot::observability::{
    AppMetrics, ObservabilityState, create_observability_router, init_tracing,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::load().context("failed to load configuration")?;
    ConfigLoader::validate(&config)?;
    init_tracing(&config.logging).map_err(|e| anyhow::anyhow!(e))?;

    info!("Starting procpilot...");

    let processes = Arc::new(ProcfsProcesses::new());
    let collaborators = Collaborators {
        enumerator: processes.clone(),
        probe: processes,
        memory: Arc::new(SimulatedMemoryBackend::from_config(&config.memory)),
        injector: Arc::from(create_input_injector(&config.automation.injector)),
    };
    info!("Using {} input injector", config.automation.injector);

    let metrics = Arc::new(AppMetrics::default());
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let shutdown_grace = Duration::from_millis(config.automation.shutdown_grace_ms);
    let app_state = AppState::new(config, collaborators, metrics.clone());
    let automation = app_state.automation.clone();
    info!("Application state created");

    let telemetry = app_state.telemetry.clone();
    let gauges_automation = automation.clone();
    let observability_state = Arc::new(ObservabilityState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        metrics,
        Arc::new(move || (telemetry.active_streams(), gauges_automation.active_contexts())),
    ));
    let router =
        create_observability_router(observability_state).merge(api::create_router(app_state));
    info!("API router created with observability endpoints");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Stopping automation...");
    automation.shutdown(shutdown_grace).await;
    info!("procpilot stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
