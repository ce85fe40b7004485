use std::sync::Arc;

use crate::backend::{InputInjector, MemoryBackend, ProcessEnumerator, ProcessProbe};
use crate::config::AppConfig;
use crate::models::{ActionScript, HackSession, MemoryAddress, Target};
use crate::observability::AppMetrics;
use crate::services::{
    AutomationEngine, AutomationTiming, HackService, MemoryStore, TargetRegistry, TelemetryService,
};
use crate::storage::InMemoryRepository;

/// Application state containing all shared services
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<AppConfig>,
    /// Detected and connected target processes
    pub registry: Arc<TargetRegistry>,
    /// Scan results and edits
    pub memory_store: Arc<MemoryStore>,
    /// Single-slot script runner
    pub automation: Arc<AutomationEngine>,
    /// Per-subscription process sampling
    pub telemetry: Arc<TelemetryService>,
    /// Capability toggles and the session log
    pub hacks: Arc<HackService>,
    pub metrics: Arc<AppMetrics>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("registry", &"Arc<TargetRegistry>")
            .field("memory_store", &"Arc<MemoryStore>")
            .field("automation", &"Arc<AutomationEngine>")
            .field("telemetry", &"Arc<TelemetryService>")
            .field("hacks", &"Arc<HackService>")
            .finish()
    }
}

/// External collaborators the services are wired against
pub struct Collaborators {
    pub enumerator: Arc<dyn ProcessEnumerator>,
    pub probe: Arc<dyn ProcessProbe>,
    pub memory: Arc<dyn MemoryBackend>,
    pub injector: Arc<dyn InputInjector>,
}

impl AppState {
    /// Build every service over in-memory tables
    pub fn new(config: AppConfig, collaborators: Collaborators, metrics: Arc<AppMetrics>) -> Self {
        let registry = Arc::new(TargetRegistry::new(
            Arc::new(InMemoryRepository::<Target>::new("targets")),
            collaborators.enumerator,
            collaborators.probe,
            metrics.clone(),
        ));

        let memory_store = Arc::new(MemoryStore::new(
            Arc::new(InMemoryRepository::<MemoryAddress>::new("memory_addresses")),
            collaborators.memory,
            registry.clone(),
            metrics.clone(),
            config.memory.history_page_size,
        ));

        let automation = Arc::new(AutomationEngine::new(
            collaborators.injector,
            Arc::new(InMemoryRepository::<ActionScript>::new("automation_scripts")),
            metrics.clone(),
            AutomationTiming::from(&config.automation),
        ));

        let telemetry = Arc::new(TelemetryService::new(
            registry.clone(),
            metrics.clone(),
            &config.telemetry,
        ));

        let hacks = Arc::new(HackService::new(
            registry.clone(),
            Arc::new(InMemoryRepository::<HackSession>::new("hack_sessions")),
            config.listing.max_items,
        ));

        Self {
            config: Arc::new(config),
            registry,
            memory_store,
            automation,
            telemetry,
            hacks,
            metrics,
        }
    }
}
