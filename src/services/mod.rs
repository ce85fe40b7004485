//! 服务模块

pub mod automation;
pub mod hacks;
pub mod memory_store;
pub mod target_registry;
pub mod telemetry;

pub use automation::{AutomationEngine, AutomationTiming, EngineState, RunHandle};
pub use hacks::{CapabilityGrant, HackService};
pub use memory_store::{HistoryPage, MemoryStore};
pub use target_registry::TargetRegistry;
pub use telemetry::{TelemetryEvent, TelemetryService, TelemetrySnapshot, TelemetrySubscription};
