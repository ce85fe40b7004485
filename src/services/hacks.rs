//! 能力开关服务
//!
//! 对已连接目标启用能力，并把每次启用记录为一条会话审计日志。

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, Result};
use crate::models::{Capability, HackSession};
use crate::services::target_registry::TargetRegistry;
use crate::storage::HackSessionRepository;

pub const DEFAULT_SPEED_MULTIPLIER: f64 = 2.0;
pub const DEFAULT_AIM_SENSITIVITY: f64 = 1.0;
const MAX_AIM_SENSITIVITY: f64 = 10.0;

/// 启用结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityGrant {
    pub message: String,
    pub session: HackSession,
}

pub struct HackService {
    registry: Arc<TargetRegistry>,
    sessions: Arc<HackSessionRepository>,
    max_items: usize,
}

impl HackService {
    pub fn new(
        registry: Arc<TargetRegistry>,
        sessions: Arc<HackSessionRepository>,
        max_items: usize,
    ) -> Self {
        Self {
            registry,
            sessions,
            max_items,
        }
    }

    pub async fn enable_unlimited_resources(
        &self,
        pid: u32,
        resource_type: &str,
    ) -> Result<CapabilityGrant> {
        if resource_type.trim().is_empty() {
            return Err(AppError::Validation("resource_type must not be empty".into()));
        }
        self.grant(
            pid,
            Capability::UnlimitedResources,
            format!("Unlimited {} enabled for process {}", resource_type, pid),
        )
        .await
    }

    pub async fn enable_speed_boost(&self, pid: u32, multiplier: f64) -> Result<CapabilityGrant> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(AppError::Validation(format!(
                "speed multiplier must be positive, got {}",
                multiplier
            )));
        }
        self.grant(
            pid,
            Capability::SpeedBoost,
            format!("Speed boost x{} enabled for process {}", multiplier, pid),
        )
        .await
    }

    pub async fn enable_auto_aim(&self, pid: u32, sensitivity: f64) -> Result<CapabilityGrant> {
        if !(sensitivity > 0.0 && sensitivity <= MAX_AIM_SENSITIVITY) {
            return Err(AppError::Validation(format!(
                "sensitivity must be within (0, {}], got {}",
                MAX_AIM_SENSITIVITY, sensitivity
            )));
        }
        self.grant(
            pid,
            Capability::AutoAim,
            format!(
                "Auto-aim enabled with sensitivity {} for process {}",
                sensitivity, pid
            ),
        )
        .await
    }

    /// 会话日志，按创建顺序
    pub async fn list_sessions(&self) -> Result<Vec<HackSession>> {
        self.sessions.list(self.max_items, 0).await
    }

    async fn grant(
        &self,
        pid: u32,
        capability: Capability,
        message: String,
    ) -> Result<CapabilityGrant> {
        let target = self
            .registry
            .connected_info(pid)
            .ok_or(AppError::NotConnected(pid))?;

        let session = HackSession::new(&target.name, pid, vec![capability]);
        let session = self.sessions.create(&session).await?;

        info!(pid, capability = capability.as_str(), "capability enabled");
        Ok(CapabilityGrant { message, session })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ProcessEntry, ProcessEnumerator, ProcessProbe};
    use crate::models::{MemoryUsage, ProcessStats, Target};
    use crate::observability::AppMetrics;
    use crate::storage::InMemoryRepository;
    use async_trait::async_trait;
    use rstest::rstest;

    struct OneProcess;

    #[async_trait]
    impl ProcessEnumerator for OneProcess {
        async fn enumerate(&self, _keywords: &[String]) -> Result<Vec<ProcessEntry>> {
            Ok(vec![])
        }
    }

    #[async_trait]
    impl ProcessProbe for OneProcess {
        async fn probe(&self, pid: u32) -> Result<Option<ProcessStats>> {
            Ok((pid == 7).then(|| ProcessStats {
                name: "mmo-client".into(),
                cpu_percent: 0.0,
                memory_info: MemoryUsage::default(),
                num_threads: 1,
                status: "sleeping".into(),
            }))
        }
    }

    fn service() -> (HackService, Arc<TargetRegistry>) {
        let registry = Arc::new(TargetRegistry::new(
            Arc::new(InMemoryRepository::<Target>::new("targets")),
            Arc::new(OneProcess),
            Arc::new(OneProcess),
            Arc::new(AppMetrics::default()),
        ));
        let service = HackService::new(
            registry.clone(),
            Arc::new(InMemoryRepository::<HackSession>::new("hack_sessions")),
            100,
        );
        (service, registry)
    }

    #[tokio::test]
    async fn test_requires_connected_target() {
        let (service, _) = service();
        let err = service.enable_speed_boost(7, 2.0).await.unwrap_err();
        assert!(matches!(err, AppError::NotConnected(7)));
        assert!(service.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_each_grant_is_logged() {
        let (service, registry) = service();
        registry.connect(7).await.unwrap();

        let grant = service.enable_unlimited_resources(7, "gold").await.unwrap();
        assert_eq!(grant.message, "Unlimited gold enabled for process 7");
        service.enable_auto_aim(7, 1.0).await.unwrap();

        let sessions = service.list_sessions().await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].game_name, "mmo-client");
        assert_eq!(sessions[0].tools_enabled, vec![Capability::UnlimitedResources]);
        assert_eq!(sessions[1].tools_enabled, vec![Capability::AutoAim]);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(10.5)]
    #[case(f64::NAN)]
    #[tokio::test]
    async fn test_auto_aim_sensitivity_bounds(#[case] sensitivity: f64) {
        let (service, registry) = service();
        registry.connect(7).await.unwrap();
        let err = service.enable_auto_aim(7, sensitivity).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
