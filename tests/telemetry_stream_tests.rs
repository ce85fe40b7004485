// Integration tests for telemetry subscriptions
//
// Tests cover:
// - Terminal notices (not connected, process gone)
// - Detachment releasing the sampling task
// - Ordering under probe latency

#[cfg(test)]
mod telemetry_stream_tests {
    use async_trait::async_trait;
    use procpilot::backend::{ProcessEntry, ProcessEnumerator, ProcessProbe};
    use procpilot::config::config::TelemetryConfig;
    use procpilot::error::{AppError, Result};
    use procpilot::models::{MemoryUsage, ProcessStats, Target};
    use procpilot::observability::AppMetrics;
    use procpilot::services::telemetry::{NOT_CONNECTED, PROCESS_GONE};
    use procpilot::services::{TargetRegistry, TelemetryEvent, TelemetryService};
    use procpilot::storage::InMemoryRepository;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    const PID: u32 = 77;

    /// A single process that can disappear, with configurable probe latency.
    struct ScriptedProcess {
        alive: AtomicBool,
        failing: AtomicBool,
        latency: Duration,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        probes: AtomicUsize,
    }

    impl ScriptedProcess {
        fn new(latency: Duration) -> Self {
            Self {
                alive: AtomicBool::new(true),
                failing: AtomicBool::new(false),
                latency,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                probes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ProcessEnumerator for ScriptedProcess {
        async fn enumerate(&self, _keywords: &[String]) -> Result<Vec<ProcessEntry>> {
            Ok(vec![])
        }
    }

    #[async_trait]
    impl ProcessProbe for ScriptedProcess {
        async fn probe(&self, pid: u32) -> Result<Option<ProcessStats>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.probes.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.latency).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing.load(Ordering::SeqCst) {
                return Err(AppError::Backend("procfs unreadable".into()));
            }
            if pid != PID || !self.alive.load(Ordering::SeqCst) {
                return Ok(None);
            }
            Ok(Some(ProcessStats {
                name: "battle-client".into(),
                cpu_percent: 3.0,
                memory_info: MemoryUsage { rss: 10, vms: 20 },
                num_threads: 2,
                status: "running".into(),
            }))
        }
    }

    fn setup(latency: Duration) -> (TelemetryService, Arc<TargetRegistry>, Arc<ScriptedProcess>) {
        let process = Arc::new(ScriptedProcess::new(latency));
        let metrics = Arc::new(AppMetrics::default());
        let registry = Arc::new(TargetRegistry::new(
            Arc::new(InMemoryRepository::<Target>::new("targets")),
            process.clone(),
            process.clone(),
            metrics.clone(),
        ));
        let service = TelemetryService::new(
            registry.clone(),
            metrics,
            &TelemetryConfig {
                tick_interval_ms: 1000,
                channel_capacity: 16,
            },
        );
        (service, registry, process)
    }

    fn error_text(event: &TelemetryEvent) -> Option<&str> {
        match event {
            TelemetryEvent::Error { error } => Some(error.as_str()),
            TelemetryEvent::Snapshot(_) => None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unconnected_target_gets_single_notice() {
        let (service, _, _) = setup(Duration::ZERO);
        let mut subscription = service.subscribe(PID);

        let event = subscription.next().await.unwrap();
        assert_eq!(error_text(&event), Some(NOT_CONNECTED));
        assert!(subscription.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_process_gone_is_terminal() {
        let (service, registry, process) = setup(Duration::ZERO);
        registry.connect(PID).await.unwrap();

        let mut subscription = service.subscribe(PID);
        let first = subscription.next().await.unwrap();
        assert!(matches!(first, TelemetryEvent::Snapshot(ref s) if s.seq == 1));

        process.alive.store(false, Ordering::SeqCst);
        let gone = subscription.next().await.unwrap();
        assert_eq!(error_text(&gone), Some(PROCESS_GONE));
        assert!(subscription.next().await.is_none());
        assert!(!registry.is_connected(PID));
    }

    #[tokio::test(start_paused = true)]
    async fn test_detach_releases_stream() {
        let (service, registry, process) = setup(Duration::ZERO);
        registry.connect(PID).await.unwrap();

        let mut subscription = service.subscribe(PID);
        subscription.next().await.unwrap();
        assert_eq!(service.active_streams(), 1);

        drop(subscription);
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(service.active_streams(), 0);

        let probes = process.probes.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(process.probes.load(Ordering::SeqCst), probes);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_probe_never_overlaps() {
        let (service, registry, process) = setup(Duration::from_millis(2500));
        registry.connect(PID).await.unwrap();

        let mut subscription = service.subscribe(PID);
        let mut snapshots = Vec::new();
        while snapshots.len() < 3 {
            match subscription.next().await.unwrap() {
                TelemetryEvent::Snapshot(snapshot) => snapshots.push(snapshot),
                other => panic!("unexpected event {:?}", other),
            }
        }

        assert_eq!(
            snapshots.iter().map(|s| s.seq).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(snapshots.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(process.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_error_skips_tick() {
        let (service, registry, process) = setup(Duration::ZERO);
        registry.connect(PID).await.unwrap();

        process.failing.store(true, Ordering::SeqCst);
        let mut subscription = service.subscribe(PID);
        tokio::time::sleep(Duration::from_millis(2500)).await;
        process.failing.store(false, Ordering::SeqCst);

        match subscription.next().await.unwrap() {
            TelemetryEvent::Snapshot(snapshot) => assert_eq!(snapshot.seq, 1),
            other => panic!("unexpected event {:?}", other),
        }
        assert!(registry.is_connected(PID));
    }
}
