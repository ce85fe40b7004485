// Integration tests for the memory store
//
// Tests cover:
// - Scan results are appended per scan
// - Edits only touch existing entities
// - History ordering and paging
// - Backend write failures

#[cfg(test)]
mod memory_store_tests {
    use async_trait::async_trait;
    use procpilot::backend::{
        MemoryBackend, ProcessEntry, ProcessEnumerator, ProcessProbe, SimulatedMemoryBackend,
    };
    use procpilot::error::{AppError, Result};
    use procpilot::models::{
        MemoryAddress, MemoryUsage, ProcessStats, ScanHit, Target, TypedValue, ValueType,
        WriteState,
    };
    use procpilot::observability::AppMetrics;
    use procpilot::services::{MemoryStore, TargetRegistry};
    use procpilot::storage::InMemoryRepository;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    const PID: u32 = 900;

    struct Alive;

    #[async_trait]
    impl ProcessEnumerator for Alive {
        async fn enumerate(&self, _keywords: &[String]) -> Result<Vec<ProcessEntry>> {
            Ok(vec![])
        }
    }

    #[async_trait]
    impl ProcessProbe for Alive {
        async fn probe(&self, pid: u32) -> Result<Option<ProcessStats>> {
            Ok(Some(ProcessStats {
                name: format!("rpg-{}", pid),
                cpu_percent: 0.0,
                memory_info: MemoryUsage::default(),
                num_threads: 1,
                status: "running".into(),
            }))
        }
    }

    /// Simulated backend whose writes can be switched to fail.
    struct SwitchableBackend {
        inner: SimulatedMemoryBackend,
        fail_writes: AtomicBool,
    }

    #[async_trait]
    impl MemoryBackend for SwitchableBackend {
        async fn scan(&self, pid: u32, value: &TypedValue) -> Result<Vec<ScanHit>> {
            self.inner.scan(pid, value).await
        }

        async fn write(&self, pid: u32, location: &str, value: &TypedValue) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(AppError::Backend("page is read-only".into()));
            }
            self.inner.write(pid, location, value).await
        }
    }

    struct Fixture {
        store: MemoryStore,
        registry: Arc<TargetRegistry>,
        backend: Arc<SwitchableBackend>,
    }

    async fn fixture() -> Fixture {
        let metrics = Arc::new(AppMetrics::default());
        let registry = Arc::new(TargetRegistry::new(
            Arc::new(InMemoryRepository::<Target>::new("targets")),
            Arc::new(Alive),
            Arc::new(Alive),
            metrics.clone(),
        ));
        registry.connect(PID).await.unwrap();

        let backend = Arc::new(SwitchableBackend {
            inner: SimulatedMemoryBackend::new(5, 0x100_0000, 0x1000),
            fail_writes: AtomicBool::new(false),
        });
        let store = MemoryStore::new(
            Arc::new(InMemoryRepository::<MemoryAddress>::new("memory_addresses")),
            backend.clone(),
            registry.clone(),
            metrics,
            100,
        );
        Fixture {
            store,
            registry,
            backend,
        }
    }

    #[tokio::test]
    async fn test_scan_appends_five_entities() {
        let f = fixture().await;

        let first = f
            .store
            .record_scan_results(PID, &TypedValue::Int(100))
            .await
            .unwrap();
        assert_eq!(first.len(), 5);
        assert!(first.iter().all(|a| a.pid == PID
            && a.value == TypedValue::Int(100)
            && a.value_type() == ValueType::Int
            && a.write_state == WriteState::Scanned));
        assert_eq!(first[0].description.as_deref(), Some("Memory location 1"));

        let second = f
            .store
            .record_scan_results(PID, &TypedValue::Int(100))
            .await
            .unwrap();
        assert_eq!(second.len(), 5);
        assert_ne!(first[0].scan_id, second[0].scan_id);
        assert!(second.iter().all(|a| first.iter().all(|b| b.id != a.id)));

        let page = f.store.history(PID, 0, None).await.unwrap();
        assert_eq!(page.total, 10);
    }

    #[tokio::test]
    async fn test_scan_requires_connected_target() {
        let f = fixture().await;
        f.registry.mark_disconnected(PID).await;

        let err = f
            .store
            .record_scan_results(PID, &TypedValue::Int(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotConnected(PID)));
    }

    #[tokio::test]
    async fn test_edit_unknown_location_creates_nothing() {
        let f = fixture().await;
        f.store
            .record_scan_results(PID, &TypedValue::Int(100))
            .await
            .unwrap();

        let err = f
            .store
            .apply_edit(PID, "0xBEEF", TypedValue::Int(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let page = f.store.history(PID, 0, None).await.unwrap();
        assert_eq!(page.total, 5);
        assert!(page.items.iter().all(|a| a.address != "0xBEEF"));
    }

    #[tokio::test]
    async fn test_edit_updates_latest_entity_in_place() {
        let f = fixture().await;
        let first = f
            .store
            .record_scan_results(PID, &TypedValue::Int(100))
            .await
            .unwrap();
        let second = f
            .store
            .record_scan_results(PID, &TypedValue::Int(100))
            .await
            .unwrap();

        let edited = f
            .store
            .apply_edit(PID, "0x1000000", TypedValue::Int(9999))
            .await
            .unwrap();
        assert_eq!(edited.id, second[0].id);
        assert_eq!(edited.value, TypedValue::Int(9999));
        assert_eq!(edited.write_state, WriteState::Written);
        assert!(edited.updated_at >= edited.created_at);

        let page = f.store.history(PID, 0, None).await.unwrap();
        assert_eq!(page.total, 10);
        let untouched = page.items.iter().find(|a| a.id == first[0].id).unwrap();
        assert_eq!(untouched.value, TypedValue::Int(100));
    }

    #[tokio::test]
    async fn test_failed_write_keeps_intended_value() {
        let f = fixture().await;
        f.store
            .record_scan_results(PID, &TypedValue::Float(1.5))
            .await
            .unwrap();
        f.backend.fail_writes.store(true, Ordering::SeqCst);

        let err = f
            .store
            .apply_edit(PID, "0x1001000", TypedValue::Float(3.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Backend(_)));

        let page = f.store.history(PID, 0, None).await.unwrap();
        let entity = page.items.iter().find(|a| a.address == "0x1001000").unwrap();
        assert_eq!(entity.value, TypedValue::Float(3.0));
        assert_eq!(entity.write_state, WriteState::WriteFailed);
    }

    #[tokio::test]
    async fn test_history_is_stable_and_paged() {
        let f = fixture().await;
        for value in [1, 2, 3] {
            f.store
                .record_scan_results(PID, &TypedValue::Int(value))
                .await
                .unwrap();
        }

        let all = f.store.history(PID, 0, None).await.unwrap();
        let again = f.store.history(PID, 0, None).await.unwrap();
        let ids: Vec<_> = all.items.iter().map(|a| a.id.clone()).collect();
        assert_eq!(ids, again.items.iter().map(|a| a.id.clone()).collect::<Vec<_>>());
        assert!(all.items.windows(2).all(|w| w[0].created_at <= w[1].created_at));
        assert!(all.next_cursor.is_none());

        let mut cursor = 0;
        let mut paged = Vec::new();
        loop {
            let page = f.store.history(PID, cursor, Some(4)).await.unwrap();
            paged.extend(page.items.into_iter().map(|a| a.id));
            match page.next_cursor {
                Some(next) => cursor = next,
                None => break,
            }
        }
        assert_eq!(paged, ids);

        let other = f.store.history(PID + 1, 0, None).await.unwrap();
        assert!(other.items.is_empty());
        assert_eq!(other.total, 0);
    }
}
