// Integration tests for the automation engine
//
// Tests cover:
// - Cooperative stop inside a scripted wait
// - Single global run slot (AlreadyRunning, Stopping window)
// - Per-action failure isolation
// - Script catalogue active flag

#[cfg(test)]
mod automation_engine_tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use procpilot::backend::InputInjector;
    use procpilot::error::{AppError, Result};
    use procpilot::models::{Action, ActionScript};
    use procpilot::observability::AppMetrics;
    use procpilot::services::{AutomationEngine, AutomationTiming, EngineState};
    use procpilot::storage::InMemoryRepository;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    /// Records every dispatched action; clicks fail when `fail_clicks` is set.
    #[derive(Default)]
    struct RecordingInjector {
        calls: Mutex<Vec<String>>,
        fail_clicks: bool,
    }

    impl RecordingInjector {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl InputInjector for RecordingInjector {
        async fn click(&self, x: i32, y: i32) -> Result<()> {
            self.calls.lock().push(format!("click {} {}", x, y));
            if self.fail_clicks {
                return Err(AppError::Backend("no display".into()));
            }
            Ok(())
        }

        async fn press_key(&self, key: &str) -> Result<()> {
            self.calls.lock().push(format!("key {}", key));
            Ok(())
        }

        async fn type_text(&self, text: &str) -> Result<()> {
            self.calls.lock().push(format!("type {}", text));
            Ok(())
        }
    }

    fn engine(injector: Arc<RecordingInjector>) -> (AutomationEngine, Arc<AppMetrics>) {
        let metrics = Arc::new(AppMetrics::default());
        let engine = AutomationEngine::new(
            injector,
            Arc::new(InMemoryRepository::<ActionScript>::new("automation_scripts")),
            metrics.clone(),
            AutomationTiming {
                action_delay: Duration::from_millis(100),
                cycle_delay: Duration::from_millis(1000),
            },
        );
        (engine, metrics)
    }

    fn wait_click_key() -> ActionScript {
        ActionScript::new(
            "farm",
            "wait then click then space",
            vec![
                Action::Wait { duration: 1.0 },
                Action::Click { x: 10, y: 20 },
                Action::Key {
                    key: "space".into(),
                },
            ],
        )
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_mid_cycle_settles_to_idle() {
        let injector = Arc::new(RecordingInjector::default());
        let (engine, _) = engine(injector.clone());

        engine.start(wait_click_key()).await.unwrap();
        assert_eq!(engine.state().await, EngineState::Running);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(engine.stop().await);
        settle().await;

        assert_eq!(engine.state().await, EngineState::Idle);
        assert_eq!(engine.active_contexts(), 0);
        assert!(injector.calls().len() < 3);

        let observed = injector.calls().len();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(injector.calls().len(), observed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_script_loops_in_order() {
        let injector = Arc::new(RecordingInjector::default());
        let (engine, _) = engine(injector.clone());

        engine.start(wait_click_key()).await.unwrap();
        // wait 1.0 + delay 0.1 + click + 0.1 + key + 0.1 + cycle 1.0 + wait 1.0 + 0.1 + click
        tokio::time::sleep(Duration::from_millis(3450)).await;
        engine.stop().await;
        settle().await;

        assert_eq!(
            injector.calls(),
            vec!["click 10 20", "key space", "click 10 20"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_run_slot() {
        let injector = Arc::new(RecordingInjector::default());
        let (engine, metrics) = engine(injector);

        engine.start(wait_click_key()).await.unwrap();
        let err = engine.start(wait_click_key()).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyRunning(_)));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(engine.active_contexts(), 1);

        // The cancelled context has not exited yet.
        engine.stop().await;
        assert_eq!(engine.state().await, EngineState::Stopping);
        let err = engine.start(wait_click_key()).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyRunning(_)));

        settle().await;
        engine.start(wait_click_key()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(engine.active_contexts(), 1);
        assert_eq!(metrics.automation_runs_total.load(Ordering::Relaxed), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_action_does_not_abort_run() {
        let injector = Arc::new(RecordingInjector {
            calls: Mutex::new(Vec::new()),
            fail_clicks: true,
        });
        let (engine, metrics) = engine(injector.clone());

        let script = ActionScript::new(
            "clicky",
            "",
            vec![Action::Click { x: 1, y: 1 }, Action::Key { key: "a".into() }],
        );
        engine.start(script).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2450)).await;
        engine.stop().await;
        settle().await;

        let calls = injector.calls();
        assert!(calls.iter().filter(|c| c.starts_with("click")).count() >= 2);
        assert!(calls.iter().filter(|c| c.as_str() == "key a").count() >= 2);
        assert!(metrics.automation_action_failures_total.load(Ordering::Relaxed) >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_action_is_skipped() {
        let injector = Arc::new(RecordingInjector::default());
        let (engine, _) = engine(injector.clone());

        let script = ActionScript::new(
            "mixed",
            "",
            vec![Action::Unknown, Action::Type { text: "gg".into() }],
        );
        engine.start(script).await.unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;
        engine.stop().await;
        settle().await;

        assert_eq!(injector.calls(), vec!["type gg"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_begins_at_first_action() {
        let injector = Arc::new(RecordingInjector::default());
        let (engine, _) = engine(injector.clone());

        let script = || {
            ActionScript::new(
                "two-step",
                "",
                vec![
                    Action::Key { key: "first".into() },
                    Action::Wait { duration: 10.0 },
                    Action::Key {
                        key: "second".into(),
                    },
                ],
            )
        };

        engine.start(script()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        engine.stop().await;
        settle().await;

        engine.start(script()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        engine.stop().await;
        settle().await;

        assert_eq!(injector.calls(), vec!["key first", "key first"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_catalogue_tracks_active_flag() {
        let injector = Arc::new(RecordingInjector::default());
        let (engine, _) = engine(injector);

        let handle = engine.start(wait_click_key()).await.unwrap();
        let scripts = engine.scripts(10).await.unwrap();
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].id, handle.script_id);
        assert!(scripts[0].active);

        engine.stop().await;
        settle().await;
        let scripts = engine.scripts(10).await.unwrap();
        assert!(!scripts[0].active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_waits_for_context() {
        let injector = Arc::new(RecordingInjector::default());
        let (engine, _) = engine(injector);

        engine.start(wait_click_key()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        engine.shutdown(Duration::from_secs(2)).await;

        assert_eq!(engine.active_contexts(), 0);
        assert_eq!(engine.state().await, EngineState::Idle);
    }
}
