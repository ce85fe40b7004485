//! 自动化引擎
//!
//! 全局只有一个运行槽位。脚本在独立的 tokio 任务中循环执行，
//! 停止通过取消令牌协作完成：每个动作之前以及每个挂起点都会检查令牌。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::InputInjector;
use crate::config::config::AutomationConfig;
use crate::error::{AppError, Result};
use crate::models::{Action, ActionScript};
use crate::observability::AppMetrics;
use crate::storage::ScriptRepository;

/// 引擎状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    Idle,
    Running,
    /// 已请求停止，执行上下文尚未退出
    Stopping,
}

/// 一次运行的句柄
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunHandle {
    pub run_id: String,
    pub script_id: String,
    pub started_at: DateTime<Utc>,
}

/// 动作之间与每轮之间的固定间隔
#[derive(Debug, Clone, Copy)]
pub struct AutomationTiming {
    pub action_delay: Duration,
    pub cycle_delay: Duration,
}

impl From<&AutomationConfig> for AutomationTiming {
    fn from(config: &AutomationConfig) -> Self {
        Self {
            action_delay: Duration::from_millis(config.action_delay_ms),
            cycle_delay: Duration::from_millis(config.cycle_delay_ms),
        }
    }
}

struct ActiveRun {
    handle: RunHandle,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ActiveRun {
    fn is_live(&self) -> bool {
        !self.task.is_finished()
    }
}

/// 执行上下文计数，任务退出时自动减一
struct ContextGuard(Arc<AtomicUsize>);

impl ContextGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct AutomationEngine {
    injector: Arc<dyn InputInjector>,
    scripts: Arc<ScriptRepository>,
    metrics: Arc<AppMetrics>,
    timing: AutomationTiming,
    slot: Mutex<Option<ActiveRun>>,
    contexts: Arc<AtomicUsize>,
}

impl AutomationEngine {
    pub fn new(
        injector: Arc<dyn InputInjector>,
        scripts: Arc<ScriptRepository>,
        metrics: Arc<AppMetrics>,
        timing: AutomationTiming,
    ) -> Self {
        Self {
            injector,
            scripts,
            metrics,
            timing,
            slot: Mutex::new(None),
            contexts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 提交脚本并立即返回，不等待第一个动作
    ///
    /// 上一次运行的执行上下文仍未退出时（包括停止中）返回 `AlreadyRunning`。
    pub async fn start(&self, mut script: ActionScript) -> Result<RunHandle> {
        script.validate()?;

        let mut slot = self.slot.lock().await;
        if let Some(run) = slot.as_ref().filter(|run| run.is_live()) {
            return Err(AppError::AlreadyRunning(format!(
                "script {} (run {})",
                run.handle.script_id, run.handle.run_id
            )));
        }

        script.active = true;
        self.scripts.upsert(&script.id, &script).await?;

        let handle = RunHandle {
            run_id: Uuid::new_v4().to_string(),
            script_id: script.id.clone(),
            started_at: Utc::now(),
        };
        let cancel = CancellationToken::new();
        let context = RunContext {
            injector: self.injector.clone(),
            scripts: self.scripts.clone(),
            metrics: self.metrics.clone(),
            timing: self.timing,
            cancel: cancel.clone(),
            _guard: ContextGuard::enter(&self.contexts),
        };

        info!(
            run_id = %handle.run_id,
            script = %script.name,
            actions = script.actions.len(),
            "automation started"
        );
        self.metrics.record_run_started();
        let task = tokio::spawn(context.run(script));

        *slot = Some(ActiveRun {
            handle: handle.clone(),
            cancel,
            task,
        });
        Ok(handle)
    }

    /// 请求停止当前运行；空闲时无操作
    ///
    /// 返回是否确实向运行中的上下文发出了停止请求。
    pub async fn stop(&self) -> bool {
        let slot = self.slot.lock().await;
        match slot.as_ref().filter(|run| run.is_live()) {
            Some(run) if !run.cancel.is_cancelled() => {
                run.cancel.cancel();
                info!(run_id = %run.handle.run_id, "automation stop requested");
                true
            }
            _ => false,
        }
    }

    pub async fn state(&self) -> EngineState {
        let slot = self.slot.lock().await;
        match slot.as_ref().filter(|run| run.is_live()) {
            Some(run) if run.cancel.is_cancelled() => EngineState::Stopping,
            Some(_) => EngineState::Running,
            None => EngineState::Idle,
        }
    }

    /// 当前运行的句柄
    pub async fn current_run(&self) -> Option<RunHandle> {
        let slot = self.slot.lock().await;
        slot.as_ref()
            .filter(|run| run.is_live())
            .map(|run| run.handle.clone())
    }

    /// 存活的执行上下文数量，任何时刻不超过 1
    pub fn active_contexts(&self) -> usize {
        self.contexts.load(Ordering::SeqCst)
    }

    /// 脚本目录，按创建顺序
    pub async fn scripts(&self, limit: usize) -> Result<Vec<ActionScript>> {
        self.scripts.list(limit, 0).await
    }

    /// 停止并等待执行上下文退出，超过 `grace` 后强制中止
    pub async fn shutdown(&self, grace: Duration) {
        let run = self.slot.lock().await.take();
        let Some(run) = run else {
            return;
        };

        run.cancel.cancel();
        let run_id = run.handle.run_id;
        let mut task = run.task;
        match tokio::time::timeout(grace, &mut task).await {
            Ok(_) => info!(run_id = %run_id, "automation context exited"),
            Err(_) => {
                warn!(run_id = %run_id, "automation context did not exit in time, aborting");
                task.abort();
            }
        }
    }
}

/// 执行上下文拥有的全部状态
struct RunContext {
    injector: Arc<dyn InputInjector>,
    scripts: Arc<ScriptRepository>,
    metrics: Arc<AppMetrics>,
    timing: AutomationTiming,
    cancel: CancellationToken,
    _guard: ContextGuard,
}

impl RunContext {
    async fn run(self, script: ActionScript) {
        let mut cycles: u64 = 0;

        'run: loop {
            for (index, action) in script.actions.iter().enumerate() {
                if self.cancel.is_cancelled() {
                    break 'run;
                }
                if !self.execute(index, action).await {
                    break 'run;
                }
                if !self.pause(self.timing.action_delay).await {
                    break 'run;
                }
            }

            cycles += 1;
            debug!(script_id = %script.id, cycles, "automation cycle complete");
            if !self.pause(self.timing.cycle_delay).await {
                break;
            }
        }

        self.finish(&script, cycles).await;
    }

    /// 执行单个动作，返回 false 表示在等待中被取消
    async fn execute(&self, index: usize, action: &Action) -> bool {
        let result = match action {
            Action::Click { x, y } => self.injector.click(*x, *y).await,
            Action::Key { key } => self.injector.press_key(key).await,
            Action::Type { text } => self.injector.type_text(text).await,
            Action::Wait { .. } => {
                let duration = action.wait_duration().unwrap_or_default();
                return self.pause(duration).await;
            }
            Action::Unknown => {
                debug!(index, "skipping unknown action");
                return true;
            }
        };

        self.metrics.record_action(result.is_ok());
        if let Err(e) = result {
            warn!(index, action = action.kind(), error = %e, "action dispatch failed");
        }
        true
    }

    /// 可取消的休眠，返回 false 表示被取消
    async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }

    async fn finish(&self, script: &ActionScript, cycles: u64) {
        let mut stored = script.clone();
        stored.active = false;
        if let Err(e) = self.scripts.update(&script.id, &stored).await {
            warn!(script_id = %script.id, error = %e, "failed to clear script active flag");
        }
        info!(script_id = %script.id, cycles, "automation stopped");
    }
}
