use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::error::{AppError, Result};

/// 输入注入器
///
/// 调用是即发即弃的副作用，失败由调用方记录后继续。
#[async_trait]
pub trait InputInjector: Send + Sync {
    async fn click(&self, x: i32, y: i32) -> Result<()>;

    async fn press_key(&self, key: &str) -> Result<()>;

    async fn type_text(&self, text: &str) -> Result<()>;
}

/// 无图形环境时使用：只记录日志
#[derive(Debug, Clone, Default)]
pub struct HeadlessInjector;

#[async_trait]
impl InputInjector for HeadlessInjector {
    async fn click(&self, x: i32, y: i32) -> Result<()> {
        info!(x, y, "headless click");
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        info!(key, "headless key press");
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<()> {
        info!(len = text.len(), "headless type");
        Ok(())
    }
}

/// 通过 xdotool 向 X11 会话注入输入
#[derive(Debug, Clone)]
pub struct XdotoolInjector {
    program: String,
}

impl XdotoolInjector {
    pub fn new() -> Self {
        Self {
            program: "xdotool".to_string(),
        }
    }

    async fn run(&self, args: &[String]) -> Result<()> {
        let status = Command::new(&self.program)
            .args(args)
            .status()
            .await
            .map_err(|e| AppError::Backend(format!("failed to spawn {}: {}", self.program, e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(AppError::Backend(format!(
                "{} {} exited with {}",
                self.program,
                args.join(" "),
                status
            )))
        }
    }
}

impl Default for XdotoolInjector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InputInjector for XdotoolInjector {
    async fn click(&self, x: i32, y: i32) -> Result<()> {
        self.run(&[
            "mousemove".into(),
            x.to_string(),
            y.to_string(),
            "click".into(),
            "1".into(),
        ])
        .await
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        self.run(&["key".into(), key.to_string()]).await
    }

    async fn type_text(&self, text: &str) -> Result<()> {
        self.run(&["type".into(), "--".into(), text.to_string()]).await
    }
}

/// 按名称创建注入器，未知名称回退到 headless
pub fn create_input_injector(kind: &str) -> Box<dyn InputInjector> {
    match kind {
        "xdotool" => Box::new(XdotoolInjector::new()),
        _ => Box::new(HeadlessInjector),
    }
}
