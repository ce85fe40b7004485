use crate::config::config::AppConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从默认路径加载配置
    ///
    /// 合并顺序：
    /// 1. 内置默认值
    /// 2. ./procpilot.toml
    /// 3. 环境变量（PROCPILOT_ 前缀，`__` 分隔层级）
    pub fn load() -> Result<AppConfig, figment::Error> {
        Self::load_from(default_config_path())
    }

    /// 从指定路径加载配置
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig, figment::Error> {
        Self::figment(path.as_ref()).extract()
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("PROCPILOT_").split("__"))
    }

    /// 验证配置
    pub fn validate(config: &AppConfig) -> Result<(), ConfigValidationError> {
        if config.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        if config.telemetry.tick_interval_ms == 0 {
            return Err(ConfigValidationError::InvalidTickInterval);
        }

        if config.telemetry.channel_capacity == 0 {
            return Err(ConfigValidationError::InvalidChannelCapacity);
        }

        if config.memory.history_page_size == 0 {
            return Err(ConfigValidationError::InvalidPageSize);
        }

        Ok(())
    }
}

/// 配置验证错误
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigValidationError {
    #[error("服务端口无效，必须大于 0")]
    InvalidPort,

    #[error("遥测采样间隔无效，必须大于 0")]
    InvalidTickInterval,

    #[error("遥测缓冲区大小无效，必须大于 0")]
    InvalidChannelCapacity,

    #[error("历史记录分页大小无效，必须大于 0")]
    InvalidPageSize,
}

/// 获取默认配置文件路径
pub fn default_config_path() -> PathBuf {
    PathBuf::from("procpilot.toml")
}
