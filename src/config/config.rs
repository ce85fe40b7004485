use serde::{Deserialize, Serialize};

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 服务地址
    pub host: String,
    /// 服务端口
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8001,
        }
    }
}

/// 自动化引擎配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    /// 动作之间的固定间隔（毫秒）
    pub action_delay_ms: u64,
    /// 每轮脚本执行完毕后的间隔（毫秒）
    pub cycle_delay_ms: u64,
    /// 关闭时等待执行上下文退出的时长（毫秒）
    pub shutdown_grace_ms: u64,
    /// 输入注入器: "headless" 或 "xdotool"
    pub injector: String,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            action_delay_ms: 100,
            cycle_delay_ms: 1000,
            shutdown_grace_ms: 2000,
            injector: "headless".into(),
        }
    }
}

/// 遥测配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// 采样间隔（毫秒）
    pub tick_interval_ms: u64,
    /// 每个订阅的缓冲区大小
    pub channel_capacity: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            channel_capacity: 16,
        }
    }
}

/// 内存地址存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// 历史记录单页上限
    pub history_page_size: usize,
    /// 模拟后端每次扫描返回的地址数
    pub simulated_hits: usize,
    /// 模拟后端的起始地址
    pub base_address: u64,
    /// 模拟后端的地址步长
    pub address_stride: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            history_page_size: 100,
            simulated_hits: 5,
            base_address: 0x100_0000,
            address_stride: 0x1000,
        }
    }
}

/// 进程检测配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// 进程名关键字（不区分大小写）
    pub keywords: Vec<String>,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            keywords: [
                "game", "unity", "unreal", "kingshot", "steam", "battle", "rpg", "mmo",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 结构化日志格式
    pub structured: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            structured: false,
        }
    }
}

/// 列表查询配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// 脚本与会话列表的返回上限
    pub max_items: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { max_items: 100 }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 自动化引擎配置
    pub automation: AutomationConfig,
    /// 遥测配置
    pub telemetry: TelemetryConfig,
    /// 内存地址存储配置
    pub memory: MemoryConfig,
    /// 进程检测配置
    pub process: ProcessConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 列表查询配置
    pub listing: ListingConfig,
}

impl AppConfig {
    /// 创建开发环境配置
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".into();
        config.server.host = "127.0.0.1".into();
        config
    }

    /// 创建生产环境配置
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.structured = true;
        config
    }
}
