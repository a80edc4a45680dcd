//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `QUILL_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `QUILL_SERVER__PORT=8080`
/// - `QUILL_DATABASE__PATH=/data/quill.db`
/// - `QUILL_VECTOR__URL=http://qdrant:6334`
/// - `QUILL_QUEUE__ENABLED=false`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5070)?
        .set_default("database.path", "data/quill.db")?
        .set_default("database.max_connections", 5)?
        .set_default("llm.timeout_secs", 300)?
        .set_default("llm.stream_timeout_secs", 600)?
        .set_default("llm.temperature", 0.7_f64)?
        .set_default("llm.max_tokens", 8192)?
        .set_default("vector.url", "http://localhost:6334")?
        .set_default("vector.collection_prefix", "novel_")?
        .set_default("vector.dimension", 1536)?
        .set_default("retrieval.top_k", 3)?
        .set_default("retrieval.min_score", 0.0_f64)?
        .set_default("queue.enabled", true)?
        .set_default("queue.capacity", 1000)?
        .set_default("queue.max_concurrent", 2)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级），变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("QUILL")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    if config.vector.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Vector store URL cannot be empty".to_string(),
        ));
    }

    if config.retrieval.top_k == 0 {
        return Err(ConfigError::ValidationError(
            "retrieval.top_k must be positive".to_string(),
        ));
    }

    if config.queue.enabled && (config.queue.capacity == 0 || config.queue.max_concurrent == 0) {
        return Err(ConfigError::ValidationError(
            "Queue capacity and max_concurrent must be positive when the queue is enabled"
                .to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Database Max Connections: {}", config.database.max_connections);
    tracing::info!(
        "LLM Timeout: {}s (stream {}s), temperature {}, max_tokens {}",
        config.llm.timeout_secs,
        config.llm.stream_timeout_secs,
        config.llm.temperature,
        config.llm.max_tokens
    );
    tracing::info!("Vector Store: {}", config.vector.url);
    tracing::info!(
        "Vector Collection Prefix: {} (dimension {})",
        config.vector.collection_prefix,
        config.vector.dimension
    );
    tracing::info!(
        "Retrieval: top_k={}, min_score={}",
        config.retrieval.top_k,
        config.retrieval.min_score
    );
    tracing::info!("Queue Enabled: {}", config.queue.enabled);
    if config.queue.enabled {
        tracing::info!("Queue Capacity: {}", config.queue.capacity);
        tracing::info!("Queue Max Concurrent: {}", config.queue.max_concurrent);
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
