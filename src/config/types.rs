//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 大模型调用配置
    #[serde(default)]
    pub llm: LlmConfig,

    /// 向量库配置
    #[serde(default)]
    pub vector: VectorConfig,

    /// 检索配置
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// 生成队列配置
    #[serde(default)]
    pub queue: QueueConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5070
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/quill.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// 大模型调用配置，凭据由用户各自保存
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// 阻塞式请求超时（秒）
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    /// 流式请求超时（秒）
    #[serde(default = "default_stream_timeout")]
    pub stream_timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_llm_timeout() -> u64 {
    300
}

fn default_stream_timeout() -> u64 {
    600
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    8192
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_llm_timeout(),
            stream_timeout_secs: default_stream_timeout(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// 向量库（Qdrant）配置
#[derive(Debug, Clone, Deserialize)]
pub struct VectorConfig {
    /// gRPC 地址（Qdrant 默认 6334 端口）
    #[serde(default = "default_vector_url")]
    pub url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// 每本小说一个集合：`{collection_prefix}{novel_id}`
    #[serde(default = "default_collection_prefix")]
    pub collection_prefix: String,

    /// 向量维度，需与 embedding 模型一致
    #[serde(default = "default_dimension")]
    pub dimension: u64,
}

fn default_vector_url() -> String {
    "http://localhost:6334".to_string()
}

fn default_collection_prefix() -> String {
    "novel_".to_string()
}

fn default_dimension() -> u64 {
    1536
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            url: default_vector_url(),
            api_key: None,
            collection_prefix: default_collection_prefix(),
            dimension: default_dimension(),
        }
    }
}

/// 检索配置
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// 低于该相似度的片段丢弃
    #[serde(default)]
    pub min_score: f32,
}

fn default_top_k() -> usize {
    3
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            min_score: 0.0,
        }
    }
}

/// 生成队列配置
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// 关闭时所有异步请求都退化为内联执行
    #[serde(default = "default_queue_enabled")]
    pub enabled: bool,

    #[serde(default = "default_queue_capacity")]
    pub capacity: usize,

    /// worker 最大并发
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_queue_enabled() -> bool {
    true
}

fn default_queue_capacity() -> usize {
    1000
}

fn default_max_concurrent() -> usize {
    2
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            enabled: default_queue_enabled(),
            capacity: default_queue_capacity(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl LogConfig {
    /// 默认的 EnvFilter 指令，RUST_LOG 优先
    pub fn filter_directive(&self) -> String {
        format!("{0},quill={0},tower_http=debug", self.level)
    }
}
