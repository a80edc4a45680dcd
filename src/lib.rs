//! Quill - 小说/章节生成编排服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Task: 生成任务生命周期
//! - Outline / Numerals: 章节大纲解析
//! - Context / Prompt: 上下文与提示词
//! - Stream: 流式会话键与推送帧
//!
//! 应用层 (application/):
//! - Ports: 端口定义（Repositories, GenerationBackend, VectorStore, StreamRegistry, GenerationQueue）
//! - Generation: TaskLedger, ContextAssembler, Dispatcher, StreamRelay
//! - Commands / Queries: CQRS 处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket
//! - Memory: GenerationQueue, StreamRegistry 内存实现
//! - Worker: GenerationWorker 后台任务处理
//! - Persistence: SQLite 存储
//! - Adapters: OpenAI 兼容客户端, Qdrant 向量库
//! - Events: 流式帧发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
