//! Generation Backend Port - 大模型生成能力抽象
//!
//! 具体实现在 infrastructure/adapters/llm

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::ModelCredential;

/// 模型调用错误
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    Service(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 流式输出的接收方
///
/// 一次 `stream` 调用恰好触发一次 `on_complete` 或 `on_error`，
/// 之前可以有任意次 `on_delta`，回调按顺序送达。
#[async_trait]
pub trait StreamSink: Send + Sync {
    async fn on_delta(&self, text: &str);

    async fn on_complete(&self, full_text: String);

    async fn on_error(&self, error: LlmError);
}

/// Generation Backend Port
#[async_trait]
pub trait GenerationBackendPort: Send + Sync {
    /// 阻塞式生成，返回完整文本
    async fn complete(&self, model: &ModelCredential, prompt: &str) -> Result<String, LlmError>;

    /// 流式生成，结果通过 `sink` 回调
    async fn stream(&self, model: &ModelCredential, prompt: &str, sink: Arc<dyn StreamSink>);
}

/// Embedding Port - 文本向量化
#[async_trait]
pub trait EmbeddingPort: Send + Sync {
    async fn embed(&self, model: &ModelCredential, text: &str) -> Result<Vec<f32>, LlmError>;
}
