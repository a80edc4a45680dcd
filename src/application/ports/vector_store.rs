//! Vector Store Port - 向量检索存储
//!
//! 具体实现在 infrastructure/adapters/vector

use async_trait::async_trait;
use thiserror::Error;

use super::ModelCredential;

/// 向量库错误
#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Service error: {0}")]
    Service(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 检索命中的片段
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSnippet {
    pub text: String,
    pub score: f32,
}

/// Vector Store Port
///
/// `collection` 为集合名，`model` 为执行向量化所用的凭据
#[async_trait]
pub trait VectorStorePort: Send + Sync {
    /// 向量化并存储文本，返回条目 ID
    async fn store(
        &self,
        collection: &str,
        text: &str,
        model: &ModelCredential,
    ) -> Result<String, VectorStoreError>;

    /// 最近邻检索，按相似度降序
    async fn search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
        min_score: f32,
        model: &ModelCredential,
    ) -> Result<Vec<ScoredSnippet>, VectorStoreError>;

    /// 删除条目
    async fn delete(&self, collection: &str, vector_id: &str) -> Result<(), VectorStoreError>;
}
