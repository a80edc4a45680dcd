//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod frame_publisher;
mod generation_queue;
mod llm_backend;
mod repositories;
mod stream_registry;
mod vector_store;

pub use frame_publisher::FramePublisherPort;
pub use generation_queue::{GenerationMessage, GenerationQueuePort, GenerationTarget, QueueError};
pub use llm_backend::{EmbeddingPort, GenerationBackendPort, LlmError, StreamSink};
pub use repositories::{
    ChapterRecord, ChapterRepositoryPort, ChapterStatus, CredentialRepositoryPort, KnowledgeEntry,
    KnowledgeRepositoryPort, ModelCredential, ModelKind, NovelRecord, NovelRepositoryPort,
    NovelStatus, RepositoryError, TaskRepositoryPort,
};
pub use stream_registry::{StreamRegistryError, StreamRegistryPort, StreamSession};
pub use vector_store::{ScoredSnippet, VectorStorePort, VectorStoreError};
