//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（Repository、GenerationBackend、VectorStore、StreamRegistry 等）
//! - generation: 任务台账、上下文组装、派发与流式转发
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod generation;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // Generation commands
    ChapterSeed,
    DispatchGeneration,
    DispatchResponse,
    GenerationRequest,
    // Stream commands
    StartStream,
    StopStream,
    StopStreamResponse,
    StreamStarted,
    // Novel commands
    CreateNovel,
    SaveModel,
    // Chapter commands
    CreateChapter,
    DeleteChapter,
    UpdateChapter,
    // Knowledge commands
    DeleteKnowledge,
    UploadKnowledge,
    // Handlers
    handlers::{
        CreateChapterHandler, CreateNovelHandler, CreateNovelResponse, DeleteChapterHandler,
        DeleteKnowledgeHandler, SaveModelHandler, SaveModelResponse, UpdateChapterHandler,
        UploadKnowledgeHandler,
    },
};

pub use error::ApplicationError;

pub use generation::{
    ContextAssembler, Dispatcher, GenerationExecutor, GenerationPipeline, RetrievalSettings,
    StreamRelay, TaskLedger,
};

pub use ports::{
    ChapterRecord, ChapterRepositoryPort, ChapterStatus, CredentialRepositoryPort, EmbeddingPort,
    FramePublisherPort, GenerationBackendPort, GenerationMessage, GenerationQueuePort,
    GenerationTarget, KnowledgeEntry, KnowledgeRepositoryPort, LlmError, ModelCredential,
    ModelKind, NovelRecord, NovelRepositoryPort, NovelStatus, QueueError, RepositoryError, StreamRegistryPort, TaskRepositoryPort,
    VectorStoreError, VectorStorePort,
};

pub use queries::{
    GetNovel, GetTask, ListActiveTasks, ListChapters, ListKnowledge, ListNovels, ListStaleTasks,
    ListTasksBySubject,
    // Handlers
    handlers::{
        GetNovelHandler, ListChaptersHandler, ListKnowledgeHandler, ListNovelsHandler,
        TaskQueryHandler,
    },
};
