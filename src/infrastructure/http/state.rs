//! Application State
//!
//! 包含所有 Command/Query Handlers 与生成编排服务的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    CreateChapterHandler, CreateNovelHandler, DeleteChapterHandler, DeleteKnowledgeHandler,
    SaveModelHandler, UpdateChapterHandler, UploadKnowledgeHandler,
    // Query handlers
    GetNovelHandler, ListChaptersHandler, ListKnowledgeHandler, ListNovelsHandler,
    TaskQueryHandler,
    // Generation
    Dispatcher, RetrievalSettings, StreamRelay, TaskLedger,
    // Ports
    ChapterRepositoryPort, CredentialRepositoryPort, KnowledgeRepositoryPort, NovelRepositoryPort,
    VectorStorePort,
};
use crate::infrastructure::events::EventPublisher;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub event_publisher: Arc<EventPublisher>,

    // ========== Generation ==========
    pub dispatcher: Arc<Dispatcher>,
    pub relay: Arc<StreamRelay>,

    // ========== Command Handlers ==========
    pub create_novel_handler: CreateNovelHandler,
    pub save_model_handler: SaveModelHandler,
    pub create_chapter_handler: CreateChapterHandler,
    pub update_chapter_handler: UpdateChapterHandler,
    pub delete_chapter_handler: DeleteChapterHandler,
    pub upload_knowledge_handler: UploadKnowledgeHandler,
    pub delete_knowledge_handler: DeleteKnowledgeHandler,

    // ========== Query Handlers ==========
    pub get_novel_handler: GetNovelHandler,
    pub list_novels_handler: ListNovelsHandler,
    pub list_chapters_handler: ListChaptersHandler,
    pub list_knowledge_handler: ListKnowledgeHandler,
    pub task_query_handler: TaskQueryHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        credential_repo: Arc<dyn CredentialRepositoryPort>,
        knowledge_repo: Arc<dyn KnowledgeRepositoryPort>,
        vector_store: Arc<dyn VectorStorePort>,
        retrieval: RetrievalSettings,
        ledger: Arc<TaskLedger>,
        dispatcher: Arc<Dispatcher>,
        relay: Arc<StreamRelay>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            // Ports
            event_publisher,

            // Generation
            dispatcher,
            relay,

            // Command handlers
            create_novel_handler: CreateNovelHandler::new(novel_repo.clone()),
            save_model_handler: SaveModelHandler::new(credential_repo.clone()),
            create_chapter_handler: CreateChapterHandler::new(
                novel_repo.clone(),
                chapter_repo.clone(),
            ),
            update_chapter_handler: UpdateChapterHandler::new(
                novel_repo.clone(),
                chapter_repo.clone(),
            ),
            delete_chapter_handler: DeleteChapterHandler::new(
                novel_repo.clone(),
                chapter_repo.clone(),
                vector_store.clone(),
                retrieval.clone(),
            ),
            upload_knowledge_handler: UploadKnowledgeHandler::new(
                novel_repo.clone(),
                credential_repo,
                knowledge_repo.clone(),
                vector_store.clone(),
                retrieval.clone(),
            ),
            delete_knowledge_handler: DeleteKnowledgeHandler::new(
                novel_repo.clone(),
                knowledge_repo.clone(),
                vector_store,
                retrieval,
            ),

            // Query handlers
            get_novel_handler: GetNovelHandler::new(novel_repo.clone()),
            list_novels_handler: ListNovelsHandler::new(novel_repo.clone()),
            list_chapters_handler: ListChaptersHandler::new(novel_repo.clone(), chapter_repo),
            list_knowledge_handler: ListKnowledgeHandler::new(novel_repo, knowledge_repo),
            task_query_handler: TaskQueryHandler::new(ledger),
        }
    }
}
