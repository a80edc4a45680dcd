//! 测试夹具：内存 SQLite 仓储 + 脚本化的模型后端与向量库

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::application::ports::{
    ChapterRecord, ChapterRepositoryPort, CredentialRepositoryPort, GenerationBackendPort,
    GenerationQueuePort, KnowledgeRepositoryPort, LlmError, ModelCredential, ModelKind,
    NovelRecord, NovelRepositoryPort, ScoredSnippet, StreamSink, TaskRepositoryPort,
    VectorStoreError, VectorStorePort,
};
use crate::infrastructure::events::EventPublisher;
use crate::infrastructure::memory::InMemoryStreamRegistry;
use crate::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteChapterRepository,
    SqliteCredentialRepository, SqliteKnowledgeRepository, SqliteNovelRepository,
    SqliteTaskRepository,
};

use super::{
    ContextAssembler, Dispatcher, GenerationExecutor, GenerationPipeline, RetrievalSettings,
    StreamRelay, TaskLedger,
};

pub const OWNER: &str = "user-1";

// ============================================================================
// Scripted backend
// ============================================================================

/// 一次流式调用的脚本
pub struct StreamScript {
    deltas: Vec<String>,
    /// 输出完增量后等待放行再结束
    gate: Option<Arc<Notify>>,
    error: Option<LlmError>,
}

impl StreamScript {
    pub fn deltas(deltas: &[&str]) -> Self {
        Self {
            deltas: deltas.iter().map(|d| d.to_string()).collect(),
            gate: None,
            error: None,
        }
    }

    pub fn gated(deltas: &[&str]) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let mut script = Self::deltas(deltas);
        script.gate = Some(gate.clone());
        (script, gate)
    }

    pub fn failing(deltas: &[&str], error: LlmError) -> Self {
        let mut script = Self::deltas(deltas);
        script.error = Some(error);
        script
    }
}

#[derive(Default)]
pub struct ScriptedBackend {
    completes: Mutex<VecDeque<Result<String, LlmError>>>,
    streams: Mutex<VecDeque<StreamScript>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn push_complete(&self, result: Result<String, LlmError>) {
        self.completes.lock().unwrap().push_back(result);
    }

    pub fn push_stream(&self, script: StreamScript) {
        self.streams.lock().unwrap().push_back(script);
    }

    /// 收到过的提示词
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackendPort for ScriptedBackend {
    async fn complete(&self, _model: &ModelCredential, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.completes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Service("no scripted response".to_string())))
    }

    async fn stream(&self, _model: &ModelCredential, prompt: &str, sink: Arc<dyn StreamSink>) {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let script = self.streams.lock().unwrap().pop_front();
        let Some(script) = script else {
            sink.on_error(LlmError::Service("no scripted stream".to_string()))
                .await;
            return;
        };

        for delta in &script.deltas {
            sink.on_delta(delta).await;
        }
        if let Some(gate) = &script.gate {
            gate.notified().await;
        }
        match script.error {
            Some(error) => sink.on_error(error).await,
            None => sink.on_complete(script.deltas.concat()).await,
        }
    }
}

// ============================================================================
// Fake vector store
// ============================================================================

#[derive(Default)]
pub struct FakeVectorStore {
    fail: bool,
    results: Mutex<Vec<ScoredSnippet>>,
    stored: Mutex<Vec<(String, String)>>,
    deleted: Mutex<Vec<String>>,
    searches: Mutex<Vec<(String, String, usize)>>,
}

impl FakeVectorStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn set_search_results(&self, results: Vec<ScoredSnippet>) {
        *self.results.lock().unwrap() = results;
    }

    /// (条目 ID, 文本)
    pub fn stored(&self) -> Vec<(String, String)> {
        self.stored.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    /// (集合, 查询, 条数)
    pub fn searches(&self) -> Vec<(String, String, usize)> {
        self.searches.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), VectorStoreError> {
        if self.fail {
            Err(VectorStoreError::Network("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl VectorStorePort for FakeVectorStore {
    async fn store(
        &self,
        _collection: &str,
        text: &str,
        _model: &ModelCredential,
    ) -> Result<String, VectorStoreError> {
        self.check()?;
        let id = Uuid::new_v4().to_string();
        self.stored
            .lock()
            .unwrap()
            .push((id.clone(), text.to_string()));
        Ok(id)
    }

    async fn search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
        _min_score: f32,
        _model: &ModelCredential,
    ) -> Result<Vec<ScoredSnippet>, VectorStoreError> {
        self.searches
            .lock()
            .unwrap()
            .push((collection.to_string(), query.to_string(), limit));
        self.check()?;
        Ok(self.results.lock().unwrap().iter().take(limit).cloned().collect())
    }

    async fn delete(&self, _collection: &str, vector_id: &str) -> Result<(), VectorStoreError> {
        self.check()?;
        self.deleted.lock().unwrap().push(vector_id.to_string());
        Ok(())
    }
}

// ============================================================================
// Fixture
// ============================================================================

pub struct Fixture {
    pub novel_repo: Arc<dyn NovelRepositoryPort>,
    pub chapter_repo: Arc<dyn ChapterRepositoryPort>,
    pub task_repo: Arc<dyn TaskRepositoryPort>,
    pub credential_repo: Arc<dyn CredentialRepositoryPort>,
    pub knowledge_repo: Arc<dyn KnowledgeRepositoryPort>,
    pub backend: Arc<ScriptedBackend>,
    pub vector_store: Arc<FakeVectorStore>,
    pub publisher: Arc<EventPublisher>,
    pub registry: Arc<InMemoryStreamRegistry>,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_vector_store(FakeVectorStore::default()).await
    }

    pub async fn with_vector_store(vector_store: FakeVectorStore) -> Self {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        Self {
            novel_repo: Arc::new(SqliteNovelRepository::new(pool.clone())),
            chapter_repo: Arc::new(SqliteChapterRepository::new(pool.clone())),
            task_repo: Arc::new(SqliteTaskRepository::new(pool.clone())),
            credential_repo: Arc::new(SqliteCredentialRepository::new(pool.clone())),
            knowledge_repo: Arc::new(SqliteKnowledgeRepository::new(pool)),
            backend: Arc::new(ScriptedBackend::default()),
            vector_store: Arc::new(vector_store),
            publisher: EventPublisher::new().arc(),
            registry: InMemoryStreamRegistry::new().arc(),
        }
    }

    /// 小说 + 对话模型凭据
    pub async fn seed_novel(&self, with_structure: bool) -> NovelRecord {
        self.credential_repo
            .save(&ModelCredential::new(
                OWNER,
                ModelKind::Chat,
                "sk-test",
                "http://llm.test/v1",
                "chat-model",
            ))
            .await
            .unwrap();
        self.seed_novel_without_model(with_structure).await
    }

    pub async fn seed_novel_without_model(&self, with_structure: bool) -> NovelRecord {
        let mut novel = NovelRecord::new(OWNER, "青云志", "仙侠");
        novel.setting_text = Some("九州大陆，修真为尊".to_string());
        if with_structure {
            novel.structure = Some("三幕结构".to_string());
        }
        self.novel_repo.save(&novel).await.unwrap();
        novel
    }

    pub async fn seed_embedding_model(&self) {
        self.credential_repo
            .save(&ModelCredential::new(
                OWNER,
                ModelKind::Embedding,
                "sk-test",
                "http://llm.test/v1",
                "embedding-model",
            ))
            .await
            .unwrap();
    }

    pub async fn seed_chapter(
        &self,
        novel_id: Uuid,
        chapter_number: u32,
        summary: Option<&str>,
    ) -> ChapterRecord {
        let mut chapter = ChapterRecord::placeholder(novel_id, chapter_number, None);
        chapter.abstract_content = summary.map(str::to_string);
        self.chapter_repo.save(&chapter).await.unwrap();
        chapter
    }

    pub fn assembler(&self) -> ContextAssembler {
        ContextAssembler::new(
            self.chapter_repo.clone(),
            self.credential_repo.clone(),
            self.vector_store.clone(),
            RetrievalSettings::default(),
        )
    }

    pub fn pipeline(&self) -> Arc<GenerationPipeline> {
        Arc::new(GenerationPipeline::new(
            self.novel_repo.clone(),
            self.chapter_repo.clone(),
            self.credential_repo.clone(),
            self.backend.clone(),
            self.vector_store.clone(),
            Arc::new(self.assembler()),
        ))
    }

    pub fn ledger(&self) -> Arc<TaskLedger> {
        Arc::new(TaskLedger::new(self.task_repo.clone()))
    }

    pub fn executor(&self) -> GenerationExecutor {
        GenerationExecutor::new(self.ledger(), self.pipeline())
    }

    pub fn dispatcher(&self, queue: Option<Arc<dyn GenerationQueuePort>>) -> Dispatcher {
        Dispatcher::new(
            self.novel_repo.clone(),
            self.chapter_repo.clone(),
            self.pipeline(),
            self.ledger(),
            Arc::new(self.executor()),
            queue,
        )
    }

    pub fn relay(&self) -> StreamRelay {
        StreamRelay::new(
            self.registry.clone(),
            self.publisher.clone(),
            self.novel_repo.clone(),
            self.chapter_repo.clone(),
            self.pipeline(),
            self.ledger(),
        )
    }
}
