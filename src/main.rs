//! Quill - 小说/章节生成编排服务
//!
//! - Domain: task, outline, context, prompt, stream
//! - Application: generation, commands, queries, ports
//! - Infrastructure: http, memory, worker, persistence, adapters, events

use std::sync::Arc;

use quill::application::{
    ContextAssembler, Dispatcher, GenerationExecutor, GenerationPipeline, GenerationQueuePort,
    RetrievalSettings, StreamRelay, TaskLedger,
};
use quill::config::{load_config, print_config, AppConfig};
use quill::infrastructure::adapters::{
    OpenAiClientConfig, OpenAiCompatibleClient, QdrantConfig, QdrantVectorStore,
};
use quill::infrastructure::events::EventPublisher;
use quill::infrastructure::http::{AppState, HttpServer, ServerConfig};
use quill::infrastructure::memory::{InMemoryGenerationQueue, InMemoryStreamRegistry};
use quill::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteChapterRepository,
    SqliteCredentialRepository, SqliteKnowledgeRepository, SqliteNovelRepository,
    SqliteTaskRepository,
};
use quill::infrastructure::worker::{GenerationWorker, GenerationWorkerConfig};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log.filter_directive()));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_logging(&config);
    tracing::info!("Quill - 小说生成编排服务");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig::new(&config.database.path, config.database.max_connections);
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // 创建 Repository 适配器
    let novel_repo = Arc::new(SqliteNovelRepository::new(pool.clone()));
    let chapter_repo = Arc::new(SqliteChapterRepository::new(pool.clone()));
    let task_repo = Arc::new(SqliteTaskRepository::new(pool.clone()));
    let credential_repo = Arc::new(SqliteCredentialRepository::new(pool.clone()));
    let knowledge_repo = Arc::new(SqliteKnowledgeRepository::new(pool));

    // 创建模型客户端与向量库
    let llm_client = Arc::new(OpenAiCompatibleClient::new(OpenAiClientConfig {
        timeout_secs: config.llm.timeout_secs,
        stream_timeout_secs: config.llm.stream_timeout_secs,
        temperature: config.llm.temperature,
        max_tokens: config.llm.max_tokens,
    }));
    let vector_store = Arc::new(QdrantVectorStore::new(
        QdrantConfig {
            url: config.vector.url.clone(),
            api_key: config.vector.api_key.clone(),
            dimension: config.vector.dimension,
            ..Default::default()
        },
        llm_client.clone(),
    )?);

    // 生成编排
    let retrieval = RetrievalSettings {
        top_k: config.retrieval.top_k,
        min_score: config.retrieval.min_score,
        collection_prefix: config.vector.collection_prefix.clone(),
    };
    let assembler = Arc::new(ContextAssembler::new(
        chapter_repo.clone(),
        credential_repo.clone(),
        vector_store.clone(),
        retrieval.clone(),
    ));
    let pipeline = Arc::new(GenerationPipeline::new(
        novel_repo.clone(),
        chapter_repo.clone(),
        credential_repo.clone(),
        llm_client,
        vector_store.clone(),
        assembler,
    ));
    let ledger = Arc::new(TaskLedger::new(task_repo));
    let executor = Arc::new(GenerationExecutor::new(ledger.clone(), pipeline.clone()));

    // 创建生成队列并启动 Worker
    let queue: Option<Arc<dyn GenerationQueuePort>> = if config.queue.enabled {
        let (queue_tx, queue_rx) = mpsc::channel(config.queue.capacity);
        let worker = GenerationWorker::new(
            GenerationWorkerConfig {
                max_concurrent: config.queue.max_concurrent,
            },
            queue_rx,
            executor.clone(),
        );
        tokio::spawn(worker.run());
        Some(InMemoryGenerationQueue::new(queue_tx).arc())
    } else {
        tracing::warn!("Generation queue disabled, async requests run inline");
        None
    };

    let dispatcher = Arc::new(Dispatcher::new(
        novel_repo.clone(),
        chapter_repo.clone(),
        pipeline.clone(),
        ledger.clone(),
        executor,
        queue,
    ));

    // 流式会话
    let event_publisher = EventPublisher::new().arc();
    let relay = Arc::new(StreamRelay::new(
        InMemoryStreamRegistry::new().arc(),
        event_publisher.clone(),
        novel_repo.clone(),
        chapter_repo.clone(),
        pipeline,
        ledger.clone(),
    ));

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let state = AppState::new(
        novel_repo,
        chapter_repo,
        credential_repo,
        knowledge_repo,
        vector_store,
        retrieval,
        ledger,
        dispatcher,
        relay,
        event_publisher,
    );

    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Received shutdown signal"),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for ctrl-c");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
