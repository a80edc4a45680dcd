//! StreamRelay - 流式生成转发
//!
//! 每个 (小说, 变体) 键同时只允许一个会话。会话状态:
//! `Idle -> Streaming -> {Completed | Stopped | Errored}`
//!
//! 顺序约束:
//! 1. 先登记会话（取消标志）再做归属校验，并发的停止请求不会丢失
//! 2. 完成/出错时先注销会话，再写结果并推送终止帧
//! 3. 停止只抑制转发与落库，不中断上游模型调用

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::application::commands::{StartStream, StopStream, StopStreamResponse, StreamStarted};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChapterRepositoryPort, FramePublisherPort, GenerationTarget, LlmError, NovelRepositoryPort,
    StreamRegistryPort, StreamSession, StreamSink,
};
use crate::domain::task::TaskStatus;
use crate::domain::{StreamFrame, StreamKey, StreamVariant};

use super::ledger::TaskLedger;
use super::pipeline::{task_kind, GenerationPipeline, PreparedGeneration};
use super::{chapter_for, ensure_owner};

pub struct StreamRelay {
    registry: Arc<dyn StreamRegistryPort>,
    publisher: Arc<dyn FramePublisherPort>,
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    pipeline: Arc<GenerationPipeline>,
    ledger: Arc<TaskLedger>,
}

impl StreamRelay {
    pub fn new(
        registry: Arc<dyn StreamRegistryPort>,
        publisher: Arc<dyn FramePublisherPort>,
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        pipeline: Arc<GenerationPipeline>,
        ledger: Arc<TaskLedger>,
    ) -> Self {
        Self {
            registry,
            publisher,
            novel_repo,
            chapter_repo,
            pipeline,
            ledger,
        }
    }

    /// 开始一次流式生成，模型调用在后台任务中进行
    ///
    /// 同一键已有活动会话时返回 `Conflict`，不向该目的地推送任何帧
    pub async fn start(&self, cmd: StartStream) -> Result<StreamStarted, ApplicationError> {
        let key = StreamKey::new(cmd.novel_id, cmd.variant);
        let session = self.registry.register(key)?;
        let destination = session.destination();

        tracing::info!(
            stream_key = %key,
            session_id = %session.id,
            requester = %cmd.requester,
            "Stream session registered"
        );

        match self.launch(&cmd, &session).await {
            Ok(task_id) => Ok(StreamStarted {
                session_id: session.id,
                task_id,
                destination,
            }),
            Err(e) => {
                self.registry.release(&key, session.id);
                tracing::warn!(stream_key = %key, error = %e, "Stream start rejected");
                self.publisher
                    .publish(&destination, StreamFrame::error(e.to_string()));
                Err(e)
            }
        }
    }

    /// 请求停止：设置取消标志；会话不存在时只记录日志
    pub async fn stop(&self, cmd: StopStream) -> Result<StopStreamResponse, ApplicationError> {
        ensure_owner(self.novel_repo.as_ref(), cmd.novel_id, &cmd.requester).await?;

        let key = StreamKey::new(cmd.novel_id, cmd.variant);
        let stopped = self.registry.cancel(&key);
        if stopped {
            tracing::info!(stream_key = %key, "Stream stop requested");
        } else {
            tracing::warn!(stream_key = %key, "Stream not found, stop ignored");
        }
        Ok(StopStreamResponse { stopped })
    }

    /// 归属校验 -> 凭据检查 -> 准备 -> 建立任务 -> 后台启动模型流
    ///
    /// 凭据检查在创建章节占位之前，缺少模型时不留下空章节
    async fn launch(
        &self,
        cmd: &StartStream,
        session: &StreamSession,
    ) -> Result<Uuid, ApplicationError> {
        ensure_owner(self.novel_repo.as_ref(), cmd.novel_id, &cmd.requester).await?;
        self.pipeline.chat_model(&cmd.requester).await?;

        let target = match cmd.variant {
            StreamVariant::Structure => GenerationTarget::Structure {
                novel_id: cmd.novel_id,
            },
            StreamVariant::Outline => GenerationTarget::Outline {
                novel_id: cmd.novel_id,
            },
            StreamVariant::Chapter(number) => {
                let chapter =
                    chapter_for(self.chapter_repo.as_ref(), cmd.novel_id, number, &cmd.seed)
                        .await?;
                GenerationTarget::ChapterContent {
                    novel_id: cmd.novel_id,
                    chapter_id: chapter.id,
                }
            }
        };

        let prepared = self.pipeline.prepare(target).await?;
        let task = self
            .ledger
            .reopen_or_create(task_kind(&target), target.subject_id())
            .await?;
        self.ledger.transition(task.id, TaskStatus::Processing).await?;
        if let Err(e) = self.pipeline.mark_processing(&prepared).await {
            self.ledger.fail(task.id, &e.to_string()).await;
            return Err(e);
        }

        let sink = Arc::new(RelaySink {
            session: session.clone(),
            task_id: task.id,
            registry: self.registry.clone(),
            publisher: self.publisher.clone(),
            pipeline: self.pipeline.clone(),
            ledger: self.ledger.clone(),
            accumulated: Mutex::new(String::new()),
            prepared: prepared.clone(),
        });

        let backend = self.pipeline.backend().clone();
        tokio::spawn(async move {
            backend
                .stream(&prepared.model, &prepared.prompt, sink)
                .await;
        });

        tracing::info!(
            stream_key = %session.key,
            task_id = %task.id,
            "Stream started"
        );
        Ok(task.id)
    }
}

/// 单个会话的流式回调
struct RelaySink {
    session: StreamSession,
    task_id: Uuid,
    registry: Arc<dyn StreamRegistryPort>,
    publisher: Arc<dyn FramePublisherPort>,
    pipeline: Arc<GenerationPipeline>,
    ledger: Arc<TaskLedger>,
    accumulated: Mutex<String>,
    prepared: PreparedGeneration,
}

impl RelaySink {
    fn publish(&self, frame: StreamFrame) {
        self.publisher.publish(&self.session.destination(), frame);
    }

    fn release(&self) {
        self.registry.release(&self.session.key, self.session.id);
    }
}

#[async_trait]
impl StreamSink for RelaySink {
    async fn on_delta(&self, text: &str) {
        if self.session.is_cancelled() {
            tracing::debug!(stream_key = %self.session.key, "Stream stopped, delta dropped");
            return;
        }
        self.accumulated.lock().await.push_str(text);
        self.publish(StreamFrame::delta(text));
    }

    async fn on_complete(&self, full_text: String) {
        self.release();

        if self.session.is_cancelled() {
            tracing::info!(
                stream_key = %self.session.key,
                task_id = %self.task_id,
                "Stream stopped, result discarded"
            );
            self.pipeline.restore(&self.prepared).await;
            self.ledger.fail(self.task_id, "stopped by requester").await;
            self.publish(StreamFrame::stopped());
            return;
        }

        let text = if full_text.is_empty() {
            std::mem::take(&mut *self.accumulated.lock().await)
        } else {
            full_text
        };

        let outcome = match self.pipeline.persist(&self.prepared, text).await {
            Ok(()) => self
                .ledger
                .transition(self.task_id, TaskStatus::Complete)
                .await
                .map(|_| ()),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                tracing::info!(
                    stream_key = %self.session.key,
                    task_id = %self.task_id,
                    "Stream completed"
                );
                self.publish(StreamFrame::complete());
            }
            Err(e) => {
                tracing::error!(
                    stream_key = %self.session.key,
                    task_id = %self.task_id,
                    error = %e,
                    "Failed to finish streamed generation"
                );
                self.pipeline.restore(&self.prepared).await;
                self.ledger.fail(self.task_id, &e.to_string()).await;
                self.publish(StreamFrame::error(e.to_string()));
            }
        }
    }

    async fn on_error(&self, error: LlmError) {
        self.release();
        tracing::error!(
            stream_key = %self.session.key,
            task_id = %self.task_id,
            error = %error,
            "Stream generation failed"
        );
        self.pipeline.restore(&self.prepared).await;
        self.ledger.fail(self.task_id, &error.to_string()).await;
        self.publish(StreamFrame::error(error.to_string()));
    }
}
