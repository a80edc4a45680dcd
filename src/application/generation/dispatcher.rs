//! Dispatcher - 生成请求派发
//!
//! 校验前置条件 -> 建立任务 -> 投递队列或内联执行。
//! 前置条件不满足时不创建任务。

use std::sync::Arc;

use crate::application::commands::{DispatchGeneration, DispatchResponse, GenerationRequest};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChapterRepositoryPort, GenerationMessage, GenerationQueuePort, GenerationTarget,
    NovelRepositoryPort,
};

use super::executor::GenerationExecutor;
use super::ledger::TaskLedger;
use super::pipeline::{task_kind, GenerationPipeline};
use super::{chapter_for, ensure_owner};

pub struct Dispatcher {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    pipeline: Arc<GenerationPipeline>,
    ledger: Arc<TaskLedger>,
    executor: Arc<GenerationExecutor>,
    queue: Option<Arc<dyn GenerationQueuePort>>,
}

impl Dispatcher {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        pipeline: Arc<GenerationPipeline>,
        ledger: Arc<TaskLedger>,
        executor: Arc<GenerationExecutor>,
        queue: Option<Arc<dyn GenerationQueuePort>>,
    ) -> Self {
        Self {
            novel_repo,
            chapter_repo,
            pipeline,
            ledger,
            executor,
            queue,
        }
    }

    pub async fn handle(
        &self,
        cmd: DispatchGeneration,
    ) -> Result<DispatchResponse, ApplicationError> {
        let novel_id = cmd.request.novel_id();
        ensure_owner(self.novel_repo.as_ref(), novel_id, &cmd.requester).await?;

        let novel = self
            .novel_repo
            .find_by_id(novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", novel_id))?;
        self.pipeline.chat_model(&novel.owner_id).await?;

        let target = match cmd.request {
            GenerationRequest::Structure { novel_id } => GenerationTarget::Structure { novel_id },
            GenerationRequest::Outline { novel_id } => {
                if !novel.has_structure() {
                    return Err(ApplicationError::validation(
                        "Novel structure must be generated before the outline",
                    ));
                }
                GenerationTarget::Outline { novel_id }
            }
            GenerationRequest::Chapter {
                novel_id,
                chapter_number,
                seed,
            } => {
                let chapter =
                    chapter_for(self.chapter_repo.as_ref(), novel_id, chapter_number, &seed)
                        .await?;
                GenerationTarget::ChapterContent {
                    novel_id,
                    chapter_id: chapter.id,
                }
            }
        };

        let task = self
            .ledger
            .reopen_or_create(task_kind(&target), target.subject_id())
            .await?;

        let mut inline_fallback = false;
        if cmd.run_async {
            match &self.queue {
                Some(queue) => {
                    let message = GenerationMessage {
                        task_id: task.id,
                        target,
                    };
                    match queue.publish(message) {
                        Ok(()) => {
                            tracing::info!(
                                task_id = %task.id,
                                novel_id = %novel_id,
                                task_type = %task.kind,
                                "Generation queued"
                            );
                            return Ok(DispatchResponse {
                                task,
                                target,
                                queued: true,
                                inline_fallback: false,
                            });
                        }
                        Err(e) => {
                            tracing::warn!(
                                task_id = %task.id,
                                error = %e,
                                "Queue publish failed, falling back to inline execution"
                            );
                            inline_fallback = true;
                        }
                    }
                }
                None => {
                    tracing::warn!(
                        task_id = %task.id,
                        "No generation queue configured, executing inline"
                    );
                    inline_fallback = true;
                }
            }
        }

        let task = self.executor.execute(task.id, target).await?;

        Ok(DispatchResponse {
            task,
            target,
            queued: false,
            inline_fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::ChapterSeed;
    use crate::application::generation::testing::{Fixture, OWNER};
    use crate::application::ports::{ChapterStatus, LlmError, QueueError};
    use crate::domain::task::{TaskKind, TaskStatus};
    use crate::infrastructure::memory::InMemoryGenerationQueue;
    use tokio::sync::mpsc;

    fn dispatch(request: GenerationRequest, run_async: bool) -> DispatchGeneration {
        DispatchGeneration {
            requester: OWNER.to_string(),
            request,
            run_async,
        }
    }

    #[tokio::test]
    async fn test_async_without_queue_runs_inline() {
        let fx = Fixture::new().await;
        fx.backend.push_complete(Ok("结构".to_string()));
        let novel = fx.seed_novel(false).await;

        let resp = fx
            .dispatcher(None)
            .handle(dispatch(GenerationRequest::Structure { novel_id: novel.id }, true))
            .await
            .unwrap();
        assert!(!resp.queued);
        assert!(resp.inline_fallback);
        assert_eq!(resp.task.status, TaskStatus::Complete);
        assert_eq!(
            fx.novel_repo.find_by_id(novel.id).await.unwrap().unwrap().structure.as_deref(),
            Some("结构")
        );
    }

    #[tokio::test]
    async fn test_async_with_queue_returns_pending() {
        let fx = Fixture::new().await;
        let novel = fx.seed_novel(false).await;
        let (tx, mut rx) = mpsc::channel(8);
        let queue = InMemoryGenerationQueue::new(tx);

        let resp = fx
            .dispatcher(Some(Arc::new(queue)))
            .handle(dispatch(GenerationRequest::Structure { novel_id: novel.id }, true))
            .await
            .unwrap();
        assert!(resp.queued);
        assert!(!resp.inline_fallback);
        assert_eq!(resp.task.status, TaskStatus::Pending);

        let message = rx.recv().await.unwrap();
        assert_eq!(message.task_id, resp.task.id);
        assert_eq!(message.target, GenerationTarget::Structure { novel_id: novel.id });
        assert!(fx.backend.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_closed_queue_falls_back_inline() {
        let fx = Fixture::new().await;
        fx.backend.push_complete(Ok("结构".to_string()));
        let novel = fx.seed_novel(false).await;
        let (tx, rx) = mpsc::channel(8);
        let queue = InMemoryGenerationQueue::new(tx);
        drop(rx);
        assert!(matches!(
            queue.publish(GenerationMessage {
                task_id: uuid::Uuid::new_v4(),
                target: GenerationTarget::Structure { novel_id: novel.id },
            }),
            Err(QueueError::Closed)
        ));

        let resp = fx
            .dispatcher(Some(Arc::new(queue)))
            .handle(dispatch(GenerationRequest::Structure { novel_id: novel.id }, true))
            .await
            .unwrap();
        assert!(!resp.queued);
        assert!(resp.inline_fallback);
        assert_eq!(resp.task.status, TaskStatus::Complete);
    }

    #[tokio::test]
    async fn test_sync_request_is_not_a_fallback() {
        let fx = Fixture::new().await;
        fx.backend.push_complete(Ok("结构".to_string()));
        let novel = fx.seed_novel(false).await;

        let resp = fx
            .dispatcher(None)
            .handle(dispatch(GenerationRequest::Structure { novel_id: novel.id }, false))
            .await
            .unwrap();
        assert!(!resp.queued);
        assert!(!resp.inline_fallback);
    }

    #[tokio::test]
    async fn test_chapter_request_seeds_new_chapter() {
        let fx = Fixture::new().await;
        let novel = fx.seed_novel(true).await;
        fx.backend.push_complete(Ok("正文".to_string()));

        let resp = fx
            .dispatcher(None)
            .handle(dispatch(
                GenerationRequest::Chapter {
                    novel_id: novel.id,
                    chapter_number: 1,
                    seed: ChapterSeed {
                        title: Some("下山".to_string()),
                        abstract_content: Some("主角下山历练".to_string()),
                    },
                },
                false,
            ))
            .await
            .unwrap();
        assert_eq!(resp.task.status, TaskStatus::Complete);

        // 已有摘要，不再请求模型生成摘要
        assert_eq!(fx.backend.prompts().len(), 1);
        let chapter = fx
            .chapter_repo
            .find_by_number(novel.id, 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(chapter.title.as_deref(), Some("下山"));
        assert_eq!(chapter.abstract_content.as_deref(), Some("主角下山历练"));
        assert!(fx.backend.prompts()[0].contains("下山"));
    }

    #[tokio::test]
    async fn test_preconditions_create_no_task() {
        let fx = Fixture::new().await;
        let novel = fx.seed_novel_without_model(false).await;
        let dispatcher = fx.dispatcher(None);

        let err = dispatcher
            .handle(dispatch(GenerationRequest::Structure { novel_id: novel.id }, false))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));

        let err = dispatcher
            .handle(dispatch(
                GenerationRequest::Structure {
                    novel_id: uuid::Uuid::new_v4(),
                },
                false,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));

        assert!(fx.ledger().list_by_subject(novel.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_requester_is_forbidden() {
        let fx = Fixture::new().await;
        let novel = fx.seed_novel(false).await;

        let err = fx
            .dispatcher(None)
            .handle(DispatchGeneration {
                requester: "someone-else".to_string(),
                request: GenerationRequest::Structure { novel_id: novel.id },
                run_async: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_retry_after_failure_overwrites_content() {
        let fx = Fixture::new().await;
        let novel = fx.seed_novel(true).await;
        let dispatcher = fx.dispatcher(None);
        let request = || GenerationRequest::Chapter {
            novel_id: novel.id,
            chapter_number: 1,
            seed: ChapterSeed::default(),
        };

        // 第一次：生成成功得到旧内容
        fx.backend.push_complete(Ok("旧内容".to_string()));
        fx.backend.push_complete(Ok("旧摘要".to_string()));
        let first = dispatcher.handle(dispatch(request(), false)).await.unwrap();

        // 第二次：模型失败
        fx.backend.push_complete(Err(LlmError::Timeout));
        let err = dispatcher.handle(dispatch(request(), false)).await.unwrap_err();
        assert!(matches!(err, ApplicationError::ExternalServiceError(_)));
        let failed = fx
            .ledger()
            .list_by_subject(first.target.subject_id())
            .await
            .unwrap()
            .into_iter()
            .find(|t| t.status == TaskStatus::Failed)
            .unwrap();

        // 第三次：复用失败任务，内容被完整替换
        fx.backend.push_complete(Ok("新内容".to_string()));
        let retried = dispatcher.handle(dispatch(request(), false)).await.unwrap();
        assert_eq!(retried.task.id, failed.id);
        assert_eq!(retried.task.status, TaskStatus::Complete);
        assert_eq!(retried.task.kind, TaskKind::ChapterContent);

        let chapter = fx
            .chapter_repo
            .find_by_number(novel.id, 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(chapter.content.as_deref(), Some("新内容"));
        assert_eq!(chapter.status, ChapterStatus::Complete);
        // 重新生成保留第一次的摘要
        assert_eq!(chapter.abstract_content.as_deref(), Some("旧摘要"));
        assert_eq!(
            fx.chapter_repo.find_by_novel_id(novel.id).await.unwrap().len(),
            1
        );
    }
}
