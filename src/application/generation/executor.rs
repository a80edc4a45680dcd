//! GenerationExecutor - 阻塞式执行一次生成
//!
//! PROCESSING -> prepare -> 模型调用 -> persist -> COMPLETE，
//! 任一步失败：FAILED 并回退可见状态。Dispatcher 内联执行和队列 worker 共用。

use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::GenerationTarget;
use crate::domain::task::{Task, TaskStatus};

use super::ledger::TaskLedger;
use super::pipeline::{GenerationPipeline, PreparedGeneration};

pub struct GenerationExecutor {
    ledger: Arc<TaskLedger>,
    pipeline: Arc<GenerationPipeline>,
}

impl GenerationExecutor {
    pub fn new(ledger: Arc<TaskLedger>, pipeline: Arc<GenerationPipeline>) -> Self {
        Self { ledger, pipeline }
    }

    pub async fn execute(
        &self,
        task_id: Uuid,
        target: GenerationTarget,
    ) -> Result<Task, ApplicationError> {
        self.ledger.transition(task_id, TaskStatus::Processing).await?;

        let prepared = match self.pipeline.prepare(target).await {
            Ok(prepared) => prepared,
            Err(e) => {
                self.ledger.fail(task_id, &e.to_string()).await;
                return Err(e);
            }
        };

        let result = self.run(task_id, &prepared).await;

        match result {
            Ok(()) => {
                let task = self.ledger.transition(task_id, TaskStatus::Complete).await?;
                tracing::info!(task_id = %task_id, subject_id = %task.subject_id, "Task completed");
                Ok(task)
            }
            Err(e) => {
                tracing::error!(
                    task_id = %task_id,
                    novel_id = %target.novel_id(),
                    error = %e,
                    "Generation failed"
                );
                self.pipeline.restore(&prepared).await;
                self.ledger.fail(task_id, &e.to_string()).await;
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        task_id: Uuid,
        prepared: &PreparedGeneration,
    ) -> Result<(), ApplicationError> {
        self.pipeline.mark_processing(prepared).await?;

        let started = std::time::Instant::now();
        let text = self
            .pipeline
            .backend()
            .complete(&prepared.model, &prepared.prompt)
            .await?;
        tracing::info!(
            task_id = %task_id,
            chars = text.chars().count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Generation finished"
        );

        self.pipeline.persist(prepared, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::generation::testing::Fixture;
    use crate::application::ports::{ChapterStatus, LlmError, NovelStatus};
    use crate::domain::task::TaskKind;

    #[tokio::test]
    async fn test_execute_structure_completes() {
        let fx = Fixture::new().await;
        fx.backend.push_complete(Ok("## 核心种子".to_string()));
        let novel = fx.seed_novel(false).await;
        let ledger = fx.ledger();
        let task = ledger.create(TaskKind::Structure, novel.id).await.unwrap();

        let done = fx
            .executor()
            .execute(task.id, GenerationTarget::Structure { novel_id: novel.id })
            .await
            .unwrap();
        assert_eq!(done.status, TaskStatus::Complete);

        let novel = fx.novel_repo.find_by_id(novel.id).await.unwrap().unwrap();
        assert_eq!(novel.structure.as_deref(), Some("## 核心种子"));
        assert_eq!(novel.status, NovelStatus::Ready);
    }

    #[tokio::test]
    async fn test_execute_outline_syncs_chapters() {
        let fx = Fixture::new().await;
        fx.backend
            .push_complete(Ok("## 第一章 [开端]\n## 第二章 [转折]".to_string()));
        let novel = fx.seed_novel(true).await;
        let task = fx.ledger().create(TaskKind::Outline, novel.id).await.unwrap();

        fx.executor()
            .execute(task.id, GenerationTarget::Outline { novel_id: novel.id })
            .await
            .unwrap();

        let chapters = fx.chapter_repo.find_by_novel_id(novel.id).await.unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[1].title.as_deref(), Some("转折"));
    }

    #[tokio::test]
    async fn test_backend_failure_marks_failed_and_restores() {
        let fx = Fixture::new().await;
        fx.backend.push_complete(Err(LlmError::Service("503".to_string())));
        let novel = fx.seed_novel(true).await;
        let chapter = fx.seed_chapter(novel.id, 1, Some("摘要")).await;
        let task = fx
            .ledger()
            .create(TaskKind::ChapterContent, chapter.id)
            .await
            .unwrap();

        let err = fx
            .executor()
            .execute(
                task.id,
                GenerationTarget::ChapterContent {
                    novel_id: novel.id,
                    chapter_id: chapter.id,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::ExternalServiceError(_)));

        let task = fx.ledger().get(task.id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        let chapter = fx.chapter_repo.find_by_id(chapter.id).await.unwrap().unwrap();
        assert_eq!(chapter.status, ChapterStatus::Pending);
        assert_eq!(chapter.content, None);
    }
}
