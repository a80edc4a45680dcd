//! Chapter Command Handlers

use std::sync::Arc;

use chrono::Utc;

use crate::application::commands::{CreateChapter, DeleteChapter, UpdateChapter};
use crate::application::error::ApplicationError;
use crate::application::generation::{ensure_owner, non_blank, RetrievalSettings};
use crate::application::ports::{
    ChapterRecord, ChapterRepositoryPort, NovelRepositoryPort, RepositoryError, VectorStorePort,
};

/// CreateChapter Handler - 同一章节号已存在时返回 Conflict
pub struct CreateChapterHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl CreateChapterHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
    ) -> Self {
        Self {
            novel_repo,
            chapter_repo,
        }
    }

    pub async fn handle(&self, command: CreateChapter) -> Result<ChapterRecord, ApplicationError> {
        ensure_owner(self.novel_repo.as_ref(), command.novel_id, &command.requester).await?;
        if command.chapter_number == 0 {
            return Err(ApplicationError::validation("Chapter number must be positive"));
        }

        let mut chapter = ChapterRecord::placeholder(
            command.novel_id,
            command.chapter_number,
            non_blank(&command.title),
        );
        chapter.abstract_content = non_blank(&command.abstract_content);

        match self.chapter_repo.save(&chapter).await {
            Ok(()) => {}
            Err(RepositoryError::Duplicate(_)) => {
                return Err(ApplicationError::conflict(format!(
                    "Chapter {} already exists in novel {}",
                    command.chapter_number, command.novel_id
                )));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            novel_id = %chapter.novel_id,
            chapter_id = %chapter.id,
            chapter_number = chapter.chapter_number,
            "Chapter created"
        );
        Ok(chapter)
    }
}

/// UpdateChapter Handler - 只修改标题
pub struct UpdateChapterHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl UpdateChapterHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
    ) -> Self {
        Self {
            novel_repo,
            chapter_repo,
        }
    }

    pub async fn handle(&self, command: UpdateChapter) -> Result<ChapterRecord, ApplicationError> {
        let title = command.title.trim();
        if title.is_empty() {
            return Err(ApplicationError::validation("Chapter title must not be empty"));
        }

        let mut chapter = self
            .chapter_repo
            .find_by_id(command.chapter_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Chapter", command.chapter_id))?;
        ensure_owner(self.novel_repo.as_ref(), chapter.novel_id, &command.requester).await?;

        chapter.title = Some(title.to_string());
        chapter.updated_at = Utc::now();
        self.chapter_repo.save(&chapter).await?;

        tracing::info!(chapter_id = %chapter.id, title = %title, "Chapter title updated");
        Ok(chapter)
    }
}

/// DeleteChapter Handler
///
/// 先删向量条目（失败只记录日志），再删章节记录
pub struct DeleteChapterHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    vector_store: Arc<dyn VectorStorePort>,
    settings: RetrievalSettings,
}

impl DeleteChapterHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        vector_store: Arc<dyn VectorStorePort>,
        settings: RetrievalSettings,
    ) -> Self {
        Self {
            novel_repo,
            chapter_repo,
            vector_store,
            settings,
        }
    }

    pub async fn handle(&self, command: DeleteChapter) -> Result<(), ApplicationError> {
        let chapter = self
            .chapter_repo
            .find_by_id(command.chapter_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Chapter", command.chapter_id))?;
        ensure_owner(self.novel_repo.as_ref(), chapter.novel_id, &command.requester).await?;

        if let Some(vector_id) = chapter.vector_id.as_deref() {
            let collection = self.settings.collection_for(chapter.novel_id);
            if let Err(e) = self.vector_store.delete(&collection, vector_id).await {
                tracing::error!(
                    chapter_id = %chapter.id,
                    vector_id = %vector_id,
                    error = %e,
                    "Failed to delete chapter vector"
                );
            }
        }
        self.chapter_repo.delete(chapter.id).await?;

        tracing::info!(
            novel_id = %chapter.novel_id,
            chapter_id = %chapter.id,
            chapter_number = chapter.chapter_number,
            "Chapter deleted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::application::generation::testing::{FakeVectorStore, Fixture, OWNER};

    fn create(novel_id: Uuid, number: u32) -> CreateChapter {
        CreateChapter {
            requester: OWNER.to_string(),
            novel_id,
            chapter_number: number,
            title: Some("风雪夜归".to_string()),
            abstract_content: Some(" ".to_string()),
        }
    }

    fn delete_handler(fx: &Fixture) -> DeleteChapterHandler {
        DeleteChapterHandler::new(
            fx.novel_repo.clone(),
            fx.chapter_repo.clone(),
            fx.vector_store.clone(),
            RetrievalSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_create_chapter_with_title() {
        let fx = Fixture::new().await;
        let novel = fx.seed_novel(true).await;
        let handler = CreateChapterHandler::new(fx.novel_repo.clone(), fx.chapter_repo.clone());

        let chapter = handler.handle(create(novel.id, 1)).await.unwrap();
        assert_eq!(chapter.title.as_deref(), Some("风雪夜归"));
        assert_eq!(chapter.abstract_content, None);

        let stored = fx.chapter_repo.find_by_number(novel.id, 1).await.unwrap().unwrap();
        assert_eq!(stored.id, chapter.id);

        assert!(matches!(
            handler.handle(create(novel.id, 1)).await,
            Err(ApplicationError::Conflict(_))
        ));
        assert!(matches!(
            handler.handle(create(novel.id, 0)).await,
            Err(ApplicationError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_create_chapter_checks_owner() {
        let fx = Fixture::new().await;
        let novel = fx.seed_novel(true).await;
        let handler = CreateChapterHandler::new(fx.novel_repo.clone(), fx.chapter_repo.clone());

        let mut cmd = create(novel.id, 1);
        cmd.requester = "someone-else".to_string();
        assert!(matches!(
            handler.handle(cmd).await,
            Err(ApplicationError::Forbidden(_))
        ));
        assert!(fx.chapter_repo.find_by_novel_id(novel.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_chapter_title() {
        let fx = Fixture::new().await;
        let novel = fx.seed_novel(true).await;
        let chapter = fx.seed_chapter(novel.id, 1, Some("摘要")).await;
        let handler = UpdateChapterHandler::new(fx.novel_repo.clone(), fx.chapter_repo.clone());

        let updated = handler
            .handle(UpdateChapter {
                requester: OWNER.to_string(),
                chapter_id: chapter.id,
                title: " 新标题 ".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(updated.title.as_deref(), Some("新标题"));

        let stored = fx.chapter_repo.find_by_id(chapter.id).await.unwrap().unwrap();
        assert_eq!(stored.title.as_deref(), Some("新标题"));
        assert_eq!(stored.abstract_content.as_deref(), Some("摘要"));

        let blank = handler
            .handle(UpdateChapter {
                requester: OWNER.to_string(),
                chapter_id: chapter.id,
                title: "  ".to_string(),
            })
            .await;
        assert!(matches!(blank, Err(ApplicationError::ValidationError(_))));

        let missing = handler
            .handle(UpdateChapter {
                requester: OWNER.to_string(),
                chapter_id: Uuid::new_v4(),
                title: "标题".to_string(),
            })
            .await;
        assert!(matches!(missing, Err(ApplicationError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_chapter_removes_vector() {
        let fx = Fixture::new().await;
        let novel = fx.seed_novel(true).await;
        let mut chapter = fx.seed_chapter(novel.id, 1, None).await;
        chapter.vector_id = Some("vec-1".to_string());
        fx.chapter_repo.save(&chapter).await.unwrap();

        delete_handler(&fx)
            .handle(DeleteChapter {
                requester: OWNER.to_string(),
                chapter_id: chapter.id,
            })
            .await
            .unwrap();

        assert_eq!(fx.vector_store.deleted(), vec!["vec-1".to_string()]);
        assert!(fx.chapter_repo.find_by_id(chapter.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_chapter_survives_vector_failure() {
        let fx = Fixture::with_vector_store(FakeVectorStore::failing()).await;
        let novel = fx.seed_novel(true).await;
        let mut chapter = fx.seed_chapter(novel.id, 1, None).await;
        chapter.vector_id = Some("vec-1".to_string());
        fx.chapter_repo.save(&chapter).await.unwrap();
        let handler = delete_handler(&fx);

        let foreign = handler
            .handle(DeleteChapter {
                requester: "someone-else".to_string(),
                chapter_id: chapter.id,
            })
            .await;
        assert!(matches!(foreign, Err(ApplicationError::Forbidden(_))));

        handler
            .handle(DeleteChapter {
                requester: OWNER.to_string(),
                chapter_id: chapter.id,
            })
            .await
            .unwrap();
        assert!(fx.chapter_repo.find_by_id(chapter.id).await.unwrap().is_none());
    }
}
