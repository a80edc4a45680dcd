//! Knowledge Command Handlers
//!
//! 知识库条目与章节正文存在同一个检索集合里，生成章节时一并参与检索

use std::sync::Arc;

use crate::application::commands::{DeleteKnowledge, UploadKnowledge};
use crate::application::error::ApplicationError;
use crate::application::generation::{ensure_owner, RetrievalSettings};
use crate::application::ports::{
    CredentialRepositoryPort, KnowledgeEntry, KnowledgeRepositoryPort, ModelKind,
    NovelRepositoryPort, VectorStorePort,
};

/// UploadKnowledge Handler - 需要向量模型凭据
pub struct UploadKnowledgeHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    credential_repo: Arc<dyn CredentialRepositoryPort>,
    knowledge_repo: Arc<dyn KnowledgeRepositoryPort>,
    vector_store: Arc<dyn VectorStorePort>,
    settings: RetrievalSettings,
}

impl UploadKnowledgeHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        credential_repo: Arc<dyn CredentialRepositoryPort>,
        knowledge_repo: Arc<dyn KnowledgeRepositoryPort>,
        vector_store: Arc<dyn VectorStorePort>,
        settings: RetrievalSettings,
    ) -> Self {
        Self {
            novel_repo,
            credential_repo,
            knowledge_repo,
            vector_store,
            settings,
        }
    }

    pub async fn handle(&self, command: UploadKnowledge) -> Result<KnowledgeEntry, ApplicationError> {
        ensure_owner(self.novel_repo.as_ref(), command.novel_id, &command.requester).await?;

        let name = command.name.trim();
        if name.is_empty() {
            return Err(ApplicationError::validation("Knowledge name must not be empty"));
        }
        if command.content.trim().is_empty() {
            return Err(ApplicationError::validation("Knowledge content must not be empty"));
        }

        let model = self
            .credential_repo
            .find(&command.requester, ModelKind::Embedding)
            .await?
            .ok_or_else(|| ApplicationError::not_found_str("ModelCredential", &command.requester))?;

        let collection = self.settings.collection_for(command.novel_id);
        let vector_id = self
            .vector_store
            .store(&collection, &command.content, &model)
            .await?;

        let entry = KnowledgeEntry::new(command.requester, command.novel_id, name, vector_id);
        self.knowledge_repo.save(&entry).await?;

        tracing::info!(
            novel_id = %entry.novel_id,
            entry_id = %entry.id,
            vector_id = %entry.vector_id,
            content_chars = command.content.chars().count(),
            "Knowledge uploaded"
        );
        Ok(entry)
    }
}

/// DeleteKnowledge Handler
pub struct DeleteKnowledgeHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    knowledge_repo: Arc<dyn KnowledgeRepositoryPort>,
    vector_store: Arc<dyn VectorStorePort>,
    settings: RetrievalSettings,
}

impl DeleteKnowledgeHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        knowledge_repo: Arc<dyn KnowledgeRepositoryPort>,
        vector_store: Arc<dyn VectorStorePort>,
        settings: RetrievalSettings,
    ) -> Self {
        Self {
            novel_repo,
            knowledge_repo,
            vector_store,
            settings,
        }
    }

    pub async fn handle(&self, command: DeleteKnowledge) -> Result<(), ApplicationError> {
        let entry = self
            .knowledge_repo
            .find_by_id(command.entry_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Knowledge", command.entry_id))?;
        ensure_owner(self.novel_repo.as_ref(), entry.novel_id, &command.requester).await?;

        let collection = self.settings.collection_for(entry.novel_id);
        if let Err(e) = self.vector_store.delete(&collection, &entry.vector_id).await {
            tracing::error!(
                entry_id = %entry.id,
                vector_id = %entry.vector_id,
                error = %e,
                "Failed to delete knowledge vector"
            );
        }
        self.knowledge_repo.delete(entry.id).await?;

        tracing::info!(novel_id = %entry.novel_id, entry_id = %entry.id, "Knowledge deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::generation::testing::{FakeVectorStore, Fixture, OWNER};
    use crate::application::ports::{ChapterRepositoryPort, ScoredSnippet};

    fn upload_handler(fx: &Fixture) -> UploadKnowledgeHandler {
        UploadKnowledgeHandler::new(
            fx.novel_repo.clone(),
            fx.credential_repo.clone(),
            fx.knowledge_repo.clone(),
            fx.vector_store.clone(),
            RetrievalSettings::default(),
        )
    }

    fn upload(novel_id: uuid::Uuid, content: &str) -> UploadKnowledge {
        UploadKnowledge {
            requester: OWNER.to_string(),
            novel_id,
            name: "门派设定".to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_upload_requires_embedding_model() {
        let fx = Fixture::new().await;
        let novel = fx.seed_novel(true).await;

        let err = upload_handler(&fx)
            .handle(upload(novel.id, "青云门位于青云山"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));
        assert!(fx.vector_store.stored().is_empty());
        assert!(fx.knowledge_repo.find_by_novel(novel.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_stores_into_novel_collection() {
        let fx = Fixture::new().await;
        let novel = fx.seed_novel(true).await;
        fx.seed_embedding_model().await;

        let entry = upload_handler(&fx)
            .handle(upload(novel.id, "青云门位于青云山"))
            .await
            .unwrap();
        let stored = fx.vector_store.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].0, entry.vector_id);
        assert_eq!(stored[0].1, "青云门位于青云山");

        let listed = fx.knowledge_repo.find_by_novel(novel.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "门派设定");

        // 生成章节时在同一集合中检索
        fx.vector_store.set_search_results(vec![ScoredSnippet {
            text: "青云门位于青云山".to_string(),
            score: 0.8,
        }]);
        let chapter = fx.seed_chapter(novel.id, 1, Some("拜入青云门")).await;
        let snippets = fx.assembler().retrieval_snippets(&novel, &chapter).await;
        assert_eq!(snippets, vec!["青云门位于青云山".to_string()]);
        assert_eq!(
            fx.vector_store.searches()[0].0,
            RetrievalSettings::default().collection_for(novel.id)
        );
        assert!(fx.chapter_repo.find_by_id(chapter.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_upload_rejects_blank_content_and_foreign_novel() {
        let fx = Fixture::new().await;
        let novel = fx.seed_novel(true).await;
        fx.seed_embedding_model().await;
        let handler = upload_handler(&fx);

        assert!(matches!(
            handler.handle(upload(novel.id, "  ")).await,
            Err(ApplicationError::ValidationError(_))
        ));

        let mut foreign = upload(novel.id, "内容");
        foreign.requester = "someone-else".to_string();
        assert!(matches!(
            handler.handle(foreign).await,
            Err(ApplicationError::Forbidden(_))
        ));
        assert!(fx.vector_store.stored().is_empty());
    }

    #[tokio::test]
    async fn test_upload_surfaces_vector_store_failure() {
        let fx = Fixture::with_vector_store(FakeVectorStore::failing()).await;
        let novel = fx.seed_novel(true).await;
        fx.seed_embedding_model().await;

        let err = upload_handler(&fx)
            .handle(upload(novel.id, "内容"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::ExternalServiceError(_)));
        assert!(fx.knowledge_repo.find_by_novel(novel.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_knowledge_removes_vector() {
        let fx = Fixture::new().await;
        let novel = fx.seed_novel(true).await;
        fx.seed_embedding_model().await;
        let entry = upload_handler(&fx)
            .handle(upload(novel.id, "内容"))
            .await
            .unwrap();
        let handler = DeleteKnowledgeHandler::new(
            fx.novel_repo.clone(),
            fx.knowledge_repo.clone(),
            fx.vector_store.clone(),
            RetrievalSettings::default(),
        );

        handler
            .handle(DeleteKnowledge {
                requester: OWNER.to_string(),
                entry_id: entry.id,
            })
            .await
            .unwrap();
        assert_eq!(fx.vector_store.deleted(), vec![entry.vector_id.clone()]);
        assert!(fx.knowledge_repo.find_by_id(entry.id).await.unwrap().is_none());

        let again = handler
            .handle(DeleteKnowledge {
                requester: OWNER.to_string(),
                entry_id: entry.id,
            })
            .await;
        assert!(matches!(again, Err(ApplicationError::NotFound { .. })));
    }
}
