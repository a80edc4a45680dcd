//! Novel Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::generation::ensure_owner;
use crate::application::ports::{
    ChapterRecord, ChapterRepositoryPort, KnowledgeEntry, KnowledgeRepositoryPort, NovelRecord,
    NovelRepositoryPort,
};
use crate::application::queries::{GetNovel, ListChapters, ListKnowledge, ListNovels};

/// GetNovel Handler
pub struct GetNovelHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl GetNovelHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(&self, query: GetNovel) -> Result<NovelRecord, ApplicationError> {
        let novel = self
            .novel_repo
            .find_by_id(query.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", query.novel_id))?;

        if novel.owner_id != query.requester {
            return Err(ApplicationError::forbidden(format!(
                "Novel {} does not belong to {}",
                query.novel_id, query.requester
            )));
        }
        Ok(novel)
    }
}

/// ListNovels Handler
pub struct ListNovelsHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl ListNovelsHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(&self, query: ListNovels) -> Result<Vec<NovelRecord>, ApplicationError> {
        Ok(self.novel_repo.find_by_owner(&query.requester).await?)
    }
}

/// ListChapters Handler
pub struct ListChaptersHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl ListChaptersHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
    ) -> Self {
        Self {
            novel_repo,
            chapter_repo,
        }
    }

    pub async fn handle(&self, query: ListChapters) -> Result<Vec<ChapterRecord>, ApplicationError> {
        ensure_owner(self.novel_repo.as_ref(), query.novel_id, &query.requester).await?;
        Ok(self.chapter_repo.find_by_novel_id(query.novel_id).await?)
    }
}

/// ListKnowledge Handler
pub struct ListKnowledgeHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    knowledge_repo: Arc<dyn KnowledgeRepositoryPort>,
}

impl ListKnowledgeHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        knowledge_repo: Arc<dyn KnowledgeRepositoryPort>,
    ) -> Self {
        Self {
            novel_repo,
            knowledge_repo,
        }
    }

    pub async fn handle(&self, query: ListKnowledge) -> Result<Vec<KnowledgeEntry>, ApplicationError> {
        ensure_owner(self.novel_repo.as_ref(), query.novel_id, &query.requester).await?;
        Ok(self.knowledge_repo.find_by_novel(query.novel_id).await?)
    }
}
