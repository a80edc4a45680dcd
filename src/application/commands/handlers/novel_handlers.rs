//! Novel Command Handlers

use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::CreateNovel;
use crate::application::error::ApplicationError;
use crate::application::ports::{NovelRecord, NovelRepositoryPort, NovelStatus};

/// 创建小说响应
#[derive(Debug, Clone)]
pub struct CreateNovelResponse {
    pub id: Uuid,
    pub title: String,
    pub status: NovelStatus,
}

/// CreateNovel Handler
pub struct CreateNovelHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl CreateNovelHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(&self, command: CreateNovel) -> Result<CreateNovelResponse, ApplicationError> {
        let title = command.title.trim();
        if title.is_empty() {
            return Err(ApplicationError::validation("Novel title must not be empty"));
        }
        if command.planned_chapters == Some(0) {
            return Err(ApplicationError::validation("planned_chapters must be positive"));
        }
        if command.chapter_word_count == Some(0) {
            return Err(ApplicationError::validation("chapter_word_count must be positive"));
        }

        let mut novel = NovelRecord::new(command.requester, title, command.genre.trim());
        novel.setting_text = command
            .setting_text
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        novel.planned_chapters = command.planned_chapters;
        novel.chapter_word_count = command.chapter_word_count;

        self.novel_repo.save(&novel).await?;

        tracing::info!(
            novel_id = %novel.id,
            owner_id = %novel.owner_id,
            title = %novel.title,
            "Novel created"
        );

        Ok(CreateNovelResponse {
            id: novel.id,
            title: novel.title,
            status: novel.status,
        })
    }
}
