//! ContextAssembler - 生成上下文组装
//!
//! 前文摘要 + 向量检索片段。检索是尽力而为的增强：
//! 未配置向量模型或检索失败时返回空序列，不影响生成。

use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChapterRecord, ChapterRepositoryPort, CredentialRepositoryPort, ModelKind, NovelRecord,
    VectorStorePort,
};
use crate::domain::context::{build_retrieval_query, previous_summaries};

/// 检索参数
#[derive(Debug, Clone)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub min_score: f32,
    pub collection_prefix: String,
}

impl RetrievalSettings {
    /// 小说对应的向量集合名
    pub fn collection_for(&self, novel_id: Uuid) -> String {
        format!("{}{}", self.collection_prefix, novel_id)
    }
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 3,
            min_score: 0.0,
            collection_prefix: "novel_".to_string(),
        }
    }
}

pub struct ContextAssembler {
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    credential_repo: Arc<dyn CredentialRepositoryPort>,
    vector_store: Arc<dyn VectorStorePort>,
    settings: RetrievalSettings,
}

impl ContextAssembler {
    pub fn new(
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        credential_repo: Arc<dyn CredentialRepositoryPort>,
        vector_store: Arc<dyn VectorStorePort>,
        settings: RetrievalSettings,
    ) -> Self {
        Self {
            chapter_repo,
            credential_repo,
            vector_store,
            settings,
        }
    }

    pub fn settings(&self) -> &RetrievalSettings {
        &self.settings
    }

    /// 目标章节之前的章节摘要，按章节顺序
    pub async fn previous_summaries(
        &self,
        novel_id: Uuid,
        target: u32,
    ) -> Result<Vec<String>, ApplicationError> {
        let chapters = self.chapter_repo.find_by_novel_id(novel_id).await?;
        Ok(previous_summaries(
            chapters
                .iter()
                .map(|c| (c.chapter_number, c.abstract_content.as_deref())),
            target,
        ))
    }

    /// 与目标章节最相关的片段，按相似度排序
    pub async fn retrieval_snippets(
        &self,
        novel: &NovelRecord,
        chapter: &ChapterRecord,
    ) -> Vec<String> {
        let Some(query) = build_retrieval_query(
            chapter.title.as_deref(),
            chapter.abstract_content.as_deref(),
            novel.setting_text.as_deref(),
        ) else {
            tracing::debug!(novel_id = %novel.id, "Empty retrieval query, skipping search");
            return Vec::new();
        };

        let model = match self
            .credential_repo
            .find(&novel.owner_id, ModelKind::Embedding)
            .await
        {
            Ok(Some(model)) => model,
            Ok(None) => {
                tracing::warn!(
                    owner_id = %novel.owner_id,
                    novel_id = %novel.id,
                    "Embedding model not configured, skipping retrieval"
                );
                return Vec::new();
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load embedding model");
                return Vec::new();
            }
        };

        let collection = self.settings.collection_for(novel.id);
        match self
            .vector_store
            .search(
                &collection,
                &query,
                self.settings.top_k,
                self.settings.min_score,
                &model,
            )
            .await
        {
            Ok(matches) => {
                let snippets: Vec<String> = matches
                    .into_iter()
                    .map(|m| m.text.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect();
                tracing::info!(
                    novel_id = %novel.id,
                    chapter_number = chapter.chapter_number,
                    count = snippets.len(),
                    "Retrieved relevant snippets"
                );
                snippets
            }
            Err(e) => {
                tracing::error!(
                    novel_id = %novel.id,
                    error = %e,
                    "Retrieval failed, continuing without snippets"
                );
                Vec::new()
            }
        }
    }
}
