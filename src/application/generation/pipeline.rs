//! GenerationPipeline - 三种生成单元共用的步骤
//!
//! prepare -> mark_processing -> (模型调用) -> persist | restore
//!
//! 阻塞执行（GenerationExecutor）与流式执行（StreamRelay）共用这些步骤，
//! 差别只在模型调用方式。

use std::sync::Arc;

use chrono::Utc;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChapterRecord, ChapterRepositoryPort, ChapterStatus, CredentialRepositoryPort,
    GenerationBackendPort, GenerationTarget, ModelCredential, ModelKind, NovelRecord,
    NovelRepositoryPort, NovelStatus, VectorStorePort,
};
use crate::domain::prompt::{
    abstract_prompt, chapter_prompt, outline_prompt, structure_prompt, ChapterPromptInput,
    NovelBrief,
};
use crate::domain::task::TaskKind;

use super::context::ContextAssembler;
use super::outline_sync::OutlineSynchronizer;

/// 生成目标的任务类型
pub fn task_kind(target: &GenerationTarget) -> TaskKind {
    match target {
        GenerationTarget::Structure { .. } => TaskKind::Structure,
        GenerationTarget::Outline { .. } => TaskKind::Outline,
        GenerationTarget::ChapterContent { .. } => TaskKind::ChapterContent,
    }
}

/// 准备好的一次生成
///
/// `novel` / `chapter` 是生成前的快照，`restore` 据此回退可见状态
#[derive(Debug, Clone)]
pub struct PreparedGeneration {
    pub target: GenerationTarget,
    pub prompt: String,
    pub model: ModelCredential,
    pub novel: NovelRecord,
    pub chapter: Option<ChapterRecord>,
}

pub struct GenerationPipeline {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    credential_repo: Arc<dyn CredentialRepositoryPort>,
    backend: Arc<dyn GenerationBackendPort>,
    vector_store: Arc<dyn VectorStorePort>,
    context: Arc<ContextAssembler>,
    outline_sync: Arc<OutlineSynchronizer>,
}

impl GenerationPipeline {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        credential_repo: Arc<dyn CredentialRepositoryPort>,
        backend: Arc<dyn GenerationBackendPort>,
        vector_store: Arc<dyn VectorStorePort>,
        context: Arc<ContextAssembler>,
    ) -> Self {
        let outline_sync = Arc::new(OutlineSynchronizer::new(chapter_repo.clone()));
        Self {
            novel_repo,
            chapter_repo,
            credential_repo,
            backend,
            vector_store,
            context,
            outline_sync,
        }
    }

    pub fn backend(&self) -> &Arc<dyn GenerationBackendPort> {
        &self.backend
    }

    /// 对话模型凭据，不存在时返回 NotFound
    pub async fn chat_model(&self, owner_id: &str) -> Result<ModelCredential, ApplicationError> {
        self.credential_repo
            .find(owner_id, ModelKind::Chat)
            .await?
            .ok_or_else(|| ApplicationError::not_found_str("ModelCredential", owner_id))
    }

    /// 加载记录、检查凭据、组装上下文并构造提示词
    pub async fn prepare(
        &self,
        target: GenerationTarget,
    ) -> Result<PreparedGeneration, ApplicationError> {
        let novel_id = target.novel_id();
        let novel = self
            .novel_repo
            .find_by_id(novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", novel_id))?;
        let model = self.chat_model(&novel.owner_id).await?;

        let brief = NovelBrief {
            title: &novel.title,
            genre: &novel.genre,
            setting: novel.setting_text.as_deref().unwrap_or_default(),
        };

        let (prompt, chapter) = match target {
            GenerationTarget::Structure { .. } => {
                (structure_prompt(brief, novel.planned_chapters), None)
            }
            GenerationTarget::Outline { .. } => {
                if !novel.has_structure() {
                    return Err(ApplicationError::validation(
                        "Novel structure must be generated before the outline",
                    ));
                }
                let structure = novel.structure.as_deref().unwrap_or_default();
                (outline_prompt(brief, structure), None)
            }
            GenerationTarget::ChapterContent { chapter_id, .. } => {
                let chapter = self
                    .chapter_repo
                    .find_by_id(chapter_id)
                    .await?
                    .ok_or_else(|| ApplicationError::not_found("Chapter", chapter_id))?;
                if chapter.novel_id != novel.id {
                    return Err(ApplicationError::validation(format!(
                        "Chapter {} does not belong to novel {}",
                        chapter_id, novel.id
                    )));
                }

                let previous = self
                    .context
                    .previous_summaries(novel.id, chapter.chapter_number)
                    .await?;
                let snippets = self.context.retrieval_snippets(&novel, &chapter).await;

                let prompt = chapter_prompt(&ChapterPromptInput {
                    brief,
                    structure: novel.structure.as_deref().unwrap_or_default(),
                    chapter_title: chapter.title.as_deref().unwrap_or_default(),
                    chapter_summary: chapter.abstract_content.as_deref().unwrap_or_default(),
                    previous_summaries: &previous,
                    snippets: &snippets,
                    word_count: novel.chapter_word_count,
                });
                (prompt, Some(chapter))
            }
        };

        tracing::debug!(
            novel_id = %novel_id,
            task_type = %task_kind(&target),
            prompt_chars = prompt.chars().count(),
            "Generation prepared"
        );

        Ok(PreparedGeneration {
            target,
            prompt,
            model,
            novel,
            chapter,
        })
    }

    /// 标记可见状态为生成中（结构：小说；章节内容：章节）
    pub async fn mark_processing(
        &self,
        prepared: &PreparedGeneration,
    ) -> Result<(), ApplicationError> {
        match (&prepared.target, &prepared.chapter) {
            (GenerationTarget::Structure { novel_id }, _) => {
                self.novel_repo
                    .update_status(*novel_id, NovelStatus::Generating)
                    .await?
            }
            (GenerationTarget::ChapterContent { .. }, Some(chapter)) => {
                self.chapter_repo
                    .update_status(chapter.id, ChapterStatus::Processing)
                    .await?
            }
            _ => {}
        }
        Ok(())
    }

    /// 写入生成结果
    ///
    /// 重新生成的章节保留已有摘要，只有摘要为空时才调用模型生成
    pub async fn persist(
        &self,
        prepared: &PreparedGeneration,
        text: String,
    ) -> Result<(), ApplicationError> {
        match prepared.target {
            GenerationTarget::Structure { novel_id } => {
                let mut novel = self.reload_novel(novel_id).await?;
                novel.structure = Some(text);
                novel.status = NovelStatus::Ready;
                novel.updated_at = Utc::now();
                self.novel_repo.save(&novel).await?;
            }
            GenerationTarget::Outline { novel_id } => {
                let mut novel = self.reload_novel(novel_id).await?;
                novel.chapter_outline = Some(text.clone());
                novel.updated_at = Utc::now();
                self.novel_repo.save(&novel).await?;
                self.outline_sync.sync(novel_id, &text).await?;
            }
            GenerationTarget::ChapterContent { chapter_id, .. } => {
                let mut chapter = self
                    .chapter_repo
                    .find_by_id(chapter_id)
                    .await?
                    .ok_or_else(|| ApplicationError::not_found("Chapter", chapter_id))?;

                if chapter
                    .abstract_content
                    .as_deref()
                    .map(str::is_empty)
                    .unwrap_or(true)
                {
                    chapter.abstract_content = self.summarize(&prepared.model, &text).await;
                }

                chapter.vector_id = self
                    .replace_vector(&prepared.novel, &chapter, &text)
                    .await;
                chapter.content = Some(text);
                chapter.status = ChapterStatus::Complete;
                chapter.updated_at = Utc::now();
                self.chapter_repo.save(&chapter).await?;
            }
        }

        tracing::info!(
            novel_id = %prepared.novel.id,
            task_type = %task_kind(&prepared.target),
            "Generation result persisted"
        );
        Ok(())
    }

    /// 回退可见状态到生成前的值
    pub async fn restore(&self, prepared: &PreparedGeneration) {
        let result = match (&prepared.target, &prepared.chapter) {
            (GenerationTarget::Structure { novel_id }, _) => {
                self.novel_repo
                    .update_status(*novel_id, prepared.novel.status)
                    .await
            }
            (GenerationTarget::ChapterContent { .. }, Some(chapter)) => {
                self.chapter_repo
                    .update_status(chapter.id, chapter.status)
                    .await
            }
            _ => Ok(()),
        };

        if let Err(e) = result {
            tracing::error!(
                novel_id = %prepared.novel.id,
                error = %e,
                "Failed to restore status after generation failure"
            );
        }
    }

    async fn reload_novel(&self, novel_id: uuid::Uuid) -> Result<NovelRecord, ApplicationError> {
        self.novel_repo
            .find_by_id(novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", novel_id))
    }

    /// 章节摘要，失败时留空
    async fn summarize(&self, model: &ModelCredential, content: &str) -> Option<String> {
        match self.backend.complete(model, &abstract_prompt(content)).await {
            Ok(summary) => {
                let summary = summary.trim().to_string();
                (!summary.is_empty()).then_some(summary)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Chapter abstract generation failed, leaving it empty");
                None
            }
        }
    }

    /// 替换章节的向量条目：先删旧条目，再存新条目，返回新的条目 ID
    ///
    /// 未配置向量模型时保留原条目 ID
    async fn replace_vector(
        &self,
        novel: &NovelRecord,
        chapter: &ChapterRecord,
        content: &str,
    ) -> Option<String> {
        let model = match self
            .credential_repo
            .find(&novel.owner_id, ModelKind::Embedding)
            .await
        {
            Ok(Some(model)) => model,
            Ok(None) => {
                tracing::warn!(
                    owner_id = %novel.owner_id,
                    chapter_id = %chapter.id,
                    "Embedding model not configured, chapter not indexed"
                );
                return chapter.vector_id.clone();
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load embedding model");
                return chapter.vector_id.clone();
            }
        };

        let collection = self.context.settings().collection_for(novel.id);
        if let Some(old) = chapter.vector_id.as_deref() {
            if let Err(e) = self.vector_store.delete(&collection, old).await {
                tracing::error!(
                    chapter_id = %chapter.id,
                    vector_id = %old,
                    error = %e,
                    "Failed to delete old chapter vector"
                );
            }
        }

        match self.vector_store.store(&collection, content, &model).await {
            Ok(id) => {
                tracing::debug!(chapter_id = %chapter.id, vector_id = %id, "Chapter indexed");
                Some(id)
            }
            Err(e) => {
                tracing::error!(
                    chapter_id = %chapter.id,
                    error = %e,
                    "Failed to store chapter vector"
                );
                None
            }
        }
    }
}
