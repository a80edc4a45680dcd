//! Generation - 生成编排
//!
//! - ledger: 任务台账
//! - context: 前文摘要与检索片段
//! - outline_sync: 大纲同步到章节
//! - pipeline: 三种生成单元共用的准备/落库/回退步骤
//! - executor: 阻塞式执行
//! - dispatcher: 内联或入队派发
//! - relay: 流式转发与停止

mod context;
mod dispatcher;
mod executor;
mod ledger;
mod outline_sync;
mod pipeline;
mod relay;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{ContextAssembler, RetrievalSettings};
pub use dispatcher::Dispatcher;
pub use executor::GenerationExecutor;
pub use ledger::TaskLedger;
pub use outline_sync::{OutlineSyncReport, OutlineSynchronizer};
pub use pipeline::{task_kind, GenerationPipeline, PreparedGeneration};
pub use relay::StreamRelay;

use uuid::Uuid;

use crate::application::commands::ChapterSeed;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChapterRecord, ChapterRepositoryPort, NovelRepositoryPort, RepositoryError,
};

/// 归属校验：小说不存在返回 NotFound，不属于请求者返回 Forbidden
pub async fn ensure_owner(
    novel_repo: &dyn NovelRepositoryPort,
    novel_id: Uuid,
    requester: &str,
) -> Result<(), ApplicationError> {
    let owner = novel_repo
        .owner_of(novel_id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("Novel", novel_id))?;
    if owner != requester {
        return Err(ApplicationError::forbidden(format!(
            "Novel {} does not belong to {}",
            novel_id, requester
        )));
    }
    Ok(())
}

/// 按 (小说, 章节号) 查找章节，不存在时以 `seed` 创建占位记录
pub async fn chapter_for(
    chapter_repo: &dyn ChapterRepositoryPort,
    novel_id: Uuid,
    chapter_number: u32,
    seed: &ChapterSeed,
) -> Result<ChapterRecord, ApplicationError> {
    if chapter_number == 0 {
        return Err(ApplicationError::validation("Chapter number must be positive"));
    }
    if let Some(chapter) = chapter_repo.find_by_number(novel_id, chapter_number).await? {
        return Ok(chapter);
    }

    let mut chapter =
        ChapterRecord::placeholder(novel_id, chapter_number, non_blank(&seed.title));
    chapter.abstract_content = non_blank(&seed.abstract_content);
    match chapter_repo.save(&chapter).await {
        Ok(()) => {
            tracing::info!(
                novel_id = %novel_id,
                chapter_number = chapter_number,
                "Chapter placeholder created"
            );
            Ok(chapter)
        }
        // 并发创建，以先写入的为准
        Err(RepositoryError::Duplicate(_)) => chapter_repo
            .find_by_number(novel_id, chapter_number)
            .await?
            .ok_or_else(|| ApplicationError::internal("Chapter vanished after conflict")),
        Err(e) => Err(e.into()),
    }
}

/// 去除首尾空白，空串视为未提供
pub(crate) fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
