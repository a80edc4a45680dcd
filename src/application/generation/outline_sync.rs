//! OutlineSynchronizer - 大纲与章节占位记录同步
//!
//! 规则（按 (小说, 章节号) 匹配）:
//! - 记录不存在：创建 PENDING 占位章节
//! - 记录存在且标题为空、解析出的标题非空：补填标题
//! - 其余情况保持不变，从不覆盖已有标题

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{ChapterRecord, ChapterRepositoryPort};
use crate::domain::parse_outline;

/// 同步结果统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutlineSyncReport {
    pub created: usize,
    pub filled: usize,
    pub kept: usize,
}

pub struct OutlineSynchronizer {
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl OutlineSynchronizer {
    pub fn new(chapter_repo: Arc<dyn ChapterRepositoryPort>) -> Self {
        Self { chapter_repo }
    }

    pub async fn sync(
        &self,
        novel_id: Uuid,
        outline_text: &str,
    ) -> Result<OutlineSyncReport, ApplicationError> {
        let mut report = OutlineSyncReport::default();

        for entry in parse_outline(outline_text) {
            let existing = self
                .chapter_repo
                .find_by_number(novel_id, entry.chapter_number)
                .await?;

            match existing {
                Some(mut chapter) => {
                    if !chapter.has_title() && !entry.title.is_empty() {
                        chapter.title = Some(entry.title);
                        chapter.updated_at = chrono::Utc::now();
                        self.chapter_repo.save(&chapter).await?;
                        report.filled += 1;
                    } else {
                        report.kept += 1;
                    }
                }
                None => {
                    let title = (!entry.title.is_empty()).then_some(entry.title);
                    let chapter = ChapterRecord::placeholder(novel_id, entry.chapter_number, title);
                    self.chapter_repo.save(&chapter).await?;
                    report.created += 1;
                }
            }
        }

        tracing::info!(
            novel_id = %novel_id,
            created = report.created,
            filled = report.filled,
            kept = report.kept,
            "Outline synchronized to chapters"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::generation::testing::Fixture;
    use crate::application::ports::ChapterStatus;

    const OUTLINE: &str = "\
## 第一章 [少年出山]
- **核心事件**：离开村子
## 第二章 【初入江湖】
## 第三章
";

    #[tokio::test]
    async fn test_sync_creates_placeholders() {
        let fx = Fixture::new().await;
        let novel = fx.seed_novel(true).await;
        let sync = OutlineSynchronizer::new(fx.chapter_repo.clone());

        let report = sync.sync(novel.id, OUTLINE).await.unwrap();
        assert_eq!(report, OutlineSyncReport { created: 3, filled: 0, kept: 0 });

        let chapters = fx.chapter_repo.find_by_novel_id(novel.id).await.unwrap();
        assert_eq!(chapters.len(), 3);
        assert_eq!(chapters[0].title.as_deref(), Some("少年出山"));
        assert_eq!(chapters[1].title.as_deref(), Some("初入江湖"));
        assert_eq!(chapters[2].title, None);
        assert!(chapters.iter().all(|c| c.status == ChapterStatus::Pending));
    }

    #[tokio::test]
    async fn test_sync_twice_is_idempotent() {
        let fx = Fixture::new().await;
        let novel = fx.seed_novel(true).await;
        let sync = OutlineSynchronizer::new(fx.chapter_repo.clone());

        sync.sync(novel.id, OUTLINE).await.unwrap();
        let first = fx.chapter_repo.find_by_novel_id(novel.id).await.unwrap();

        let report = sync.sync(novel.id, OUTLINE).await.unwrap();
        assert_eq!(report, OutlineSyncReport { created: 0, filled: 0, kept: 3 });

        let second = fx.chapter_repo.find_by_novel_id(novel.id).await.unwrap();
        assert_eq!(second.len(), 3);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.title, b.title);
        }
    }

    #[tokio::test]
    async fn test_sync_fills_blank_titles_only() {
        let fx = Fixture::new().await;
        let novel = fx.seed_novel(true).await;
        let mut authored = fx.seed_chapter(novel.id, 1, None).await;
        authored.title = Some("作者自拟".to_string());
        fx.chapter_repo.save(&authored).await.unwrap();
        fx.seed_chapter(novel.id, 2, None).await;

        let sync = OutlineSynchronizer::new(fx.chapter_repo.clone());
        let report = sync.sync(novel.id, OUTLINE).await.unwrap();
        assert_eq!(report, OutlineSyncReport { created: 1, filled: 1, kept: 1 });

        let chapters = fx.chapter_repo.find_by_novel_id(novel.id).await.unwrap();
        assert_eq!(chapters[0].title.as_deref(), Some("作者自拟"));
        assert_eq!(chapters[1].title.as_deref(), Some("初入江湖"));
    }
}
