//! Generation Queue Port - 异步生成消息通道
//!
//! 具体实现在 infrastructure/memory

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Queue 错误
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Queue is full")]
    Full,

    #[error("Queue is closed")]
    Closed,
}

/// 生成目标（三种生成单元）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationTarget {
    Structure { novel_id: Uuid },
    Outline { novel_id: Uuid },
    ChapterContent { novel_id: Uuid, chapter_id: Uuid },
}

impl GenerationTarget {
    pub fn novel_id(&self) -> Uuid {
        match self {
            GenerationTarget::Structure { novel_id }
            | GenerationTarget::Outline { novel_id }
            | GenerationTarget::ChapterContent { novel_id, .. } => *novel_id,
        }
    }

    /// 任务关联对象：章节内容任务挂在章节上，其余挂在小说上
    pub fn subject_id(&self) -> Uuid {
        match self {
            GenerationTarget::ChapterContent { chapter_id, .. } => *chapter_id,
            other => other.novel_id(),
        }
    }
}

/// 投递给后台 worker 的生成消息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationMessage {
    pub task_id: Uuid,
    pub target: GenerationTarget,
}

/// Generation Queue Port
pub trait GenerationQueuePort: Send + Sync {
    /// 投递消息，不等待执行
    fn publish(&self, message: GenerationMessage) -> Result<(), QueueError>;
}
