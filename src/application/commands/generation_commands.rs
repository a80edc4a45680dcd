//! Generation Commands - 生成请求派发

use uuid::Uuid;

use crate::application::ports::GenerationTarget;
use crate::domain::task::Task;

/// 章节首次创建时写入的初始字段，章节已存在时忽略
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterSeed {
    pub title: Option<String>,
    pub abstract_content: Option<String>,
}

/// 生成请求（调用方视角，章节以序号定位）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    Structure { novel_id: Uuid },
    Outline { novel_id: Uuid },
    Chapter {
        novel_id: Uuid,
        chapter_number: u32,
        seed: ChapterSeed,
    },
}

impl GenerationRequest {
    pub fn novel_id(&self) -> Uuid {
        match self {
            GenerationRequest::Structure { novel_id }
            | GenerationRequest::Outline { novel_id }
            | GenerationRequest::Chapter { novel_id, .. } => *novel_id,
        }
    }
}

/// 派发生成命令
#[derive(Debug, Clone)]
pub struct DispatchGeneration {
    pub requester: String,
    pub request: GenerationRequest,
    /// true 时投递队列，由 worker 异步执行
    pub run_async: bool,
}

/// 派发结果
#[derive(Debug, Clone)]
pub struct DispatchResponse {
    /// 内联执行时为终态任务，入队时为 PENDING 任务
    pub task: Task,
    pub target: GenerationTarget,
    pub queued: bool,
    /// 请求异步但未配置队列，已改为内联执行
    pub inline_fallback: bool,
}
