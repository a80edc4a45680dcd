//! Task Context - Value Objects

use serde::{Deserialize, Serialize};

use super::TaskError;

/// 任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskKind {
    /// 小说结构
    Structure,
    /// 章节大纲
    Outline,
    /// 章节内容
    ChapterContent,
}

impl TaskKind {
    /// 持久化使用的类型编码
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Structure => "GENERATE_NOVEL_STRUCTURE",
            TaskKind::Outline => "GENERATE_CHAPTER_OUTLINE",
            TaskKind::ChapterContent => "GENERATE_CHAPTER",
        }
    }

    pub fn parse(s: &str) -> Result<Self, TaskError> {
        match s {
            "GENERATE_NOVEL_STRUCTURE" => Ok(TaskKind::Structure),
            "GENERATE_CHAPTER_OUTLINE" => Ok(TaskKind::Outline),
            "GENERATE_CHAPTER" => Ok(TaskKind::ChapterContent),
            other => Err(TaskError::UnknownKind(other.to_string())),
        }
    }

    /// 任务显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            TaskKind::Structure => "生成小说结构",
            TaskKind::Outline => "生成章节大纲",
            TaskKind::ChapterContent => "生成章节内容",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 任务状态
///
/// 数值与持久化编码一致：0 待处理，1 处理中，2 处理完成，3 处理失败
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Processing,
    Complete,
    Failed,
}

impl TaskStatus {
    pub fn code(&self) -> i64 {
        match self {
            TaskStatus::Pending => 0,
            TaskStatus::Processing => 1,
            TaskStatus::Complete => 2,
            TaskStatus::Failed => 3,
        }
    }

    pub fn from_code(code: i64) -> Result<Self, TaskError> {
        match code {
            0 => Ok(TaskStatus::Pending),
            1 => Ok(TaskStatus::Processing),
            2 => Ok(TaskStatus::Complete),
            3 => Ok(TaskStatus::Failed),
            other => Err(TaskError::UnknownStatus(other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Complete => "complete",
            TaskStatus::Failed => "failed",
        }
    }

    /// PENDING → PROCESSING → {COMPLETE | FAILED}，FAILED 可重新派发回到 PENDING
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::Processing)
                | (TaskStatus::Processing, TaskStatus::Complete)
                | (TaskStatus::Processing, TaskStatus::Failed)
                | (TaskStatus::Failed, TaskStatus::Pending)
        )
    }

    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::Processing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Complete | TaskStatus::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
