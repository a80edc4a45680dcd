//! Task Context - Errors

use thiserror::Error;
use uuid::Uuid;

use super::TaskStatus;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("任务 {task_id} 不允许从 {from} 变更为 {to}")]
    InvalidTransition {
        task_id: Uuid,
        from: TaskStatus,
        to: TaskStatus,
    },

    #[error("未知的任务类型: {0}")]
    UnknownKind(String),

    #[error("未知的任务状态: {0}")]
    UnknownStatus(i64),
}
