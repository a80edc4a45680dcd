//! Task Context - Aggregate Root

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{TaskError, TaskKind, TaskStatus};

/// 生成任务聚合根
///
/// 不变量:
/// - 创建时状态为 PENDING
/// - 状态只能按 `TaskStatus::can_transition_to` 流转
/// - 流水线本身从不删除任务
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub kind: TaskKind,
    /// 关联的小说或章节 ID
    pub subject_id: Uuid,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(kind: TaskKind, subject_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind,
            subject_id,
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.display_name()
    }

    /// 变更任务状态，非法的后继状态直接返回错误
    pub fn transition_to(&mut self, next: TaskStatus) -> Result<(), TaskError> {
        if !self.status.can_transition_to(next) {
            return Err(TaskError::InvalidTransition {
                task_id: self.id,
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// 处理中且超过 `max_age` 未更新（通常意味着 worker 崩溃）
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.status == TaskStatus::Processing && now - self.updated_at > max_age
    }
}
