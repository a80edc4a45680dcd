//! TaskLedger - 生成任务台账
//!
//! 任务的创建、状态流转与查询，持久化委托给 TaskRepositoryPort

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::TaskRepositoryPort;
use crate::domain::task::{Task, TaskKind, TaskStatus};

pub struct TaskLedger {
    repo: Arc<dyn TaskRepositoryPort>,
}

impl TaskLedger {
    pub fn new(repo: Arc<dyn TaskRepositoryPort>) -> Self {
        Self { repo }
    }

    /// 创建 PENDING 任务
    pub async fn create(&self, kind: TaskKind, subject_id: Uuid) -> Result<Task, ApplicationError> {
        let task = Task::new(kind, subject_id);
        self.repo.save(&task).await?;

        tracing::info!(
            task_id = %task.id,
            task_type = %task.kind,
            subject_id = %subject_id,
            "Task created"
        );
        Ok(task)
    }

    /// 状态流转，非法流转直接返回 `InvalidState`
    pub async fn transition(
        &self,
        task_id: Uuid,
        next: TaskStatus,
    ) -> Result<Task, ApplicationError> {
        let mut task = self.get(task_id).await?;
        let from = task.status;
        task.transition_to(next)?;
        self.repo.save(&task).await?;

        tracing::debug!(
            task_id = %task_id,
            from = %from,
            to = %next,
            "Task transitioned"
        );
        Ok(task)
    }

    /// 重新派发：同类最近一次任务为 FAILED 时复用并回到 PENDING，否则新建
    pub async fn reopen_or_create(
        &self,
        kind: TaskKind,
        subject_id: Uuid,
    ) -> Result<Task, ApplicationError> {
        if let Some(latest) = self.repo.find_latest(kind, subject_id).await? {
            if latest.status == TaskStatus::Failed {
                let task = self.transition(latest.id, TaskStatus::Pending).await?;
                tracing::info!(
                    task_id = %task.id,
                    subject_id = %subject_id,
                    "Failed task reopened for retry"
                );
                return Ok(task);
            }
        }
        self.create(kind, subject_id).await
    }

    /// 标记失败；任务已处于终态时只记录日志
    pub async fn fail(&self, task_id: Uuid, reason: &str) {
        match self.transition(task_id, TaskStatus::Failed).await {
            Ok(_) => tracing::warn!(task_id = %task_id, reason = %reason, "Task failed"),
            Err(e) => tracing::error!(
                task_id = %task_id,
                reason = %reason,
                error = %e,
                "Failed to mark task as failed"
            ),
        }
    }

    pub async fn get(&self, task_id: Uuid) -> Result<Task, ApplicationError> {
        self.repo
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Task", task_id))
    }

    pub async fn list_by_subject(&self, subject_id: Uuid) -> Result<Vec<Task>, ApplicationError> {
        Ok(self.repo.find_by_subject(subject_id).await?)
    }

    /// PENDING 或 PROCESSING 的任务
    pub async fn list_active(&self) -> Result<Vec<Task>, ApplicationError> {
        Ok(self
            .repo
            .find_by_statuses(&[TaskStatus::Pending, TaskStatus::Processing])
            .await?)
    }

    /// 超过 `max_age` 未更新的 PROCESSING 任务（只报告，不修改）
    pub async fn stale_processing(&self, max_age: Duration) -> Result<Vec<Task>, ApplicationError> {
        let now = Utc::now();
        let tasks = self
            .repo
            .find_by_statuses(&[TaskStatus::Processing])
            .await?;
        Ok(tasks
            .into_iter()
            .filter(|t| t.is_stale(now, max_age))
            .collect())
    }
}
