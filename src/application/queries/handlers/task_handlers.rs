//! Task Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::generation::TaskLedger;
use crate::application::queries::{GetTask, ListActiveTasks, ListStaleTasks, ListTasksBySubject};
use crate::domain::task::Task;

/// 任务查询 Handler，所有查询都经由 TaskLedger
pub struct TaskQueryHandler {
    ledger: Arc<TaskLedger>,
}

impl TaskQueryHandler {
    pub fn new(ledger: Arc<TaskLedger>) -> Self {
        Self { ledger }
    }

    pub async fn get(&self, query: GetTask) -> Result<Task, ApplicationError> {
        self.ledger.get(query.task_id).await
    }

    pub async fn active(&self, _query: ListActiveTasks) -> Result<Vec<Task>, ApplicationError> {
        self.ledger.list_active().await
    }

    pub async fn by_subject(&self, query: ListTasksBySubject) -> Result<Vec<Task>, ApplicationError> {
        self.ledger.list_by_subject(query.subject_id).await
    }

    /// 只报告，不修改任务状态
    pub async fn stale(&self, query: ListStaleTasks) -> Result<Vec<Task>, ApplicationError> {
        let secs = i64::try_from(query.older_than_secs)
            .map_err(|_| ApplicationError::validation("older_than_secs is too large"))?;
        let tasks = self
            .ledger
            .stale_processing(chrono::Duration::seconds(secs))
            .await?;

        if !tasks.is_empty() {
            tracing::warn!(
                count = tasks.len(),
                older_than_secs = query.older_than_secs,
                "Stale PROCESSING tasks found"
            );
        }
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::generation::testing::Fixture;
    use crate::domain::task::{TaskKind, TaskStatus};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_task_queries() {
        let fx = Fixture::new().await;
        let ledger = fx.ledger();
        let handler = TaskQueryHandler::new(ledger.clone());
        let subject = Uuid::new_v4();

        let pending = ledger.create(TaskKind::Structure, subject).await.unwrap();
        let running = ledger.create(TaskKind::Outline, subject).await.unwrap();
        ledger
            .transition(running.id, TaskStatus::Processing)
            .await
            .unwrap();

        let got = handler.get(GetTask { task_id: pending.id }).await.unwrap();
        assert_eq!(got.status, TaskStatus::Pending);

        assert_eq!(handler.active(ListActiveTasks).await.unwrap().len(), 2);
        assert_eq!(
            handler
                .by_subject(ListTasksBySubject { subject_id: subject })
                .await
                .unwrap()
                .len(),
            2
        );

        // 刚进入 PROCESSING，不算滞留
        let stale = handler
            .stale(ListStaleTasks { older_than_secs: 3600 })
            .await
            .unwrap();
        assert!(stale.is_empty());
        let stale = handler
            .stale(ListStaleTasks { older_than_secs: 0 })
            .await
            .unwrap();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].id, running.id);
    }

    #[tokio::test]
    async fn test_get_unknown_task() {
        let fx = Fixture::new().await;
        let handler = TaskQueryHandler::new(fx.ledger());
        let result = handler.get(GetTask { task_id: Uuid::new_v4() }).await;
        assert!(matches!(result, Err(ApplicationError::NotFound { .. })));
    }
}
