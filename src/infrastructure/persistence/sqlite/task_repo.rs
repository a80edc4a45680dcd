//! SQLite Task Repository

use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;

use super::database::{
    db_error, format_timestamp, map_write_error, parse_timestamp, parse_uuid, DbPool,
};
use crate::application::ports::{RepositoryError, TaskRepositoryPort};
use crate::domain::task::{Task, TaskKind, TaskStatus};

/// SQLite Task Repository
pub struct SqliteTaskRepository {
    pool: DbPool,
}

impl SqliteTaskRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const TASK_COLUMNS: &str = "id, task_type, subject_id, status, created_at, updated_at";

#[derive(FromRow)]
struct TaskRow {
    id: String,
    task_type: String,
    subject_id: String,
    status: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<TaskRow> for Task {
    type Error = RepositoryError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let serialization = |e: crate::domain::task::TaskError| {
            RepositoryError::SerializationError(e.to_string())
        };
        Ok(Task {
            id: parse_uuid(&row.id)?,
            kind: TaskKind::parse(&row.task_type).map_err(serialization)?,
            subject_id: parse_uuid(&row.subject_id)?,
            status: TaskStatus::from_code(row.status).map_err(serialization)?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[async_trait]
impl TaskRepositoryPort for SqliteTaskRepository {
    async fn save(&self, task: &Task) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO tasks (id, task_name, task_type, subject_id, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                status = excluded.status,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(task.id.to_string())
        .bind(task.name())
        .bind(task.kind.as_str())
        .bind(task.subject_id.to_string())
        .bind(task.status.code())
        .bind(format_timestamp(&task.created_at))
        .bind(format_timestamp(&task.updated_at))
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, RepositoryError> {
        let row: Option<TaskRow> =
            sqlx::query_as(&format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;

        row.map(Task::try_from).transpose()
    }

    async fn find_by_subject(&self, subject_id: Uuid) -> Result<Vec<Task>, RepositoryError> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "SELECT {} FROM tasks WHERE subject_id = ? ORDER BY created_at DESC, rowid DESC",
            TASK_COLUMNS
        ))
        .bind(subject_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(Task::try_from).collect()
    }

    async fn find_by_statuses(&self, statuses: &[TaskStatus]) -> Result<Vec<Task>, RepositoryError> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; statuses.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM tasks WHERE status IN ({}) ORDER BY created_at DESC, rowid DESC",
            TASK_COLUMNS, placeholders
        );
        let mut query = sqlx::query_as::<_, TaskRow>(&sql);
        for status in statuses {
            query = query.bind(status.code());
        }
        let rows = query.fetch_all(&self.pool).await.map_err(db_error)?;

        rows.into_iter().map(Task::try_from).collect()
    }

    async fn find_latest(
        &self,
        kind: TaskKind,
        subject_id: Uuid,
    ) -> Result<Option<Task>, RepositoryError> {
        let row: Option<TaskRow> = sqlx::query_as(&format!(
            "SELECT {} FROM tasks WHERE task_type = ? AND subject_id = ? \
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
            TASK_COLUMNS
        ))
        .bind(kind.as_str())
        .bind(subject_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(Task::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    async fn repo() -> SqliteTaskRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteTaskRepository::new(pool)
    }

    #[tokio::test]
    async fn test_save_and_update_status() {
        let repo = repo().await;
        let mut task = Task::new(TaskKind::ChapterContent, Uuid::new_v4());
        repo.save(&task).await.unwrap();

        task.transition_to(TaskStatus::Processing).unwrap();
        repo.save(&task).await.unwrap();

        let found = repo.find_by_id(task.id).await.unwrap().unwrap();
        assert_eq!(found.kind, TaskKind::ChapterContent);
        assert_eq!(found.status, TaskStatus::Processing);
    }

    #[tokio::test]
    async fn test_find_by_statuses_and_latest() {
        let repo = repo().await;
        let subject = Uuid::new_v4();

        let mut done = Task::new(TaskKind::Structure, subject);
        done.transition_to(TaskStatus::Processing).unwrap();
        done.transition_to(TaskStatus::Complete).unwrap();
        repo.save(&done).await.unwrap();

        let pending = Task::new(TaskKind::Structure, subject);
        repo.save(&pending).await.unwrap();
        let other = Task::new(TaskKind::Outline, subject);
        repo.save(&other).await.unwrap();

        let active = repo
            .find_by_statuses(&[TaskStatus::Pending, TaskStatus::Processing])
            .await
            .unwrap();
        assert_eq!(active.len(), 2);
        assert!(repo.find_by_statuses(&[]).await.unwrap().is_empty());

        let latest = repo
            .find_latest(TaskKind::Structure, subject)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, pending.id);
        assert_eq!(repo.find_by_subject(subject).await.unwrap().len(), 3);
    }
}
