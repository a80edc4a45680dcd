//! SQLite Novel Repository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::FromRow;
use uuid::Uuid;

use super::database::{
    db_error, format_timestamp, map_write_error, parse_timestamp, parse_uuid, DbPool,
};
use crate::application::ports::{NovelRecord, NovelRepositoryPort, NovelStatus, RepositoryError};

/// SQLite Novel Repository
pub struct SqliteNovelRepository {
    pool: DbPool,
}

impl SqliteNovelRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const NOVEL_COLUMNS: &str = "id, owner_id, title, genre, setting_text, structure, chapter_outline, \
     planned_chapters, chapter_word_count, status, created_at, updated_at";

#[derive(FromRow)]
struct NovelRow {
    id: String,
    owner_id: String,
    title: String,
    genre: String,
    setting_text: Option<String>,
    structure: Option<String>,
    chapter_outline: Option<String>,
    planned_chapters: Option<i64>,
    chapter_word_count: Option<i64>,
    status: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<NovelRow> for NovelRecord {
    type Error = RepositoryError;

    fn try_from(row: NovelRow) -> Result<Self, Self::Error> {
        Ok(NovelRecord {
            id: parse_uuid(&row.id)?,
            owner_id: row.owner_id,
            title: row.title,
            genre: row.genre,
            setting_text: row.setting_text,
            structure: row.structure,
            chapter_outline: row.chapter_outline,
            planned_chapters: row.planned_chapters.map(|n| n as u32),
            chapter_word_count: row.chapter_word_count.map(|n| n as u32),
            status: NovelStatus::from_code(row.status).ok_or_else(|| {
                RepositoryError::SerializationError(format!("Unknown novel status: {}", row.status))
            })?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[async_trait]
impl NovelRepositoryPort for SqliteNovelRepository {
    async fn save(&self, novel: &NovelRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO novels (id, owner_id, title, genre, setting_text, structure,
                chapter_outline, planned_chapters, chapter_word_count, status,
                created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                genre = excluded.genre,
                setting_text = excluded.setting_text,
                structure = excluded.structure,
                chapter_outline = excluded.chapter_outline,
                planned_chapters = excluded.planned_chapters,
                chapter_word_count = excluded.chapter_word_count,
                status = excluded.status,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(novel.id.to_string())
        .bind(&novel.owner_id)
        .bind(&novel.title)
        .bind(&novel.genre)
        .bind(&novel.setting_text)
        .bind(&novel.structure)
        .bind(&novel.chapter_outline)
        .bind(novel.planned_chapters.map(i64::from))
        .bind(novel.chapter_word_count.map(i64::from))
        .bind(novel.status.code())
        .bind(format_timestamp(&novel.created_at))
        .bind(format_timestamp(&novel.updated_at))
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<NovelRecord>, RepositoryError> {
        let row: Option<NovelRow> =
            sqlx::query_as(&format!("SELECT {} FROM novels WHERE id = ?", NOVEL_COLUMNS))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;

        row.map(NovelRecord::try_from).transpose()
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<NovelRecord>, RepositoryError> {
        let rows: Vec<NovelRow> = sqlx::query_as(&format!(
            "SELECT {} FROM novels WHERE owner_id = ? ORDER BY created_at DESC",
            NOVEL_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(NovelRecord::try_from).collect()
    }

    async fn owner_of(&self, id: Uuid) -> Result<Option<String>, RepositoryError> {
        sqlx::query_scalar("SELECT owner_id FROM novels WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn update_status(&self, id: Uuid, status: NovelStatus) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE novels SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.code())
            .bind(format_timestamp(&Utc::now()))
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Novel {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    async fn repo() -> SqliteNovelRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteNovelRepository::new(pool)
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let repo = repo().await;
        let mut novel = NovelRecord::new("u1", "标题", "科幻");
        novel.planned_chapters = Some(20);
        repo.save(&novel).await.unwrap();

        let found = repo.find_by_id(novel.id).await.unwrap().unwrap();
        assert_eq!(found.title, "标题");
        assert_eq!(found.planned_chapters, Some(20));
        assert_eq!(found.status, NovelStatus::Draft);
        assert_eq!(repo.owner_of(novel.id).await.unwrap().as_deref(), Some("u1"));
        assert!(repo.owner_of(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_updates_existing() {
        let repo = repo().await;
        let mut novel = NovelRecord::new("u1", "标题", "科幻");
        repo.save(&novel).await.unwrap();

        novel.structure = Some("结构".to_string());
        novel.status = NovelStatus::Ready;
        repo.save(&novel).await.unwrap();

        let found = repo.find_by_id(novel.id).await.unwrap().unwrap();
        assert_eq!(found.structure.as_deref(), Some("结构"));
        assert_eq!(found.status, NovelStatus::Ready);
        assert_eq!(repo.find_by_owner("u1").await.unwrap().len(), 1);
        assert!(repo.find_by_owner("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_status() {
        let repo = repo().await;
        let novel = NovelRecord::new("u1", "标题", "科幻");
        repo.save(&novel).await.unwrap();

        repo.update_status(novel.id, NovelStatus::Generating).await.unwrap();
        let found = repo.find_by_id(novel.id).await.unwrap().unwrap();
        assert_eq!(found.status, NovelStatus::Generating);

        assert!(matches!(
            repo.update_status(Uuid::new_v4(), NovelStatus::Ready).await,
            Err(RepositoryError::NotFound(_))
        ));
    }
}
