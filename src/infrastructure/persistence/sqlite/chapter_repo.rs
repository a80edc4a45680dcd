//! SQLite Chapter Repository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::FromRow;
use uuid::Uuid;

use super::database::{
    db_error, format_timestamp, map_write_error, parse_timestamp, parse_uuid, DbPool,
};
use crate::application::ports::{
    ChapterRecord, ChapterRepositoryPort, ChapterStatus, RepositoryError,
};

/// SQLite Chapter Repository
pub struct SqliteChapterRepository {
    pool: DbPool,
}

impl SqliteChapterRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const CHAPTER_COLUMNS: &str = "id, novel_id, chapter_number, title, abstract_content, content, \
     vector_id, status, created_at, updated_at";

#[derive(FromRow)]
struct ChapterRow {
    id: String,
    novel_id: String,
    chapter_number: i64,
    title: Option<String>,
    abstract_content: Option<String>,
    content: Option<String>,
    vector_id: Option<String>,
    status: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ChapterRow> for ChapterRecord {
    type Error = RepositoryError;

    fn try_from(row: ChapterRow) -> Result<Self, Self::Error> {
        Ok(ChapterRecord {
            id: parse_uuid(&row.id)?,
            novel_id: parse_uuid(&row.novel_id)?,
            chapter_number: u32::try_from(row.chapter_number)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            title: row.title,
            abstract_content: row.abstract_content,
            content: row.content,
            vector_id: row.vector_id,
            status: ChapterStatus::from_code(row.status).ok_or_else(|| {
                RepositoryError::SerializationError(format!(
                    "Unknown chapter status: {}",
                    row.status
                ))
            })?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[async_trait]
impl ChapterRepositoryPort for SqliteChapterRepository {
    async fn save(&self, chapter: &ChapterRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO chapters (id, novel_id, chapter_number, title, abstract_content,
                content, vector_id, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                abstract_content = excluded.abstract_content,
                content = excluded.content,
                vector_id = excluded.vector_id,
                status = excluded.status,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(chapter.id.to_string())
        .bind(chapter.novel_id.to_string())
        .bind(i64::from(chapter.chapter_number))
        .bind(&chapter.title)
        .bind(&chapter.abstract_content)
        .bind(&chapter.content)
        .bind(&chapter.vector_id)
        .bind(chapter.status.code())
        .bind(format_timestamp(&chapter.created_at))
        .bind(format_timestamp(&chapter.updated_at))
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ChapterRecord>, RepositoryError> {
        let row: Option<ChapterRow> = sqlx::query_as(&format!(
            "SELECT {} FROM chapters WHERE id = ?",
            CHAPTER_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(ChapterRecord::try_from).transpose()
    }

    async fn find_by_novel_id(&self, novel_id: Uuid) -> Result<Vec<ChapterRecord>, RepositoryError> {
        let rows: Vec<ChapterRow> = sqlx::query_as(&format!(
            "SELECT {} FROM chapters WHERE novel_id = ? ORDER BY chapter_number",
            CHAPTER_COLUMNS
        ))
        .bind(novel_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(ChapterRecord::try_from).collect()
    }

    async fn find_by_number(
        &self,
        novel_id: Uuid,
        chapter_number: u32,
    ) -> Result<Option<ChapterRecord>, RepositoryError> {
        let row: Option<ChapterRow> = sqlx::query_as(&format!(
            "SELECT {} FROM chapters WHERE novel_id = ? AND chapter_number = ?",
            CHAPTER_COLUMNS
        ))
        .bind(novel_id.to_string())
        .bind(i64::from(chapter_number))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(ChapterRecord::try_from).transpose()
    }

    async fn update_status(&self, id: Uuid, status: ChapterStatus) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE chapters SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.code())
            .bind(format_timestamp(&Utc::now()))
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Chapter {}", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM chapters WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Chapter {}", id)));
        }
        Ok(())
    }
}
