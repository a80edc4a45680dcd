//! SQLite Knowledge Repository

use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;

use super::database::{
    db_error, format_timestamp, map_write_error, parse_timestamp, parse_uuid, DbPool,
};
use crate::application::ports::{KnowledgeEntry, KnowledgeRepositoryPort, RepositoryError};

/// SQLite Knowledge Repository
pub struct SqliteKnowledgeRepository {
    pool: DbPool,
}

impl SqliteKnowledgeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const KNOWLEDGE_COLUMNS: &str = "id, owner_id, novel_id, name, vector_id, created_at";

#[derive(FromRow)]
struct KnowledgeRow {
    id: String,
    owner_id: String,
    novel_id: String,
    name: String,
    vector_id: String,
    created_at: String,
}

impl TryFrom<KnowledgeRow> for KnowledgeEntry {
    type Error = RepositoryError;

    fn try_from(row: KnowledgeRow) -> Result<Self, Self::Error> {
        Ok(KnowledgeEntry {
            id: parse_uuid(&row.id)?,
            owner_id: row.owner_id,
            novel_id: parse_uuid(&row.novel_id)?,
            name: row.name,
            vector_id: row.vector_id,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

#[async_trait]
impl KnowledgeRepositoryPort for SqliteKnowledgeRepository {
    async fn save(&self, entry: &KnowledgeEntry) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO knowledge_entries (id, owner_id, novel_id, name, vector_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                vector_id = excluded.vector_id
            "#,
        )
        .bind(entry.id.to_string())
        .bind(&entry.owner_id)
        .bind(entry.novel_id.to_string())
        .bind(&entry.name)
        .bind(&entry.vector_id)
        .bind(format_timestamp(&entry.created_at))
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<KnowledgeEntry>, RepositoryError> {
        let row: Option<KnowledgeRow> = sqlx::query_as(&format!(
            "SELECT {} FROM knowledge_entries WHERE id = ?",
            KNOWLEDGE_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(KnowledgeEntry::try_from).transpose()
    }

    async fn find_by_novel(&self, novel_id: Uuid) -> Result<Vec<KnowledgeEntry>, RepositoryError> {
        let rows: Vec<KnowledgeRow> = sqlx::query_as(&format!(
            "SELECT {} FROM knowledge_entries WHERE novel_id = ? ORDER BY created_at",
            KNOWLEDGE_COLUMNS
        ))
        .bind(novel_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(KnowledgeEntry::try_from).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM knowledge_entries WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Knowledge {}", id)));
        }
        Ok(())
    }
}
