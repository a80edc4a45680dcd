//! SQLite Model Credential Repository

use async_trait::async_trait;
use sqlx::FromRow;

use super::database::{
    db_error, format_timestamp, map_write_error, parse_timestamp, parse_uuid, DbPool,
};
use crate::application::ports::{
    CredentialRepositoryPort, ModelCredential, ModelKind, RepositoryError,
};

/// SQLite Credential Repository
pub struct SqliteCredentialRepository {
    pool: DbPool,
}

impl SqliteCredentialRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CredentialRow {
    id: String,
    owner_id: String,
    kind: i64,
    api_key: String,
    base_url: String,
    model_name: String,
    created_at: String,
}

impl TryFrom<CredentialRow> for ModelCredential {
    type Error = RepositoryError;

    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        Ok(ModelCredential {
            id: parse_uuid(&row.id)?,
            owner_id: row.owner_id,
            kind: ModelKind::from_code(row.kind).ok_or_else(|| {
                RepositoryError::SerializationError(format!("Unknown model kind: {}", row.kind))
            })?,
            api_key: row.api_key,
            base_url: row.base_url,
            model_name: row.model_name,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

#[async_trait]
impl CredentialRepositoryPort for SqliteCredentialRepository {
    async fn save(&self, credential: &ModelCredential) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO model_credentials (id, owner_id, kind, api_key, base_url, model_name, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(owner_id, kind) DO UPDATE SET
                api_key = excluded.api_key,
                base_url = excluded.base_url,
                model_name = excluded.model_name
            "#,
        )
        .bind(credential.id.to_string())
        .bind(&credential.owner_id)
        .bind(credential.kind.code())
        .bind(&credential.api_key)
        .bind(&credential.base_url)
        .bind(&credential.model_name)
        .bind(format_timestamp(&credential.created_at))
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn find(
        &self,
        owner_id: &str,
        kind: ModelKind,
    ) -> Result<Option<ModelCredential>, RepositoryError> {
        let row: Option<CredentialRow> = sqlx::query_as(
            "SELECT id, owner_id, kind, api_key, base_url, model_name, created_at \
             FROM model_credentials WHERE owner_id = ? AND kind = ?",
        )
        .bind(owner_id)
        .bind(kind.code())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(ModelCredential::try_from).transpose()
    }
}
