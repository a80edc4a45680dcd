//! Qdrant Vector Store - 通过 qdrant-client (gRPC) 访问 Qdrant
//!
//! 实现 VectorStorePort，文本先经 EmbeddingPort 向量化，原文存于 payload 的 `text` 字段

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashSet;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, DeletePointsBuilder, Distance, PointStruct, PointsIdsList, Query,
    QueryPoints, QueryPointsBuilder, ScoredPoint, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant, QdrantError};
use uuid::Uuid;

use crate::application::ports::{
    EmbeddingPort, ModelCredential, ScoredSnippet, VectorStoreError, VectorStorePort,
};

const TEXT_FIELD: &str = "text";

/// Qdrant 配置
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    /// gRPC 地址
    pub url: String,
    pub api_key: Option<String>,
    /// 向量维度，需与 embedding 模型一致
    pub dimension: u64,
    pub timeout_secs: u64,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            api_key: None,
            dimension: 1536,
            timeout_secs: 30,
        }
    }
}

/// Qdrant 向量库
pub struct QdrantVectorStore {
    client: Qdrant,
    dimension: u64,
    embedder: Arc<dyn EmbeddingPort>,
    /// 已确认存在的集合
    known_collections: DashSet<String>,
}

impl QdrantVectorStore {
    pub fn new(
        config: QdrantConfig,
        embedder: Arc<dyn EmbeddingPort>,
    ) -> Result<Self, VectorStoreError> {
        let client = Qdrant::from_url(&config.url)
            .api_key(config.api_key.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(map_qdrant_error)?;

        Ok(Self {
            client,
            dimension: config.dimension,
            embedder,
            known_collections: DashSet::new(),
        })
    }

    async fn embed(&self, model: &ModelCredential, text: &str) -> Result<Vec<f32>, VectorStoreError> {
        self.embedder
            .embed(model, text)
            .await
            .map_err(|e| VectorStoreError::Embedding(e.to_string()))
    }

    /// 集合是否存在（不创建）
    async fn collection_ready(&self, collection: &str) -> Result<bool, VectorStoreError> {
        if self.known_collections.contains(collection) {
            return Ok(true);
        }
        let exists = self
            .client
            .collection_exists(collection)
            .await
            .map_err(map_qdrant_error)?;
        if exists {
            self.known_collections.insert(collection.to_string());
        }
        Ok(exists)
    }

    /// 首次使用时创建集合（余弦距离）
    async fn ensure_collection(&self, collection: &str) -> Result<(), VectorStoreError> {
        if self.collection_ready(collection).await? {
            return Ok(());
        }

        let created = self
            .client
            .create_collection(
                CreateCollectionBuilder::new(collection)
                    .vectors_config(VectorParamsBuilder::new(self.dimension, Distance::Cosine)),
            )
            .await;

        match created {
            Ok(_) => {
                tracing::info!(
                    collection = %collection,
                    dimension = self.dimension,
                    "Vector collection created"
                );
            }
            // 并发创建时以对方为准
            Err(e) => {
                if !self.collection_ready(collection).await? {
                    return Err(map_qdrant_error(e));
                }
            }
        }

        self.known_collections.insert(collection.to_string());
        Ok(())
    }
}

/// 最近邻查询
///
/// 余弦得分范围为 [-1, 1]，下限 <= 0 时不设阈值，保证返回满 `limit` 条
fn query_request(collection: &str, vector: Vec<f32>, limit: usize, min_score: f32) -> QueryPoints {
    let mut builder = QueryPointsBuilder::new(collection)
        .query(Query::new_nearest(vector))
        .limit(limit as u64)
        .with_payload(true);
    if min_score > 0.0 {
        builder = builder.score_threshold(min_score);
    }
    builder.into()
}

fn into_snippets(points: Vec<ScoredPoint>) -> Vec<ScoredSnippet> {
    let mut snippets: Vec<ScoredSnippet> = points
        .into_iter()
        .filter_map(|point| match point.payload.get(TEXT_FIELD)?.kind.as_ref()? {
            Kind::StringValue(text) => Some(ScoredSnippet {
                text: text.clone(),
                score: point.score,
            }),
            _ => None,
        })
        .collect();
    snippets.sort_by(|a, b| b.score.total_cmp(&a.score));
    snippets
}

fn map_qdrant_error(e: QdrantError) -> VectorStoreError {
    VectorStoreError::Service(e.to_string())
}

#[async_trait]
impl VectorStorePort for QdrantVectorStore {
    async fn store(
        &self,
        collection: &str,
        text: &str,
        model: &ModelCredential,
    ) -> Result<String, VectorStoreError> {
        let vector = self.embed(model, text).await?;
        self.ensure_collection(collection).await?;

        let id = Uuid::new_v4().to_string();
        let mut payload = Payload::new();
        payload.insert(TEXT_FIELD, text.to_string());

        self.client
            .upsert_points(
                UpsertPointsBuilder::new(
                    collection,
                    vec![PointStruct::new(id.clone(), vector, payload)],
                )
                .wait(true),
            )
            .await
            .map_err(map_qdrant_error)?;

        tracing::debug!(collection = %collection, vector_id = %id, "Vector stored");
        Ok(id)
    }

    async fn search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
        min_score: f32,
        model: &ModelCredential,
    ) -> Result<Vec<ScoredSnippet>, VectorStoreError> {
        // 集合尚未创建，视为没有命中
        if !self.collection_ready(collection).await? {
            return Ok(Vec::new());
        }

        let vector = self.embed(model, query).await?;
        let response = self
            .client
            .query(query_request(collection, vector, limit, min_score))
            .await
            .map_err(map_qdrant_error)?;

        Ok(into_snippets(response.result))
    }

    async fn delete(&self, collection: &str, vector_id: &str) -> Result<(), VectorStoreError> {
        if !self.collection_ready(collection).await? {
            return Ok(());
        }

        self.client
            .delete_points(
                DeletePointsBuilder::new(collection)
                    .points(PointsIdsList {
                        ids: vec![vector_id.to_string().into()],
                    })
                    .wait(true),
            )
            .await
            .map_err(map_qdrant_error)?;

        tracing::debug!(collection = %collection, vector_id = %vector_id, "Vector deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::application::generation::RetrievalSettings;

    fn point(score: f32, text: Option<&str>) -> ScoredPoint {
        let mut payload = HashMap::new();
        if let Some(text) = text {
            payload.insert(TEXT_FIELD.to_string(), text.to_string().into());
        }
        ScoredPoint {
            payload,
            score,
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_floor_sends_no_threshold() {
        let settings = RetrievalSettings::default();
        let request = query_request("novel_1", vec![0.1; 4], settings.top_k, settings.min_score);
        assert_eq!(request.collection_name, "novel_1");
        assert_eq!(request.limit, Some(3));
        assert_eq!(request.score_threshold, None);
        assert!(request.with_payload.is_some());

        let negative = query_request("novel_1", vec![0.1; 4], 3, -0.5);
        assert_eq!(negative.score_threshold, None);
    }

    #[test]
    fn test_positive_floor_is_forwarded() {
        let request = query_request("novel_1", vec![0.1; 4], 5, 0.6);
        assert_eq!(request.score_threshold, Some(0.6));
        assert_eq!(request.limit, Some(5));
    }

    #[test]
    fn test_snippets_sorted_and_textless_points_skipped() {
        let snippets = into_snippets(vec![
            point(0.2, Some("低")),
            point(0.9, Some("高")),
            point(0.5, None),
            point(-0.3, Some("负相关")),
        ]);
        let texts: Vec<&str> = snippets.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["高", "低", "负相关"]);
    }
}
