//! Knowledge HTTP Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{DeleteKnowledge, ListKnowledge, UploadKnowledge};
use crate::infrastructure::http::dto::{
    ApiResponse, DeletedResponse, KnowledgeIdRequest, KnowledgeResponse, NovelIdRequest,
    UploadKnowledgeRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::middleware::Requester;
use crate::infrastructure::http::state::AppState;

/// 上传知识库条目
pub async fn upload_knowledge(
    State(state): State<Arc<AppState>>,
    Requester(requester): Requester,
    Json(req): Json<UploadKnowledgeRequest>,
) -> Result<Json<ApiResponse<KnowledgeResponse>>, ApiError> {
    let entry = state
        .upload_knowledge_handler
        .handle(UploadKnowledge {
            requester,
            novel_id: req.novel_id,
            name: req.name,
            content: req.content,
        })
        .await?;

    Ok(Json(ApiResponse::success(KnowledgeResponse::from(entry))))
}

pub async fn list_knowledge(
    State(state): State<Arc<AppState>>,
    Requester(requester): Requester,
    Json(req): Json<NovelIdRequest>,
) -> Result<Json<ApiResponse<Vec<KnowledgeResponse>>>, ApiError> {
    let entries = state
        .list_knowledge_handler
        .handle(ListKnowledge {
            requester,
            novel_id: req.novel_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(
        entries.into_iter().map(KnowledgeResponse::from).collect(),
    )))
}

pub async fn delete_knowledge(
    State(state): State<Arc<AppState>>,
    Requester(requester): Requester,
    Json(req): Json<KnowledgeIdRequest>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    state
        .delete_knowledge_handler
        .handle(DeleteKnowledge {
            requester,
            entry_id: req.entry_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(DeletedResponse { id: req.entry_id })))
}
