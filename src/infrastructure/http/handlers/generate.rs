//! Generation HTTP Handlers
//!
//! `async=false` 时请求阻塞到任务终态，`async=true` 时入队后立即返回

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{DispatchGeneration, GenerationRequest};
use crate::infrastructure::http::dto::{
    ApiResponse, DispatchResult, GenerateChapterRequest, GenerateRequest, TaskResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::middleware::Requester;
use crate::infrastructure::http::state::AppState;

async fn dispatch(
    state: &AppState,
    requester: String,
    request: GenerationRequest,
    run_async: bool,
) -> Result<Json<ApiResponse<DispatchResult>>, ApiError> {
    let response = state
        .dispatcher
        .handle(DispatchGeneration {
            requester,
            request,
            run_async,
        })
        .await?;

    Ok(Json(ApiResponse::success(DispatchResult {
        task: TaskResponse::from(response.task),
        queued: response.queued,
        inline_fallback: response.inline_fallback,
    })))
}

/// 生成小说结构
pub async fn generate_structure(
    State(state): State<Arc<AppState>>,
    Requester(requester): Requester,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<ApiResponse<DispatchResult>>, ApiError> {
    dispatch(
        &state,
        requester,
        GenerationRequest::Structure {
            novel_id: req.novel_id,
        },
        req.run_async,
    )
    .await
}

/// 生成章节大纲
pub async fn generate_outline(
    State(state): State<Arc<AppState>>,
    Requester(requester): Requester,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<ApiResponse<DispatchResult>>, ApiError> {
    dispatch(
        &state,
        requester,
        GenerationRequest::Outline {
            novel_id: req.novel_id,
        },
        req.run_async,
    )
    .await
}

/// 生成章节内容
pub async fn generate_chapter(
    State(state): State<Arc<AppState>>,
    Requester(requester): Requester,
    Json(req): Json<GenerateChapterRequest>,
) -> Result<Json<ApiResponse<DispatchResult>>, ApiError> {
    dispatch(
        &state,
        requester,
        GenerationRequest::Chapter {
            novel_id: req.novel_id,
            chapter_number: req.chapter_number,
            seed: req.seed(),
        },
        req.run_async,
    )
    .await
}
