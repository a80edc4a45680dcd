//! Chapter HTTP Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{CreateChapter, DeleteChapter, ListChapters, UpdateChapter};
use crate::infrastructure::http::dto::{
    ApiResponse, ChapterIdRequest, ChapterResponse, CreateChapterRequest, DeletedResponse,
    NovelIdRequest, UpdateChapterRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::middleware::Requester;
use crate::infrastructure::http::state::AppState;

/// 列出小说章节
pub async fn list_chapters(
    State(state): State<Arc<AppState>>,
    Requester(requester): Requester,
    Json(req): Json<NovelIdRequest>,
) -> Result<Json<ApiResponse<Vec<ChapterResponse>>>, ApiError> {
    let chapters = state
        .list_chapters_handler
        .handle(ListChapters {
            requester,
            novel_id: req.novel_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(
        chapters.into_iter().map(ChapterResponse::from).collect(),
    )))
}

/// 创建章节
pub async fn create_chapter(
    State(state): State<Arc<AppState>>,
    Requester(requester): Requester,
    Json(req): Json<CreateChapterRequest>,
) -> Result<Json<ApiResponse<ChapterResponse>>, ApiError> {
    let chapter = state
        .create_chapter_handler
        .handle(CreateChapter {
            requester,
            novel_id: req.novel_id,
            chapter_number: req.chapter_number,
            title: req.title,
            abstract_content: req.abstract_content,
        })
        .await?;

    Ok(Json(ApiResponse::success(ChapterResponse::from(chapter))))
}

/// 修改章节标题
pub async fn update_chapter(
    State(state): State<Arc<AppState>>,
    Requester(requester): Requester,
    Json(req): Json<UpdateChapterRequest>,
) -> Result<Json<ApiResponse<ChapterResponse>>, ApiError> {
    let chapter = state
        .update_chapter_handler
        .handle(UpdateChapter {
            requester,
            chapter_id: req.chapter_id,
            title: req.title,
        })
        .await?;

    Ok(Json(ApiResponse::success(ChapterResponse::from(chapter))))
}

/// 删除章节
pub async fn delete_chapter(
    State(state): State<Arc<AppState>>,
    Requester(requester): Requester,
    Json(req): Json<ChapterIdRequest>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    state
        .delete_chapter_handler
        .handle(DeleteChapter {
            requester,
            chapter_id: req.chapter_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(DeletedResponse {
        id: req.chapter_id,
    })))
}
