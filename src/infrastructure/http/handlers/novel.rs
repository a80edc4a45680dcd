//! Novel HTTP Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{CreateNovel, GetNovel, ListNovels};
use crate::infrastructure::http::dto::{
    ApiResponse, CreateNovelRequest, CreatedNovelResponse, NovelIdRequest, NovelResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::middleware::Requester;
use crate::infrastructure::http::state::AppState;

/// 创建小说
pub async fn create_novel(
    State(state): State<Arc<AppState>>,
    Requester(requester): Requester,
    Json(req): Json<CreateNovelRequest>,
) -> Result<Json<ApiResponse<CreatedNovelResponse>>, ApiError> {
    let created = state
        .create_novel_handler
        .handle(CreateNovel {
            requester,
            title: req.title,
            genre: req.genre,
            setting_text: req.setting_text,
            planned_chapters: req.planned_chapters,
            chapter_word_count: req.chapter_word_count,
        })
        .await?;

    Ok(Json(ApiResponse::success(CreatedNovelResponse {
        id: created.id,
        title: created.title,
        status: created.status.as_str().to_string(),
    })))
}

/// 获取小说详情
pub async fn get_novel(
    State(state): State<Arc<AppState>>,
    Requester(requester): Requester,
    Json(req): Json<NovelIdRequest>,
) -> Result<Json<ApiResponse<NovelResponse>>, ApiError> {
    let novel = state
        .get_novel_handler
        .handle(GetNovel {
            requester,
            novel_id: req.novel_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(NovelResponse::from(novel))))
}

/// 列出请求者的小说
pub async fn list_novels(
    State(state): State<Arc<AppState>>,
    Requester(requester): Requester,
) -> Result<Json<ApiResponse<Vec<NovelResponse>>>, ApiError> {
    let novels = state
        .list_novels_handler
        .handle(ListNovels { requester })
        .await?;

    Ok(Json(ApiResponse::success(
        novels.into_iter().map(NovelResponse::from).collect(),
    )))
}
