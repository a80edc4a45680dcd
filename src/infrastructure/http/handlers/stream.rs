//! Stream HTTP Handlers
//!
//! 开始/停止流式生成，帧通过 `/ws{destination}` 推送

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{StartStream, StopStream};
use crate::infrastructure::http::dto::{
    ApiResponse, StreamRequest, StreamStartedResponse, StreamStoppedResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::middleware::Requester;
use crate::infrastructure::http::state::AppState;

/// 开始流式生成
pub async fn start_stream(
    State(state): State<Arc<AppState>>,
    Requester(requester): Requester,
    Json(req): Json<StreamRequest>,
) -> Result<Json<ApiResponse<StreamStartedResponse>>, ApiError> {
    let variant = req.variant()?;
    let started = state
        .relay
        .start(StartStream {
            requester,
            novel_id: req.novel_id,
            variant,
            seed: req.seed(),
        })
        .await?;

    Ok(Json(ApiResponse::success(StreamStartedResponse {
        session_id: started.session_id,
        task_id: started.task_id,
        destination: started.destination,
    })))
}

/// 停止流式生成，没有活动会话时 `stopped=false`
pub async fn stop_stream(
    State(state): State<Arc<AppState>>,
    Requester(requester): Requester,
    Json(req): Json<StreamRequest>,
) -> Result<Json<ApiResponse<StreamStoppedResponse>>, ApiError> {
    let variant = req.variant()?;
    let response = state
        .relay
        .stop(StopStream {
            requester,
            novel_id: req.novel_id,
            variant,
        })
        .await?;

    Ok(Json(ApiResponse::success(StreamStoppedResponse {
        stopped: response.stopped,
    })))
}
