//! Model Credential HTTP Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::SaveModel;
use crate::infrastructure::http::dto::{ApiResponse, ModelResponse, SaveModelRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::middleware::Requester;
use crate::infrastructure::http::state::AppState;

/// 保存请求者的对话/向量模型凭据
pub async fn save_model(
    State(state): State<Arc<AppState>>,
    Requester(requester): Requester,
    Json(req): Json<SaveModelRequest>,
) -> Result<Json<ApiResponse<ModelResponse>>, ApiError> {
    let saved = state
        .save_model_handler
        .handle(SaveModel {
            requester,
            kind: req.kind,
            api_key: req.api_key,
            base_url: req.base_url,
            model_name: req.model_name,
        })
        .await?;

    Ok(Json(ApiResponse::success(ModelResponse {
        kind: saved.kind,
        base_url: saved.base_url,
        model_name: saved.model_name,
    })))
}
