//! Task HTTP Handlers

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::application::{GetTask, ListActiveTasks, ListStaleTasks, ListTasksBySubject};
use crate::domain::task::Task;
use crate::infrastructure::http::dto::{
    ApiResponse, StaleTasksParams, SubjectRequest, TaskIdRequest, TaskResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

fn task_list(tasks: Vec<Task>) -> Json<ApiResponse<Vec<TaskResponse>>> {
    Json(ApiResponse::success(
        tasks.into_iter().map(TaskResponse::from).collect(),
    ))
}

/// 进行中的任务
pub async fn list_active_tasks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<TaskResponse>>>, ApiError> {
    let tasks = state.task_query_handler.active(ListActiveTasks).await?;
    Ok(task_list(tasks))
}

/// 某个小说或章节的任务
pub async fn list_subject_tasks(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubjectRequest>,
) -> Result<Json<ApiResponse<Vec<TaskResponse>>>, ApiError> {
    let tasks = state
        .task_query_handler
        .by_subject(ListTasksBySubject {
            subject_id: req.subject_id,
        })
        .await?;
    Ok(task_list(tasks))
}

/// 单个任务
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TaskIdRequest>,
) -> Result<Json<ApiResponse<TaskResponse>>, ApiError> {
    let task = state
        .task_query_handler
        .get(GetTask {
            task_id: req.task_id,
        })
        .await?;
    Ok(Json(ApiResponse::success(TaskResponse::from(task))))
}

/// 滞留在 PROCESSING 的任务（只报告）
pub async fn list_stale_tasks(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StaleTasksParams>,
) -> Result<Json<ApiResponse<Vec<TaskResponse>>>, ApiError> {
    let tasks = state
        .task_query_handler
        .stale(ListStaleTasks {
            older_than_secs: params.older_than_secs,
        })
        .await?;
    Ok(task_list(tasks))
}
