//! HTTP Routes
//!
//! API Endpoints（请求者 ID 取自 `x-user-id` 头）:
//! - /api/ping                GET   健康检查
//! - /api/model/save          POST  保存模型凭据
//! - /api/novel/create        POST  创建小说
//! - /api/novel/get           POST  获取小说详情
//! - /api/novel/list          GET   列出小说
//! - /api/chapter/list        POST  列出章节
//! - /api/chapter/create      POST  创建章节（可带标题与摘要）
//! - /api/chapter/update      POST  修改章节标题
//! - /api/chapter/delete      POST  删除章节及其向量
//! - /api/knowledge/upload    POST  上传知识库条目
//! - /api/knowledge/list      POST  列出知识库条目
//! - /api/knowledge/delete    POST  删除知识库条目
//! - /api/generate/structure  POST  生成小说结构
//! - /api/generate/outline    POST  生成章节大纲
//! - /api/generate/chapter    POST  生成章节内容
//! - /api/stream/start        POST  开始流式生成
//! - /api/stream/stop         POST  停止流式生成
//! - /api/tasks/active        GET   进行中的任务
//! - /api/tasks/subject       POST  按生成单元查询任务
//! - /api/tasks/get           POST  获取任务
//! - /api/tasks/stale         GET   滞留的 PROCESSING 任务
//! - /ws/topic/*destination   WS    订阅流式推送帧

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/topic/*destination", get(handlers::topic_websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/model/save", post(handlers::save_model))
        .nest("/novel", novel_routes())
        .nest("/chapter", chapter_routes())
        .nest("/knowledge", knowledge_routes())
        .nest("/generate", generate_routes())
        .nest("/stream", stream_routes())
        .nest("/tasks", task_routes())
}

/// Novel 路由
fn novel_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(handlers::create_novel))
        .route("/get", post(handlers::get_novel))
        .route("/list", get(handlers::list_novels))
}

/// Chapter 路由
fn chapter_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/list", post(handlers::list_chapters))
        .route("/create", post(handlers::create_chapter))
        .route("/update", post(handlers::update_chapter))
        .route("/delete", post(handlers::delete_chapter))
}

/// Knowledge 路由
fn knowledge_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(handlers::upload_knowledge))
        .route("/list", post(handlers::list_knowledge))
        .route("/delete", post(handlers::delete_knowledge))
}

/// Generate 路由
fn generate_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/structure", post(handlers::generate_structure))
        .route("/outline", post(handlers::generate_outline))
        .route("/chapter", post(handlers::generate_chapter))
}

/// Stream 路由
fn stream_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/start", post(handlers::start_stream))
        .route("/stop", post(handlers::stop_stream))
}

/// Task 路由
fn task_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/active", get(handlers::list_active_tasks))
        .route("/subject", post(handlers::list_subject_tasks))
        .route("/get", post(handlers::get_task))
        .route("/stale", get(handlers::list_stale_tasks))
}
