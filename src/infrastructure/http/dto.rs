//! Data Transfer Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::{ChapterRecord, ChapterSeed, KnowledgeEntry, ModelKind, NovelRecord};
use crate::domain::task::Task;
use crate::domain::StreamVariant;

use super::error::ApiError;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Model DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SaveModelRequest {
    pub kind: ModelKind,
    pub api_key: String,
    pub base_url: String,
    pub model_name: String,
}

#[derive(Debug, Serialize)]
pub struct ModelResponse {
    pub kind: ModelKind,
    pub base_url: String,
    pub model_name: String,
}

// ============================================================================
// Novel / Chapter DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateNovelRequest {
    pub title: String,
    #[serde(default)]
    pub genre: String,
    pub setting_text: Option<String>,
    pub planned_chapters: Option<u32>,
    pub chapter_word_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct NovelIdRequest {
    pub novel_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CreatedNovelResponse {
    pub id: Uuid,
    pub title: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct NovelResponse {
    pub id: Uuid,
    pub title: String,
    pub genre: String,
    pub setting_text: Option<String>,
    pub structure: Option<String>,
    pub chapter_outline: Option<String>,
    pub planned_chapters: Option<u32>,
    pub chapter_word_count: Option<u32>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<NovelRecord> for NovelResponse {
    fn from(record: NovelRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            genre: record.genre,
            setting_text: record.setting_text,
            structure: record.structure,
            chapter_outline: record.chapter_outline,
            planned_chapters: record.planned_chapters,
            chapter_word_count: record.chapter_word_count,
            status: record.status.as_str().to_string(),
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChapterResponse {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub chapter_number: u32,
    pub title: Option<String>,
    pub abstract_content: Option<String>,
    pub content: Option<String>,
    pub status: String,
    pub updated_at: String,
}

impl From<ChapterRecord> for ChapterResponse {
    fn from(record: ChapterRecord) -> Self {
        Self {
            id: record.id,
            novel_id: record.novel_id,
            chapter_number: record.chapter_number,
            title: record.title,
            abstract_content: record.abstract_content,
            content: record.content,
            status: record.status.as_str().to_string(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateChapterRequest {
    pub novel_id: Uuid,
    pub chapter_number: u32,
    pub title: Option<String>,
    pub abstract_content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateChapterRequest {
    pub chapter_id: Uuid,
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct ChapterIdRequest {
    pub chapter_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: Uuid,
}

// ============================================================================
// Knowledge DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UploadKnowledgeRequest {
    pub novel_id: Uuid,
    pub name: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct KnowledgeIdRequest {
    pub entry_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct KnowledgeResponse {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub name: String,
    pub vector_id: String,
    pub created_at: String,
}

impl From<KnowledgeEntry> for KnowledgeResponse {
    fn from(entry: KnowledgeEntry) -> Self {
        Self {
            id: entry.id,
            novel_id: entry.novel_id,
            name: entry.name,
            vector_id: entry.vector_id,
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Generation DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub novel_id: Uuid,
    /// true 时入队异步执行
    #[serde(default, rename = "async")]
    pub run_async: bool,
}

#[derive(Debug, Deserialize)]
pub struct GenerateChapterRequest {
    pub novel_id: Uuid,
    pub chapter_number: u32,
    #[serde(default, rename = "async")]
    pub run_async: bool,
    /// 仅在章节首次创建时写入
    pub title: Option<String>,
    pub abstract_content: Option<String>,
}

impl GenerateChapterRequest {
    pub fn seed(&self) -> ChapterSeed {
        ChapterSeed {
            title: self.title.clone(),
            abstract_content: self.abstract_content.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DispatchResult {
    pub task: TaskResponse,
    pub queued: bool,
    /// 请求异步但已内联执行
    pub inline_fallback: bool,
}

// ============================================================================
// Stream DTOs
// ============================================================================

/// 流式请求：`target` 为 structure / outline / chapter，chapter 需带章节号
#[derive(Debug, Deserialize)]
pub struct StreamRequest {
    pub novel_id: Uuid,
    pub target: String,
    pub chapter_number: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub abstract_content: Option<String>,
}

impl StreamRequest {
    pub fn seed(&self) -> ChapterSeed {
        ChapterSeed {
            title: self.title.clone(),
            abstract_content: self.abstract_content.clone(),
        }
    }

    pub fn variant(&self) -> Result<StreamVariant, ApiError> {
        match (self.target.as_str(), self.chapter_number) {
            ("structure", _) => Ok(StreamVariant::Structure),
            ("outline", _) => Ok(StreamVariant::Outline),
            ("chapter", Some(n)) if n > 0 => Ok(StreamVariant::Chapter(n)),
            ("chapter", _) => Err(ApiError::BadRequest(
                "chapter_number must be a positive integer".to_string(),
            )),
            (other, _) => Err(ApiError::BadRequest(format!(
                "Unknown stream target: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StreamStartedResponse {
    pub session_id: Uuid,
    pub task_id: Uuid,
    /// WebSocket 订阅地址为 `/ws{destination}`
    pub destination: String,
}

#[derive(Debug, Serialize)]
pub struct StreamStoppedResponse {
    pub stopped: bool,
}

// ============================================================================
// Task DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TaskIdRequest {
    pub task_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SubjectRequest {
    pub subject_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct StaleTasksParams {
    #[serde(default = "default_older_than_secs")]
    pub older_than_secs: u64,
}

fn default_older_than_secs() -> u64 {
    3600
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: Uuid,
    pub name: String,
    pub task_type: String,
    pub subject_id: Uuid,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            name: task.name().to_string(),
            task_type: task.kind.as_str().to_string(),
            subject_id: task.subject_id,
            status: task.status.as_str().to_string(),
            created_at: task.created_at.to_rfc3339(),
            updated_at: task.updated_at.to_rfc3339(),
        }
    }
}
