//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（如 SQLite）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::task::{Task, TaskKind, TaskStatus};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// Novel Repository
// ============================================================================

/// 小说状态（对外可见，生成失败时回退）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NovelStatus {
    /// 草稿
    Draft,
    /// 生成中
    Generating,
    /// 已生成
    Ready,
}

impl NovelStatus {
    pub fn code(&self) -> i64 {
        match self {
            NovelStatus::Draft => 0,
            NovelStatus::Generating => 1,
            NovelStatus::Ready => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(NovelStatus::Draft),
            1 => Some(NovelStatus::Generating),
            2 => Some(NovelStatus::Ready),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NovelStatus::Draft => "draft",
            NovelStatus::Generating => "generating",
            NovelStatus::Ready => "ready",
        }
    }
}

impl Default for NovelStatus {
    fn default() -> Self {
        NovelStatus::Draft
    }
}

/// 小说实体（用于持久化）
#[derive(Debug, Clone, Serialize)]
pub struct NovelRecord {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub genre: String,
    pub setting_text: Option<String>,
    /// 小说结构（模型生成）
    pub structure: Option<String>,
    /// 章节大纲原文（模型生成）
    pub chapter_outline: Option<String>,
    pub planned_chapters: Option<u32>,
    pub chapter_word_count: Option<u32>,
    pub status: NovelStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NovelRecord {
    pub fn new(owner_id: impl Into<String>, title: impl Into<String>, genre: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            title: title.into(),
            genre: genre.into(),
            setting_text: None,
            structure: None,
            chapter_outline: None,
            planned_chapters: None,
            chapter_word_count: None,
            status: NovelStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_structure(&self) -> bool {
        self.structure
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Novel Repository Port
#[async_trait]
pub trait NovelRepositoryPort: Send + Sync {
    /// 保存小说（存在则整体更新）
    async fn save(&self, novel: &NovelRecord) -> Result<(), RepositoryError>;

    /// 根据 ID 查找小说
    async fn find_by_id(&self, id: Uuid) -> Result<Option<NovelRecord>, RepositoryError>;

    /// 获取用户的所有小说
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<NovelRecord>, RepositoryError>;

    /// 小说所属用户
    async fn owner_of(&self, id: Uuid) -> Result<Option<String>, RepositoryError>;

    /// 更新小说状态
    async fn update_status(&self, id: Uuid, status: NovelStatus) -> Result<(), RepositoryError>;
}

// ============================================================================
// Chapter Repository
// ============================================================================

/// 章节状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChapterStatus {
    /// 待生成
    Pending,
    /// 生成中
    Processing,
    /// 已完成
    Complete,
}

impl ChapterStatus {
    pub fn code(&self) -> i64 {
        match self {
            ChapterStatus::Pending => 0,
            ChapterStatus::Processing => 1,
            ChapterStatus::Complete => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ChapterStatus::Pending),
            1 => Some(ChapterStatus::Processing),
            2 => Some(ChapterStatus::Complete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChapterStatus::Pending => "pending",
            ChapterStatus::Processing => "processing",
            ChapterStatus::Complete => "complete",
        }
    }
}

/// 章节实体（用于持久化）
#[derive(Debug, Clone, Serialize)]
pub struct ChapterRecord {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub chapter_number: u32,
    pub title: Option<String>,
    pub abstract_content: Option<String>,
    pub content: Option<String>,
    /// 向量库中的条目 ID
    pub vector_id: Option<String>,
    pub status: ChapterStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChapterRecord {
    /// 章节占位记录
    pub fn placeholder(novel_id: Uuid, chapter_number: u32, title: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            novel_id,
            chapter_number,
            title,
            abstract_content: None,
            content: None,
            vector_id: None,
            status: ChapterStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_title(&self) -> bool {
        self.title
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Chapter Repository Port
#[async_trait]
pub trait ChapterRepositoryPort: Send + Sync {
    /// 保存章节（存在则整体更新）
    ///
    /// (novel_id, chapter_number) 冲突时返回 `RepositoryError::Duplicate`
    async fn save(&self, chapter: &ChapterRecord) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ChapterRecord>, RepositoryError>;

    /// 获取小说的所有章节（按章节号升序）
    async fn find_by_novel_id(&self, novel_id: Uuid) -> Result<Vec<ChapterRecord>, RepositoryError>;

    async fn find_by_number(
        &self,
        novel_id: Uuid,
        chapter_number: u32,
    ) -> Result<Option<ChapterRecord>, RepositoryError>;

    /// 更新章节状态
    async fn update_status(&self, id: Uuid, status: ChapterStatus) -> Result<(), RepositoryError>;

    /// 删除章节，不存在时返回 NotFound
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

// ============================================================================
// Task Repository
// ============================================================================

/// Task Repository Port
#[async_trait]
pub trait TaskRepositoryPort: Send + Sync {
    /// 保存任务（存在则更新状态）
    async fn save(&self, task: &Task) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, RepositoryError>;

    /// 获取关联对象的所有任务（按创建时间倒序）
    async fn find_by_subject(&self, subject_id: Uuid) -> Result<Vec<Task>, RepositoryError>;

    /// 获取处于指定状态的任务（按创建时间倒序）
    async fn find_by_statuses(&self, statuses: &[TaskStatus]) -> Result<Vec<Task>, RepositoryError>;

    /// 获取关联对象最近一次的同类任务
    async fn find_latest(
        &self,
        kind: TaskKind,
        subject_id: Uuid,
    ) -> Result<Option<Task>, RepositoryError>;
}

// ============================================================================
// Knowledge Repository
// ============================================================================

/// 用户上传的知识库条目，正文只存于向量库
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeEntry {
    pub id: Uuid,
    pub owner_id: String,
    pub novel_id: Uuid,
    pub name: String,
    pub vector_id: String,
    pub created_at: DateTime<Utc>,
}

impl KnowledgeEntry {
    pub fn new(
        owner_id: impl Into<String>,
        novel_id: Uuid,
        name: impl Into<String>,
        vector_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            novel_id,
            name: name.into(),
            vector_id: vector_id.into(),
            created_at: Utc::now(),
        }
    }
}

/// Knowledge Repository Port
#[async_trait]
pub trait KnowledgeRepositoryPort: Send + Sync {
    async fn save(&self, entry: &KnowledgeEntry) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<KnowledgeEntry>, RepositoryError>;

    /// 小说下的所有条目（按创建时间升序）
    async fn find_by_novel(&self, novel_id: Uuid) -> Result<Vec<KnowledgeEntry>, RepositoryError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

// ============================================================================
// Model Credential Repository
// ============================================================================

/// 模型类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// 对话模型
    Chat,
    /// 向量模型
    Embedding,
}

impl ModelKind {
    pub fn code(&self) -> i64 {
        match self {
            ModelKind::Chat => 0,
            ModelKind::Embedding => 1,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ModelKind::Chat),
            1 => Some(ModelKind::Embedding),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Chat => "chat",
            ModelKind::Embedding => "embedding",
        }
    }
}

/// 用户的模型凭据
#[derive(Debug, Clone)]
pub struct ModelCredential {
    pub id: Uuid,
    pub owner_id: String,
    pub kind: ModelKind,
    pub api_key: String,
    pub base_url: String,
    pub model_name: String,
    pub created_at: DateTime<Utc>,
}

impl ModelCredential {
    pub fn new(
        owner_id: impl Into<String>,
        kind: ModelKind,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            kind,
            api_key: api_key.into(),
            base_url: base_url.into(),
            model_name: model_name.into(),
            created_at: Utc::now(),
        }
    }
}

/// Credential Repository Port
#[async_trait]
pub trait CredentialRepositoryPort: Send + Sync {
    /// 保存凭据，同一用户同一类型只保留一条
    async fn save(&self, credential: &ModelCredential) -> Result<(), RepositoryError>;

    async fn find(
        &self,
        owner_id: &str,
        kind: ModelKind,
    ) -> Result<Option<ModelCredential>, RepositoryError>;
}
