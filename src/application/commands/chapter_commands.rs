//! Chapter Commands

use uuid::Uuid;

/// 手动创建章节（可带标题与摘要）
#[derive(Debug, Clone)]
pub struct CreateChapter {
    pub requester: String,
    pub novel_id: Uuid,
    pub chapter_number: u32,
    pub title: Option<String>,
    pub abstract_content: Option<String>,
}

/// 修改章节标题
#[derive(Debug, Clone)]
pub struct UpdateChapter {
    pub requester: String,
    pub chapter_id: Uuid,
    pub title: String,
}

/// 删除章节及其向量条目
#[derive(Debug, Clone)]
pub struct DeleteChapter {
    pub requester: String,
    pub chapter_id: Uuid,
}
