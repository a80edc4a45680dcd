//! Novel Queries

use uuid::Uuid;

/// 获取小说详情查询
#[derive(Debug, Clone)]
pub struct GetNovel {
    pub requester: String,
    pub novel_id: Uuid,
}

/// 列出请求者的所有小说
#[derive(Debug, Clone)]
pub struct ListNovels {
    pub requester: String,
}

/// 列出小说的章节（按章节号升序）
#[derive(Debug, Clone)]
pub struct ListChapters {
    pub requester: String,
    pub novel_id: Uuid,
}

/// 列出小说的知识库条目
#[derive(Debug, Clone)]
pub struct ListKnowledge {
    pub requester: String,
    pub novel_id: Uuid,
}
