//! Knowledge Commands - 用户知识库

use uuid::Uuid;

/// 上传一段资料到小说的检索集合
#[derive(Debug, Clone)]
pub struct UploadKnowledge {
    pub requester: String,
    pub novel_id: Uuid,
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct DeleteKnowledge {
    pub requester: String,
    pub entry_id: Uuid,
}
