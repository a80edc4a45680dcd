//! Novel Commands

use crate::application::ports::ModelKind;

/// 创建小说命令
#[derive(Debug, Clone)]
pub struct CreateNovel {
    pub requester: String,
    pub title: String,
    pub genre: String,
    pub setting_text: Option<String>,
    pub planned_chapters: Option<u32>,
    pub chapter_word_count: Option<u32>,
}

/// 保存模型凭据命令
#[derive(Debug, Clone)]
pub struct SaveModel {
    pub requester: String,
    pub kind: ModelKind,
    pub api_key: String,
    pub base_url: String,
    pub model_name: String,
}
