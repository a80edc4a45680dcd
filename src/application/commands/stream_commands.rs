//! Stream Commands - 流式生成会话

use uuid::Uuid;

use super::ChapterSeed;
use crate::domain::StreamVariant;

/// 开始流式生成
#[derive(Debug, Clone)]
pub struct StartStream {
    pub requester: String,
    pub novel_id: Uuid,
    pub variant: StreamVariant,
    /// 仅章节流使用
    pub seed: ChapterSeed,
}

/// 流式会话已建立，客户端订阅 `destination` 接收帧
#[derive(Debug, Clone)]
pub struct StreamStarted {
    pub session_id: Uuid,
    pub task_id: Uuid,
    pub destination: String,
}

/// 停止流式生成
#[derive(Debug, Clone)]
pub struct StopStream {
    pub requester: String,
    pub novel_id: Uuid,
    pub variant: StreamVariant,
}

#[derive(Debug, Clone)]
pub struct StopStreamResponse {
    /// 是否存在被停止的会话
    pub stopped: bool,
}
