//! Stream Registry Port - 流式会话注册表
//!
//! 具体实现在 infrastructure/memory

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::StreamKey;

/// 注册表错误
#[derive(Debug, Error)]
pub enum StreamRegistryError {
    #[error("Stream already active: {0}")]
    AlreadyActive(StreamKey),
}

/// 活动中的流式会话
#[derive(Debug, Clone)]
pub struct StreamSession {
    pub id: Uuid,
    pub key: StreamKey,
    pub cancelled: Arc<AtomicBool>,
    pub started_at: DateTime<Utc>,
}

impl StreamSession {
    pub fn new(key: StreamKey) -> Self {
        Self {
            id: Uuid::new_v4(),
            key,
            cancelled: Arc::new(AtomicBool::new(false)),
            started_at: Utc::now(),
        }
    }

    pub fn destination(&self) -> String {
        self.key.destination()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Stream Registry Port
pub trait StreamRegistryPort: Send + Sync {
    /// 登记新会话；同一键已有活动会话时拒绝
    fn register(&self, key: StreamKey) -> Result<StreamSession, StreamRegistryError>;

    /// 设置取消标志，返回会话是否存在
    fn cancel(&self, key: &StreamKey) -> bool;

    /// 注销会话，仅当键仍由 `session_id` 持有时生效
    fn release(&self, key: &StreamKey, session_id: Uuid) -> bool;

    fn is_active(&self, key: &StreamKey) -> bool;

    fn active_keys(&self) -> Vec<StreamKey>;
}
