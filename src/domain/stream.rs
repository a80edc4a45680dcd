//! 流式生成会话标识与推送帧

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 流式生成的变体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "variant", content = "chapter_number", rename_all = "snake_case")]
pub enum StreamVariant {
    Structure,
    Outline,
    Chapter(u32),
}

/// 会话键：(小说, 变体)，同一键同时最多一个活动会话
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamKey {
    pub novel_id: Uuid,
    pub variant: StreamVariant,
}

impl StreamKey {
    pub fn new(novel_id: Uuid, variant: StreamVariant) -> Self {
        Self { novel_id, variant }
    }

    /// 推送目的地（订阅主题）
    pub fn destination(&self) -> String {
        match self.variant {
            StreamVariant::Structure => format!("/topic/novels/{}/structure", self.novel_id),
            StreamVariant::Outline => format!("/topic/novels/{}/outline", self.novel_id),
            StreamVariant::Chapter(n) => format!("/topic/chapters/{}/{}", self.novel_id, n),
        }
    }
}

impl std::fmt::Display for StreamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.variant {
            StreamVariant::Structure => write!(f, "{}:structure", self.novel_id),
            StreamVariant::Outline => write!(f, "{}:outline", self.novel_id),
            StreamVariant::Chapter(n) => write!(f, "{}:{}", self.novel_id, n),
        }
    }
}

/// 推送帧类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameType {
    Delta,
    Complete,
    Stopped,
    Error,
}

/// 推送给订阅者的帧，JSON 形如 `{"type":"delta","content":"..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamFrame {
    #[serde(rename = "type")]
    pub frame_type: FrameType,
    pub content: Option<String>,
}

impl StreamFrame {
    pub fn delta(text: impl Into<String>) -> Self {
        Self {
            frame_type: FrameType::Delta,
            content: Some(text.into()),
        }
    }

    pub fn complete() -> Self {
        Self {
            frame_type: FrameType::Complete,
            content: None,
        }
    }

    pub fn stopped() -> Self {
        Self {
            frame_type: FrameType::Stopped,
            content: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            frame_type: FrameType::Error,
            content: Some(message.into()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.frame_type != FrameType::Delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destinations() {
        let id = Uuid::new_v4();
        assert_eq!(
            StreamKey::new(id, StreamVariant::Structure).destination(),
            format!("/topic/novels/{}/structure", id)
        );
        assert_eq!(
            StreamKey::new(id, StreamVariant::Outline).destination(),
            format!("/topic/novels/{}/outline", id)
        );
        assert_eq!(
            StreamKey::new(id, StreamVariant::Chapter(7)).destination(),
            format!("/topic/chapters/{}/7", id)
        );
    }

    #[test]
    fn test_keys_differ_by_variant() {
        let id = Uuid::new_v4();
        assert_ne!(
            StreamKey::new(id, StreamVariant::Chapter(1)),
            StreamKey::new(id, StreamVariant::Chapter(2))
        );
        assert_eq!(
            StreamKey::new(id, StreamVariant::Chapter(3)).to_string(),
            format!("{}:3", id)
        );
    }

    #[test]
    fn test_frame_json() {
        let json = serde_json::to_value(StreamFrame::delta("你好")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "delta", "content": "你好"}));

        let json = serde_json::to_value(StreamFrame::stopped()).unwrap();
        assert_eq!(json, serde_json::json!({"type": "stopped", "content": null}));
        assert!(StreamFrame::stopped().is_terminal());
    }
}
