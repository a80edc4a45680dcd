//! Event Publisher Implementation
//!
//! 按目的地（订阅主题）广播流式推送帧，供 WebSocket 订阅转发

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::application::ports::FramePublisherPort;
use crate::domain::StreamFrame;

/// 每个目的地的广播缓冲帧数
const CHANNEL_CAPACITY: usize = 1024;

/// 事件发布器
pub struct EventPublisher {
    /// destination -> broadcast sender
    channels: DashMap<String, broadcast::Sender<StreamFrame>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅目的地，通道不存在时创建（允许在流开始前订阅）
    pub fn subscribe(&self, destination: &str) -> broadcast::Receiver<StreamFrame> {
        self.channels
            .entry(destination.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// 当前订阅者数量
    pub fn subscriber_count(&self, destination: &str) -> usize {
        self.channels
            .get(destination)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }

    /// 清理没有订阅者的通道
    pub fn prune(&self) -> usize {
        let before = self.channels.len();
        self.channels.retain(|_, sender| sender.receiver_count() > 0);
        before - self.channels.len()
    }
}

impl FramePublisherPort for EventPublisher {
    fn publish(&self, destination: &str, frame: StreamFrame) {
        let Some(sender) = self.channels.get(destination) else {
            tracing::debug!(destination = %destination, "No subscribers, frame dropped");
            return;
        };
        if let Err(e) = sender.send(frame) {
            tracing::debug!(
                destination = %destination,
                error = %e,
                "Failed to publish frame (no receivers)"
            );
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FrameType;

    #[tokio::test]
    async fn test_subscribe_before_publish() {
        let publisher = EventPublisher::new();
        let mut rx = publisher.subscribe("/topic/a");

        publisher.publish("/topic/a", StreamFrame::delta("x"));
        publisher.publish("/topic/b", StreamFrame::delta("y"));

        let frame = rx.recv().await.unwrap();
        assert_eq!(frame.frame_type, FrameType::Delta);
        assert_eq!(frame.content.as_deref(), Some("x"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_prune_drops_idle_channels() {
        let publisher = EventPublisher::new();
        let rx = publisher.subscribe("/topic/a");
        let _keep = publisher.subscribe("/topic/b");
        assert_eq!(publisher.subscriber_count("/topic/a"), 1);

        drop(rx);
        assert_eq!(publisher.prune(), 1);
        assert_eq!(publisher.subscriber_count("/topic/a"), 0);
        assert_eq!(publisher.subscriber_count("/topic/b"), 1);
    }
}
