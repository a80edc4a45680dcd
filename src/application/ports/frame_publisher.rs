//! Frame Publisher Port - 推送帧发布

use crate::domain::StreamFrame;

/// Frame Publisher Port
///
/// 按目的地广播推送帧，没有订阅者时直接丢弃
pub trait FramePublisherPort: Send + Sync {
    fn publish(&self, destination: &str, frame: StreamFrame);
}
