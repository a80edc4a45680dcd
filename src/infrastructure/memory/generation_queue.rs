//! In-Memory Generation Queue Implementation

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::application::ports::{GenerationMessage, GenerationQueuePort, QueueError};

/// 进程内生成队列（mpsc 发送端）
pub struct InMemoryGenerationQueue {
    sender: mpsc::Sender<GenerationMessage>,
}

impl InMemoryGenerationQueue {
    pub fn new(sender: mpsc::Sender<GenerationMessage>) -> Self {
        Self { sender }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl GenerationQueuePort for InMemoryGenerationQueue {
    fn publish(&self, message: GenerationMessage) -> Result<(), QueueError> {
        let task_id = message.task_id;
        self.sender.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => QueueError::Full,
            TrySendError::Closed(_) => QueueError::Closed,
        })?;
        tracing::debug!(task_id = %task_id, "Generation message enqueued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::GenerationTarget;
    use uuid::Uuid;

    fn message() -> GenerationMessage {
        GenerationMessage {
            task_id: Uuid::new_v4(),
            target: GenerationTarget::Outline {
                novel_id: Uuid::new_v4(),
            },
        }
    }

    #[tokio::test]
    async fn test_publish_and_receive() {
        let (tx, mut rx) = mpsc::channel(4);
        let queue = InMemoryGenerationQueue::new(tx);

        let msg = message();
        queue.publish(msg.clone()).unwrap();
        let received = rx.try_recv().unwrap();
        assert_eq!(received.task_id, msg.task_id);
    }

    #[tokio::test]
    async fn test_full_and_closed() {
        let (tx, rx) = mpsc::channel(1);
        let queue = InMemoryGenerationQueue::new(tx);

        queue.publish(message()).unwrap();
        assert!(matches!(queue.publish(message()), Err(QueueError::Full)));

        drop(rx);
        assert!(matches!(queue.publish(message()), Err(QueueError::Closed)));
    }
}
