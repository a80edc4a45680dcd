//! Memory Layer - In-Memory State Management
//!
//! 实现 GenerationQueue 和 StreamRegistry，管理生成消息与流式会话的内存状态

mod generation_queue;
mod stream_registry;

pub use generation_queue::InMemoryGenerationQueue;
pub use stream_registry::InMemoryStreamRegistry;
