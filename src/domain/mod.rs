//! Domain Layer - 领域层
//!
//! 包含:
//! - Task Context: 生成任务及其状态流转
//! - 大纲解析、中文数字转换
//! - 生成上下文与提示词
//! - 流式会话标识与推送帧

pub mod context;
pub mod numerals;
pub mod outline;
pub mod prompt;
pub mod stream;
pub mod task;

pub use numerals::chinese_numeral_to_u32;
pub use outline::{parse_outline, OutlineEntry};
pub use stream::{FrameType, StreamFrame, StreamKey, StreamVariant};
