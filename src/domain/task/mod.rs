//! Task Context - 生成任务限界上下文
//!
//! 职责:
//! - 生成任务聚合（结构 / 大纲 / 章节内容）
//! - 任务状态流转规则

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::Task;
pub use errors::TaskError;
pub use value_objects::{TaskKind, TaskStatus};
