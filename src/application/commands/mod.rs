//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：处理所有写操作。
//! 生成与流式命令由 `application::generation` 中的 Dispatcher / StreamRelay 处理。

mod chapter_commands;
mod generation_commands;
mod knowledge_commands;
mod novel_commands;
mod stream_commands;

pub mod handlers;

pub use chapter_commands::*;
pub use generation_commands::*;
pub use knowledge_commands::*;
pub use novel_commands::*;
pub use stream_commands::*;
