//! Command Handlers 实现

mod chapter_handlers;
mod knowledge_handlers;
mod model_handlers;
mod novel_handlers;

pub use chapter_handlers::*;
pub use knowledge_handlers::*;
pub use model_handlers::*;
pub use novel_handlers::*;
