//! Query Handlers 实现

mod novel_handlers;
mod task_handlers;

pub use novel_handlers::*;
pub use task_handlers::*;
