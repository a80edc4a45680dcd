//! SQLite Persistence - SQLite 数据库持久化实现

mod chapter_repo;
mod credential_repo;
mod database;
mod knowledge_repo;
mod novel_repo;
mod task_repo;

pub use chapter_repo::*;
pub use credential_repo::*;
pub use database::*;
pub use knowledge_repo::*;
pub use novel_repo::*;
pub use task_repo::*;
