//! SQLite Persistence - SQLite 数据库持久化实现

mod chapter_repo;
mod database;
mod novel_repo;
mod user_repo;

pub use chapter_repo::*;
pub use database::{create_pool, run_migrations, DatabaseConfig, DbPool};
pub use novel_repo::*;
pub use user_repo::*;
