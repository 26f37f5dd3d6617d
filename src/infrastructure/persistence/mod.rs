//! Persistence Layer - 数据持久化
//!
//! SQLite 存储实现与种子数据导入

mod seed;
pub mod sqlite;

pub use seed::{import_seed, SeedSummary};
