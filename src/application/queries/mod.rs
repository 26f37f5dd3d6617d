//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：阅读页与小说页都是只读的

mod chapter_queries;
mod novel_queries;

pub mod handlers;

pub use chapter_queries::*;
pub use novel_queries::*;
