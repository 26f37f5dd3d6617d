//! Query Handlers 实现
//!
//! 所有 QueryHandler 的具体实现

mod chapter_handlers;
mod lookup;
mod novel_handlers;

pub use chapter_handlers::*;
pub use lookup::UNKNOWN_AUTHOR;
pub use novel_handlers::*;
