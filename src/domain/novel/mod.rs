//! Novel Context - 小说限界上下文
//!
//! 职责:
//! - 小说聚合与章节存储方式
//! - 章节实体
//! - 文档标识的两种编码

mod aggregate;
mod entities;
mod errors;
mod value_objects;

pub use aggregate::{Adjacent, ChapterStorage, Novel};
pub use entities::{
    placeholder_number, Chapter, ChapterId, ChapterKey, ChapterNumber, PLACEHOLDER_CHAPTER_ID,
    PLACEHOLDER_PREFIX,
};
pub use errors::NovelError;
pub use value_objects::{ChapterImage, DocumentId, IdKind, ObjectId};
