//! Domain Layer - 领域层
//!
//! - Novel Context: 小说、章节、文档标识
//! - 章节正文格式化（段落识别 + 图片标记抽取）

pub mod novel;

mod content_formatter;

pub use content_formatter::{
    format_chapter, is_paragraph_wrapped, normalize_gallery, ContentBlock, EmbeddedImage,
    FormattedContent, GalleryImage,
};
