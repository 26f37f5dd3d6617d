//! Novel Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NovelError {
    #[error("无效的标识: {0}")]
    InvalidIdentifier(String),

    #[error("无效的章节号: {0}")]
    InvalidChapterNumber(i64),

    #[error("无效的标题: {0}")]
    InvalidTitle(String),
}
