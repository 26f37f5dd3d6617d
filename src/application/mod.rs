//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（小说、章节、用户文档仓储）
//! - queries: CQRS 查询及处理器（章节解析、小说详情、小说列表）
//! - error: 应用层错误定义
//!
//! 作品与章节由外部的创作端写入，这里只读。

pub mod error;
pub mod ports;
pub mod queries;

pub use error::ApplicationError;

pub use ports::{
    ChapterRecord, ChapterRepositoryPort, NovelRecord, NovelRepositoryPort, RepositoryError,
    UserRecord, UserRepositoryPort,
};

pub use queries::{
    // Chapter queries
    GetChapter,
    // Novel queries
    GetNovel,
    ListNovels,
    // Handlers
    handlers::{
        ChapterDisplay, ChapterNavigation, ChapterRef, ChapterView, GetChapterHandler,
        GetNovelHandler, ListNovelsHandler, NovelDetail, NovelSummary, ResolvedBy,
        UNKNOWN_AUTHOR,
    },
};
