//! Chapter Queries

/// 阅读页查询：解析章节及其前后章节
///
/// chapter_id 可以是存储标识，也可以是 `dummy-chapter-<n>` 占位标识。
#[derive(Debug, Clone)]
pub struct GetChapter {
    pub novel_id: String,
    pub chapter_id: String,
}
