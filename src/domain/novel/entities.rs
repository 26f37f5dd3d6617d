//! Novel Context - Entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChapterImage, DocumentId, NovelError};

/// 占位章节标识前缀，完整形式为 `dummy-chapter-<n>`
pub const PLACEHOLDER_PREFIX: &str = "dummy-chapter-";

/// 保留的占位章节标识
pub const PLACEHOLDER_CHAPTER_ID: &str = "dummy-chapter-1";

/// 章节号（从 1 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChapterNumber(u32);

impl ChapterNumber {
    pub const FIRST: ChapterNumber = ChapterNumber(1);

    pub fn new(n: i64) -> Result<Self, NovelError> {
        if n < 1 || n > u32::MAX as i64 {
            return Err(NovelError::InvalidChapterNumber(n));
        }
        Ok(Self(n as u32))
    }

    /// 缺失或非正数时按第 1 章处理
    pub fn or_first(n: i64) -> Self {
        Self::new(n).unwrap_or(Self::FIRST)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn previous(&self) -> Option<Self> {
        (self.0 > 1).then(|| Self(self.0 - 1))
    }

    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl std::fmt::Display for ChapterNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 请求中的章节标识：存储标识（原始字符串）或占位标识
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterKey {
    Stored(String),
    Placeholder(ChapterNumber),
}

impl ChapterKey {
    /// 解析请求中的章节标识
    pub fn parse(raw: &str) -> Self {
        match placeholder_number(raw) {
            Some(number) => ChapterKey::Placeholder(number),
            None => ChapterKey::Stored(raw.to_string()),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, ChapterKey::Placeholder(_))
    }
}

/// 从 `dummy-chapter-<n>` 取出章节号
pub fn placeholder_number(raw: &str) -> Option<ChapterNumber> {
    let suffix = raw.strip_prefix(PLACEHOLDER_PREFIX)?;
    suffix
        .parse::<i64>()
        .ok()
        .and_then(|n| ChapterNumber::new(n).ok())
}

/// 章节实体
///
/// 不变量:
/// - 同一小说内按 number 升序排列
/// - 标识不参与排序
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    id: ChapterId,
    novel_id: Option<DocumentId>,
    number: ChapterNumber,
    title: String,
    content: String,
    images: Vec<ChapterImage>,
    created_at: Option<DateTime<Utc>>,
}

/// 章节标识（合成章节没有持久化标识）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterId {
    Stored(DocumentId),
    Synthetic(String),
}

impl ChapterId {
    pub fn canonical(&self) -> String {
        match self {
            ChapterId::Stored(id) => id.canonical(),
            ChapterId::Synthetic(s) => s.clone(),
        }
    }

    pub fn as_document_id(&self) -> Option<&DocumentId> {
        match self {
            ChapterId::Stored(id) => Some(id),
            ChapterId::Synthetic(_) => None,
        }
    }
}

impl Chapter {
    pub fn new(
        id: DocumentId,
        novel_id: Option<DocumentId>,
        number: ChapterNumber,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: ChapterId::Stored(id),
            novel_id,
            number,
            title: title.into(),
            content: content.into(),
            images: Vec::new(),
            created_at: None,
        }
    }

    /// 没有任何章节数据时的占位章节（不持久化）
    pub fn placeholder(novel_title: &str) -> Self {
        Self {
            id: ChapterId::Synthetic(PLACEHOLDER_CHAPTER_ID.to_string()),
            novel_id: None,
            number: ChapterNumber::FIRST,
            title: "Chapter 1".to_string(),
            content: format!(
                "<p>This is a sample chapter for \"{}\".</p>\n\
                 <p>No actual chapter content is available yet.</p>\n\
                 <p>Check back soon for updates!</p>",
                novel_title
            ),
            images: Vec::new(),
            created_at: Some(Utc::now()),
        }
    }

    pub fn with_images(mut self, images: Vec<ChapterImage>) -> Self {
        self.images = images;
        self
    }

    pub fn with_created_at(mut self, created_at: Option<DateTime<Utc>>) -> Self {
        self.created_at = created_at;
        self
    }

    // Getters
    pub fn id(&self) -> &ChapterId {
        &self.id
    }

    pub fn novel_id(&self) -> Option<&DocumentId> {
        self.novel_id.as_ref()
    }

    pub fn number(&self) -> ChapterNumber {
        self.number
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// 标题为空时回退为 "Chapter {n}"
    pub fn display_title(&self) -> String {
        if self.title.trim().is_empty() {
            format!("Chapter {}", self.number)
        } else {
            self.title.clone()
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn display_content(&self) -> &str {
        if self.content.trim().is_empty() {
            "No content available."
        } else {
            &self.content
        }
    }

    pub fn images(&self) -> &[ChapterImage] {
        &self.images
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self.id, ChapterId::Synthetic(_))
    }

    /// 是否属于指定小说；没有归属信息的章节视为匹配
    pub fn belongs_to(&self, novel_id: &DocumentId) -> bool {
        self.novel_id
            .as_ref()
            .map_or(true, |owner| owner.same_value(novel_id))
    }
}
