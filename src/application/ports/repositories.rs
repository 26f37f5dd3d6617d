//! Repository Ports - 出站端口
//!
//! 定义文档存储的抽象接口
//! 具体实现在 infrastructure 层（SQLite / 内存）
//!
//! 记录类型同时也是种子数据的 JSON 形状：
//! 字段用 camelCase，主键为 `_id`，结构化标识写作 `{"$oid": "..."}`。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::novel::{Chapter, ChapterImage, ChapterNumber, ChapterStorage, DocumentId, Novel};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

// ============================================================================
// Chapter Repository
// ============================================================================

/// 章节文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterRecord {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    /// 所属小说；内嵌章节通常没有
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub novel_id: Option<DocumentId>,
    #[serde(default)]
    pub chapter_number: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub images: Vec<ChapterImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ChapterRecord> for Chapter {
    fn from(record: ChapterRecord) -> Self {
        Chapter::new(
            record.id,
            record.novel_id,
            ChapterNumber::or_first(record.chapter_number),
            record.title,
            record.content,
        )
        .with_images(record.images)
        .with_created_at(record.created_at)
    }
}

/// Chapter Repository Port
#[async_trait]
pub trait ChapterRepositoryPort: Send + Sync {
    /// 保存章节
    async fn save(&self, chapter: &ChapterRecord) -> Result<(), RepositoryError>;

    /// 按标识查找（只匹配给定的那一种编码）
    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<ChapterRecord>, RepositoryError>;

    /// 按 (小说归一化标识, 章节号) 查找
    async fn find_by_number(
        &self,
        novel_ref: &str,
        number: u32,
    ) -> Result<Option<ChapterRecord>, RepositoryError>;

    /// 小说的全部章节，按章节号升序
    async fn find_by_novel(&self, novel_ref: &str) -> Result<Vec<ChapterRecord>, RepositoryError>;
}

// ============================================================================
// Novel Repository
// ============================================================================

/// 小说文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelRecord {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "author", skip_serializing_if = "Option::is_none")]
    pub author_id: Option<DocumentId>,
    /// 内嵌章节
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapters: Option<Vec<ChapterRecord>>,
    /// 引用的章节标识
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_ids: Option<Vec<DocumentId>>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl NovelRecord {
    pub fn new(id: DocumentId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            description: None,
            author_id: None,
            chapters: None,
            chapter_ids: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<NovelRecord> for Novel {
    fn from(record: NovelRecord) -> Self {
        let chapters = record
            .chapters
            .map(|chapters| chapters.into_iter().map(Chapter::from).collect());
        let storage = ChapterStorage::from_fields(chapters, record.chapter_ids);

        Novel::new(record.id, record.title, storage)
            .with_description(record.description)
            .with_author(record.author_id)
            .with_created_at(record.created_at)
    }
}

/// Novel Repository Port
#[async_trait]
pub trait NovelRepositoryPort: Send + Sync {
    /// 保存小说
    async fn save(&self, novel: &NovelRecord) -> Result<(), RepositoryError>;

    /// 按标识查找（只匹配给定的那一种编码）
    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<NovelRecord>, RepositoryError>;

    /// 获取所有小说，新建的在前
    async fn find_all(&self) -> Result<Vec<NovelRecord>, RepositoryError>;
}

// ============================================================================
// User Repository
// ============================================================================

/// 用户文档（只读，用于作者名）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl UserRecord {
    /// 显示名：name，其次 username
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.username.as_deref().filter(|n| !n.trim().is_empty()))
    }
}

/// User Repository Port
#[async_trait]
pub trait UserRepositoryPort: Send + Sync {
    async fn save(&self, user: &UserRecord) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<UserRecord>, RepositoryError>;
}
