//! Chapter Query Handlers - 章节解析
//!
//! 给定 (小说标识, 章节标识)，确定要展示的章节以及前后章节。
//! 小说的章节可能内嵌、可能是引用列表、也可能只能按章节号查询，
//! 存储方式由 [`ChapterStorage`] 在加载小说时确定一次。
//!
//! 解析顺序（先命中者为准）:
//! 1. 按章节标识直接查章节库（占位标识跳过）
//! 2. 按 (小说, 章节号) 查章节库，章节号取自占位标识后缀，默认 1
//! 3. 在内嵌章节中按标识匹配
//! 4. 按 (小说, 1) 查章节库
//! 5. 合成占位章节
//!
//! 只有小说本身找不到时才返回错误，其余步骤的存储错误都降级为未命中。

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::lookup::{author_name, find_any, load_novel, soften};
use crate::application::error::ApplicationError;
use crate::application::ports::{ChapterRepositoryPort, NovelRepositoryPort, UserRepositoryPort};
use crate::application::queries::GetChapter;
use crate::domain::format_chapter;
use crate::domain::novel::{
    Adjacent, Chapter, ChapterImage, ChapterKey, ChapterNumber, ChapterStorage, DocumentId, Novel,
};
use crate::domain::FormattedContent;

// ============================================================================
// Response DTOs
// ============================================================================

/// 命中章节的步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedBy {
    DirectId,
    ChapterNumber,
    Embedded,
    FirstChapter,
    Placeholder,
}

impl ResolvedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolvedBy::DirectId => "direct_id",
            ResolvedBy::ChapterNumber => "chapter_number",
            ResolvedBy::Embedded => "embedded",
            ResolvedBy::FirstChapter => "first_chapter",
            ResolvedBy::Placeholder => "placeholder",
        }
    }
}

/// 前后章节链接
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRef {
    pub id: String,
    pub title: String,
    pub chapter_number: u32,
}

impl From<&Chapter> for ChapterRef {
    fn from(chapter: &Chapter) -> Self {
        Self {
            id: chapter.id().canonical(),
            title: chapter.display_title(),
            chapter_number: chapter.number().get(),
        }
    }
}

/// 待渲染的章节
#[derive(Debug, Clone)]
pub struct ChapterDisplay {
    pub id: String,
    pub title: String,
    pub chapter_number: u32,
    pub formatted_content: FormattedContent,
    pub images: Vec<ChapterImage>,
    pub created_at: Option<DateTime<Utc>>,
    pub synthesized: bool,
}

impl From<&Chapter> for ChapterDisplay {
    fn from(chapter: &Chapter) -> Self {
        Self {
            id: chapter.id().canonical(),
            title: chapter.display_title(),
            chapter_number: chapter.number().get(),
            formatted_content: format_chapter(chapter.display_content(), chapter.images()),
            images: chapter.images().to_vec(),
            created_at: chapter.created_at(),
            synthesized: chapter.is_synthetic(),
        }
    }
}

/// 导航信息
#[derive(Debug, Clone)]
pub struct ChapterNavigation {
    pub novel_id: String,
    pub novel_title: String,
    pub author_name: String,
    pub previous: Option<ChapterRef>,
    pub next: Option<ChapterRef>,
}

/// 阅读页响应
#[derive(Debug, Clone)]
pub struct ChapterView {
    pub chapter: ChapterDisplay,
    pub navigation: ChapterNavigation,
    pub resolved_by: ResolvedBy,
}

// ============================================================================
// Handler
// ============================================================================

/// GetChapter Handler
pub struct GetChapterHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    user_repo: Arc<dyn UserRepositoryPort>,
}

impl GetChapterHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        user_repo: Arc<dyn UserRepositoryPort>,
    ) -> Self {
        Self {
            novel_repo,
            chapter_repo,
            user_repo,
        }
    }

    pub async fn handle(&self, query: GetChapter) -> Result<ChapterView, ApplicationError> {
        let novel = load_novel(&*self.novel_repo, &query.novel_id).await?;
        let key = ChapterKey::parse(&query.chapter_id);

        let (chapter, resolved_by) = self.resolve_chapter(&novel, &key, &query.chapter_id).await;

        let adjacent = if chapter.is_synthetic() {
            Adjacent::none()
        } else {
            self.resolve_neighbors(&novel, &chapter).await
        };

        let author_name = author_name(&*self.user_repo, &novel).await;

        tracing::debug!(
            novel_id = %novel.id(),
            chapter_id = %query.chapter_id,
            storage = novel.storage().as_str(),
            resolved_by = resolved_by.as_str(),
            "Chapter resolved"
        );

        Ok(ChapterView {
            chapter: ChapterDisplay::from(&chapter),
            navigation: ChapterNavigation {
                novel_id: novel.id().canonical(),
                novel_title: novel.title().to_string(),
                author_name,
                previous: adjacent.previous.as_ref().map(ChapterRef::from),
                next: adjacent.next.as_ref().map(ChapterRef::from),
            },
            resolved_by,
        })
    }

    /// 依次尝试各个步骤，最后合成占位章节，因此总能得到一个章节
    async fn resolve_chapter(
        &self,
        novel: &Novel,
        key: &ChapterKey,
        raw_chapter_id: &str,
    ) -> (Chapter, ResolvedBy) {
        if let ChapterKey::Stored(raw) = key {
            if let Some(chapter) = soften("direct_id", self.by_direct_id(novel, raw).await) {
                return (chapter, ResolvedBy::DirectId);
            }
        }

        let number = match key {
            ChapterKey::Placeholder(number) => *number,
            ChapterKey::Stored(_) => ChapterNumber::FIRST,
        };
        if let Some(chapter) = soften("chapter_number", self.by_number(novel, number).await) {
            return (chapter, ResolvedBy::ChapterNumber);
        }

        if let Some(chapter) = novel.find_embedded(raw_chapter_id) {
            return (chapter.clone(), ResolvedBy::Embedded);
        }

        if number != ChapterNumber::FIRST {
            let first = soften("first_chapter", self.by_number(novel, ChapterNumber::FIRST).await);
            if let Some(chapter) = first {
                return (chapter, ResolvedBy::FirstChapter);
            }
        }

        tracing::info!(
            novel_id = %novel.id(),
            chapter_id = %raw_chapter_id,
            "No chapter data found, synthesizing placeholder"
        );
        (Chapter::placeholder(novel.title()), ResolvedBy::Placeholder)
    }

    /// 步骤 1：按标识直接查找，且必须属于当前小说
    async fn by_direct_id(
        &self,
        novel: &Novel,
        raw: &str,
    ) -> Result<Option<Chapter>, crate::application::ports::RepositoryError> {
        let repo = &*self.chapter_repo;
        let record = find_any(raw, |id| async move { repo.find_by_id(&id).await }).await?;

        Ok(record.map(Chapter::from).filter(|chapter| {
            let owned = chapter.belongs_to(novel.id());
            if !owned {
                tracing::warn!(
                    novel_id = %novel.id(),
                    chapter_id = %raw,
                    "Chapter belongs to another novel, ignoring"
                );
            }
            owned
        }))
    }

    /// 按 (小说, 章节号) 查找
    async fn by_number(
        &self,
        novel: &Novel,
        number: ChapterNumber,
    ) -> Result<Option<Chapter>, crate::application::ports::RepositoryError> {
        let record = self
            .chapter_repo
            .find_by_number(&novel.id().canonical(), number.get())
            .await?;
        Ok(record.map(Chapter::from))
    }

    /// 按标识查找相邻章节，两种编码都尝试
    async fn neighbor_by_id(&self, id: Option<DocumentId>) -> Option<Chapter> {
        let id = id?;
        let repo = &*self.chapter_repo;
        let found = find_any(&id.canonical(), |candidate| async move {
            repo.find_by_id(&candidate).await
        })
        .await;
        soften("neighbor", found).map(Chapter::from)
    }

    async fn neighbor_by_number(&self, novel: &Novel, number: Option<ChapterNumber>) -> Option<Chapter> {
        let number = number?;
        soften("neighbor", self.by_number(novel, number).await)
    }

    /// 按小说的存储方式确定前后章节；单侧查找失败只影响该侧
    async fn resolve_neighbors(&self, novel: &Novel, current: &Chapter) -> Adjacent<Chapter> {
        match novel.storage() {
            ChapterStorage::Referenced(_) => {
                let ids = novel.referenced_neighbors(current);
                let (previous, next) = tokio::join!(
                    self.neighbor_by_id(ids.previous),
                    self.neighbor_by_id(ids.next)
                );
                Adjacent { previous, next }
            }
            ChapterStorage::Embedded(_) => novel.embedded_neighbors(current),
            ChapterStorage::NumberedLookup => {
                let numbers = Novel::numbered_neighbors(current.number());
                let (previous, next) = tokio::join!(
                    self.neighbor_by_number(novel, numbers.previous),
                    self.neighbor_by_number(novel, numbers.next)
                );
                Adjacent { previous, next }
            }
        }
    }
}
