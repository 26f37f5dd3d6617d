//! Novel Query Handlers

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::chapter_handlers::ChapterRef;
use super::lookup::{author_name, find_any, load_novel, soften};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChapterRepositoryPort, NovelRecord, NovelRepositoryPort, UserRepositoryPort,
};
use crate::application::queries::{GetNovel, ListNovels};
use crate::domain::novel::{Chapter, ChapterStorage, Novel};

// ============================================================================
// Response DTOs
// ============================================================================

/// 小说详情响应
#[derive(Debug, Clone)]
pub struct NovelDetail {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub author_name: String,
    pub chapter_storage: &'static str,
    /// 按章节号升序
    pub chapters: Vec<ChapterRef>,
}

/// 小说列表项
#[derive(Debug, Clone)]
pub struct NovelSummary {
    pub id: String,
    pub title: String,
    /// 只能按章节号查询的小说没有现成的数量
    pub chapter_count: Option<usize>,
    pub created_at: DateTime<Utc>,
}

impl From<NovelRecord> for NovelSummary {
    fn from(record: NovelRecord) -> Self {
        let novel = Novel::from(record);
        let chapter_count = match novel.storage() {
            ChapterStorage::Embedded(chapters) => Some(chapters.len()),
            ChapterStorage::Referenced(ids) => Some(ids.len()),
            ChapterStorage::NumberedLookup => None,
        };

        Self {
            id: novel.id().canonical(),
            title: novel.title().to_string(),
            chapter_count,
            created_at: novel.created_at(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GetNovel Handler
pub struct GetNovelHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    user_repo: Arc<dyn UserRepositoryPort>,
}

impl GetNovelHandler {
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

    pub async fn handle(&self, query: GetNovel) -> Result<NovelDetail, ApplicationError> {
        let novel = load_novel(&*self.novel_repo, &query.novel_id).await?;

        let mut chapters = self.list_chapters(&novel).await;
        chapters.sort_by_key(|c| c.number());

        let author_name = author_name(&*self.user_repo, &novel).await;

        Ok(NovelDetail {
            id: novel.id().canonical(),
            title: novel.title().to_string(),
            description: novel.description().map(str::to_string),
            author_name,
            chapter_storage: novel.storage().as_str(),
            chapters: chapters.iter().map(ChapterRef::from).collect(),
        })
    }

    /// 章节目录；查找失败的章节直接略过
    async fn list_chapters(&self, novel: &Novel) -> Vec<Chapter> {
        match novel.storage() {
            ChapterStorage::Embedded(chapters) => chapters.clone(),
            ChapterStorage::Referenced(ids) => {
                let repo = &*self.chapter_repo;
                let mut chapters = Vec::with_capacity(ids.len());
                for id in ids {
                    let found = find_any(&id.canonical(), |candidate| async move {
                        repo.find_by_id(&candidate).await
                    })
                    .await;
                    if let Some(record) = soften("chapter_list", found) {
                        chapters.push(Chapter::from(record));
                    }
                }
                chapters
            }
            ChapterStorage::NumberedLookup => self
                .chapter_repo
                .find_by_novel(&novel.id().canonical())
                .await
                .map(|records| records.into_iter().map(Chapter::from).collect())
                .unwrap_or_else(|e| {
                    tracing::warn!(novel_id = %novel.id(), error = %e, "Failed to list chapters");
                    Vec::new()
                }),
        }
    }
}

/// ListNovels Handler
pub struct ListNovelsHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl ListNovelsHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(&self, _query: ListNovels) -> Result<Vec<NovelSummary>, ApplicationError> {
        let novels = self.novel_repo.find_all().await?;
        Ok(novels.into_iter().map(NovelSummary::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{ChapterRecord, UserRecord};
    use crate::domain::novel::DocumentId;
    use crate::infrastructure::memory::InMemoryDocumentStore;

    fn text_id(s: &str) -> DocumentId {
        DocumentId::Text(s.to_string())
    }

    fn chapter(id: &str, novel: Option<&str>, n: i64) -> ChapterRecord {
        ChapterRecord {
            id: text_id(id),
            novel_id: novel.map(text_id),
            chapter_number: n,
            title: String::new(),
            content: "正文".to_string(),
            images: Vec::new(),
            created_at: None,
        }
    }

    fn handler(store: &Arc<InMemoryDocumentStore>) -> GetNovelHandler {
        GetNovelHandler::new(store.clone(), store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_detail_sorted_by_chapter_number() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let mut novel = NovelRecord::new(text_id("n1"), "乱序");
        novel.chapters = Some(vec![chapter("c3", None, 3), chapter("c1", None, 1), chapter("c2", None, 2)]);
        NovelRepositoryPort::save(&*store, &novel).await.unwrap();

        let detail = handler(&store)
            .handle(GetNovel { novel_id: "n1".to_string() })
            .await
            .unwrap();

        let numbers: Vec<u32> = detail.chapters.iter().map(|c| c.chapter_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(detail.chapters[0].title, "Chapter 1");
        assert_eq!(detail.chapter_storage, "embedded");
        assert_eq!(detail.author_name, "Unknown Author");
    }

    #[tokio::test]
    async fn test_detail_referenced_skips_missing() {
        let store = Arc::new(InMemoryDocumentStore::new());
        ChapterRepositoryPort::save(&*store, &chapter("r1", Some("n2"), 1)).await.unwrap();
        let mut novel = NovelRecord::new(text_id("n2"), "引用");
        novel.chapter_ids = Some(vec![text_id("r1"), text_id("gone")]);
        novel.author_id = Some(text_id("u1"));
        NovelRepositoryPort::save(&*store, &novel).await.unwrap();
        UserRepositoryPort::save(
            &*store,
            &UserRecord {
                id: text_id("u1"),
                name: None,
                username: Some("scribe".to_string()),
            },
        )
        .await
        .unwrap();

        let detail = handler(&store)
            .handle(GetNovel { novel_id: "n2".to_string() })
            .await
            .unwrap();
        assert_eq!(detail.chapters.len(), 1);
        assert_eq!(detail.author_name, "scribe");
    }

    #[tokio::test]
    async fn test_detail_numbered_lookup() {
        let store = Arc::new(InMemoryDocumentStore::new());
        ChapterRepositoryPort::save(&*store, &chapter("b", Some("n3"), 2)).await.unwrap();
        ChapterRepositoryPort::save(&*store, &chapter("a", Some("n3"), 1)).await.unwrap();
        ChapterRepositoryPort::save(&*store, &chapter("z", Some("other"), 1)).await.unwrap();
        NovelRepositoryPort::save(&*store, &NovelRecord::new(text_id("n3"), "按号"))
            .await
            .unwrap();

        let detail = handler(&store)
            .handle(GetNovel { novel_id: "n3".to_string() })
            .await
            .unwrap();
        let ids: Vec<&str> = detail.chapters.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_detail_not_found() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let err = handler(&store)
            .handle(GetNovel { novel_id: "missing".to_string() })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_novels() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let mut novel = NovelRecord::new(text_id("n1"), "一");
        novel.chapter_ids = Some(vec![text_id("x"), text_id("y")]);
        NovelRepositoryPort::save(&*store, &novel).await.unwrap();
        NovelRepositoryPort::save(&*store, &NovelRecord::new(text_id("n2"), "二"))
            .await
            .unwrap();

        let list = ListNovelsHandler::new(store.clone())
            .handle(ListNovels)
            .await
            .unwrap();
        assert_eq!(list.len(), 2);
        let first = list.iter().find(|n| n.id == "n1").unwrap();
        assert_eq!(first.chapter_count, Some(2));
        let second = list.iter().find(|n| n.id == "n2").unwrap();
        assert_eq!(second.chapter_count, None);
    }
}
