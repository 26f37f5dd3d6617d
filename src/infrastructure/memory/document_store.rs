//! In-Memory Document Store Implementation
//!
//! 测试与演示用的文档存储，同时实现小说、章节、用户三个仓储端口。
//! 键为 `DocumentId`，因此同一个值的结构化形式和字符串形式是两条不同的文档。

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::{
    ChapterRecord, ChapterRepositoryPort, NovelRecord, NovelRepositoryPort, RepositoryError,
    UserRecord, UserRepositoryPort,
};
use crate::domain::novel::DocumentId;

/// 内存文档存储
pub struct InMemoryDocumentStore {
    novels: DashMap<DocumentId, NovelRecord>,
    chapters: DashMap<DocumentId, ChapterRecord>,
    users: DashMap<DocumentId, UserRecord>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            novels: DashMap::new(),
            chapters: DashMap::new(),
            users: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn owned_by(chapter: &ChapterRecord, novel_ref: &str) -> bool {
        chapter
            .novel_id
            .as_ref()
            .is_some_and(|id| id.canonical() == novel_ref)
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NovelRepositoryPort for InMemoryDocumentStore {
    async fn save(&self, novel: &NovelRecord) -> Result<(), RepositoryError> {
        self.novels.insert(novel.id.clone(), novel.clone());
        tracing::debug!(novel_id = %novel.id, "Novel stored in memory");
        Ok(())
    }

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<NovelRecord>, RepositoryError> {
        Ok(self.novels.get(id).map(|n| n.clone()))
    }

    async fn find_all(&self) -> Result<Vec<NovelRecord>, RepositoryError> {
        let mut novels: Vec<NovelRecord> = self.novels.iter().map(|e| e.value().clone()).collect();
        novels.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(novels)
    }
}

#[async_trait]
impl ChapterRepositoryPort for InMemoryDocumentStore {
    async fn save(&self, chapter: &ChapterRecord) -> Result<(), RepositoryError> {
        self.chapters.insert(chapter.id.clone(), chapter.clone());
        tracing::debug!(chapter_id = %chapter.id, "Chapter stored in memory");
        Ok(())
    }

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<ChapterRecord>, RepositoryError> {
        Ok(self.chapters.get(id).map(|c| c.clone()))
    }

    async fn find_by_number(
        &self,
        novel_ref: &str,
        number: u32,
    ) -> Result<Option<ChapterRecord>, RepositoryError> {
        // 同号多条时取归一化标识最小的，保证结果稳定
        Ok(self
            .chapters
            .iter()
            .filter(|e| e.chapter_number == i64::from(number) && Self::owned_by(e.value(), novel_ref))
            .map(|e| e.value().clone())
            .min_by_key(|c| c.id.canonical()))
    }

    async fn find_by_novel(&self, novel_ref: &str) -> Result<Vec<ChapterRecord>, RepositoryError> {
        let mut chapters: Vec<ChapterRecord> = self
            .chapters
            .iter()
            .filter(|e| Self::owned_by(e.value(), novel_ref))
            .map(|e| e.value().clone())
            .collect();
        chapters.sort_by(|a, b| {
            a.chapter_number
                .cmp(&b.chapter_number)
                .then_with(|| a.id.canonical().cmp(&b.id.canonical()))
        });
        Ok(chapters)
    }
}

#[async_trait]
impl UserRepositoryPort for InMemoryDocumentStore {
    async fn save(&self, user: &UserRecord) -> Result<(), RepositoryError> {
        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<UserRecord>, RepositoryError> {
        Ok(self.users.get(id).map(|u| u.clone()))
    }
}
