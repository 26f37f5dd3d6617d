//! Novel Context - Aggregate Root

use chrono::{DateTime, Utc};

use super::{Chapter, ChapterNumber, DocumentId};

/// 章节存储方式
///
/// 每部小说在查询时只通过其中一种方式寻址章节。
#[derive(Debug, Clone, PartialEq)]
pub enum ChapterStorage {
    /// 章节内嵌在小说文档中
    Embedded(Vec<Chapter>),
    /// 小说文档只保存有序的章节标识列表
    Referenced(Vec<DocumentId>),
    /// 没有任何章节信息，只能按 (小说, 章节号) 到章节库查询
    NumberedLookup,
}

impl ChapterStorage {
    /// 由文档字段推导存储方式
    ///
    /// 两个字段同时存在时以 `chapter_ids` 为准。
    pub fn from_fields(chapters: Option<Vec<Chapter>>, chapter_ids: Option<Vec<DocumentId>>) -> Self {
        match (chapters, chapter_ids) {
            (_, Some(ids)) if !ids.is_empty() => ChapterStorage::Referenced(ids),
            (Some(chapters), _) if !chapters.is_empty() => ChapterStorage::Embedded(chapters),
            _ => ChapterStorage::NumberedLookup,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChapterStorage::Embedded(_) => "embedded",
            ChapterStorage::Referenced(_) => "referenced",
            ChapterStorage::NumberedLookup => "numbered",
        }
    }
}

/// 相邻章节位置
#[derive(Debug, Clone, PartialEq)]
pub struct Adjacent<T> {
    pub previous: Option<T>,
    pub next: Option<T>,
}

impl<T> Adjacent<T> {
    pub fn none() -> Self {
        Self {
            previous: None,
            next: None,
        }
    }
}

/// 取 index 两侧的元素
fn adjacent_in<T: Clone>(items: &[T], index: usize) -> Adjacent<T> {
    Adjacent {
        previous: index.checked_sub(1).and_then(|i| items.get(i)).cloned(),
        next: items.get(index + 1).cloned(),
    }
}

/// Novel 聚合根
///
/// 不变量:
/// - 章节存储方式在构造时确定一次
/// - 章节顺序由 chapter number 升序定义
#[derive(Debug, Clone)]
pub struct Novel {
    id: DocumentId,
    title: String,
    description: Option<String>,
    author_id: Option<DocumentId>,
    storage: ChapterStorage,
    created_at: DateTime<Utc>,
}

impl Novel {
    pub fn new(id: DocumentId, title: impl Into<String>, storage: ChapterStorage) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            author_id: None,
            storage,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_author(mut self, author_id: Option<DocumentId>) -> Self {
        self.author_id = author_id;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    // Getters
    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn author_id(&self) -> Option<&DocumentId> {
        self.author_id.as_ref()
    }

    pub fn storage(&self) -> &ChapterStorage {
        &self.storage
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 在内嵌章节中按归一化标识查找
    pub fn find_embedded(&self, raw_id: &str) -> Option<&Chapter> {
        match &self.storage {
            ChapterStorage::Embedded(chapters) => chapters.iter().find(|c| {
                c.id()
                    .as_document_id()
                    .map_or(false, |id| id.matches(raw_id))
            }),
            _ => None,
        }
    }

    /// 内嵌章节的相邻章节
    ///
    /// 优先按标识定位，找不到时按章节号定位。
    pub fn embedded_neighbors(&self, current: &Chapter) -> Adjacent<Chapter> {
        let ChapterStorage::Embedded(chapters) = &self.storage else {
            return Adjacent::none();
        };

        let current_id = current.id().canonical();
        chapters
            .iter()
            .position(|c| c.id().canonical() == current_id)
            .or_else(|| chapters.iter().position(|c| c.number() == current.number()))
            .map(|index| adjacent_in(chapters, index))
            .unwrap_or_else(Adjacent::none)
    }

    /// 引用列表中的相邻章节标识
    pub fn referenced_neighbors(&self, current: &Chapter) -> Adjacent<DocumentId> {
        let ChapterStorage::Referenced(ids) = &self.storage else {
            return Adjacent::none();
        };

        let current_id = current.id().canonical();
        ids.iter()
            .position(|id| id.canonical() == current_id)
            .map(|index| adjacent_in(ids, index))
            .unwrap_or_else(Adjacent::none)
    }

    /// 按章节号推算的相邻章节号
    pub fn numbered_neighbors(current: ChapterNumber) -> Adjacent<ChapterNumber> {
        Adjacent {
            previous: current.previous(),
            next: current.next(),
        }
    }
}
