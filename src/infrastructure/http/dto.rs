//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::{
    ChapterDisplay, ChapterNavigation, ChapterRef, ChapterView, NovelDetail, NovelSummary,
};
use crate::domain::{ContentBlock, EmbeddedImage, GalleryImage};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Novel DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GetNovelRequest {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct NovelSummaryResponse {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_count: Option<usize>,
    pub created_at: String,
}

impl From<NovelSummary> for NovelSummaryResponse {
    fn from(n: NovelSummary) -> Self {
        Self {
            id: n.id,
            title: n.title,
            chapter_count: n.chapter_count,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NovelDetailResponse {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub author_name: String,
    pub chapter_storage: &'static str,
    pub chapters: Vec<ChapterRefResponse>,
}

impl From<NovelDetail> for NovelDetailResponse {
    fn from(d: NovelDetail) -> Self {
        Self {
            id: d.id,
            title: d.title,
            description: d.description,
            author_name: d.author_name,
            chapter_storage: d.chapter_storage,
            chapters: d.chapters.into_iter().map(ChapterRefResponse::from).collect(),
        }
    }
}

// ============================================================================
// Chapter DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GetChapterRequest {
    pub novel_id: String,
    pub chapter_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChapterRefResponse {
    pub id: String,
    pub title: String,
    pub chapter_number: u32,
}

impl From<ChapterRef> for ChapterRefResponse {
    fn from(c: ChapterRef) -> Self {
        Self {
            id: c.id,
            title: c.title,
            chapter_number: c.chapter_number,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChapterContentResponse {
    pub id: String,
    pub title: String,
    pub chapter_number: u32,
    /// 正文块，供客户端自行渲染
    pub blocks: Vec<ContentBlock>,
    /// 正文内图片，按标记序号
    pub images: Vec<EmbeddedImage>,
    /// 正文之后的配图画廊
    pub gallery: Vec<GalleryImage>,
    pub html: String,
    pub gallery_html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub synthesized: bool,
}

impl From<ChapterDisplay> for ChapterContentResponse {
    fn from(c: ChapterDisplay) -> Self {
        let html = c.formatted_content.to_html();
        let gallery_html = c.formatted_content.gallery_html();
        let content = c.formatted_content;

        Self {
            id: c.id,
            title: c.title,
            chapter_number: c.chapter_number,
            blocks: content.blocks,
            images: content.images,
            gallery: content.gallery,
            html,
            gallery_html,
            created_at: c.created_at.map(|t| t.to_rfc3339()),
            synthesized: c.synthesized,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    pub novel_id: String,
    pub novel_title: String,
    pub author_name: String,
    pub previous: Option<ChapterRefResponse>,
    pub next: Option<ChapterRefResponse>,
}

impl From<ChapterNavigation> for NavigationResponse {
    fn from(n: ChapterNavigation) -> Self {
        Self {
            novel_id: n.novel_id,
            novel_title: n.novel_title,
            author_name: n.author_name,
            previous: n.previous.map(ChapterRefResponse::from),
            next: n.next.map(ChapterRefResponse::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChapterViewResponse {
    pub chapter: ChapterContentResponse,
    pub navigation: NavigationResponse,
    pub resolved_by: &'static str,
}

impl From<ChapterView> for ChapterViewResponse {
    fn from(v: ChapterView) -> Self {
        Self {
            chapter: v.chapter.into(),
            navigation: v.navigation.into(),
            resolved_by: v.resolved_by.as_str(),
        }
    }
}
