//! Application State
//!
//! 包含所有 Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Query handlers
    GetChapterHandler, GetNovelHandler, ListNovelsHandler,
    // Ports
    ChapterRepositoryPort, NovelRepositoryPort, UserRepositoryPort,
};

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub novel_repo: Arc<dyn NovelRepositoryPort>,
    pub chapter_repo: Arc<dyn ChapterRepositoryPort>,
    pub user_repo: Arc<dyn UserRepositoryPort>,

    // ========== Query Handlers ==========
    pub get_chapter_handler: GetChapterHandler,
    pub get_novel_handler: GetNovelHandler,
    pub list_novels_handler: ListNovelsHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        user_repo: Arc<dyn UserRepositoryPort>,
    ) -> Self {
        Self {
            // Ports
            novel_repo: novel_repo.clone(),
            chapter_repo: chapter_repo.clone(),
            user_repo: user_repo.clone(),

            // Query handlers
            get_chapter_handler: GetChapterHandler::new(
                novel_repo.clone(),
                chapter_repo.clone(),
                user_repo.clone(),
            ),
            get_novel_handler: GetNovelHandler::new(
                novel_repo.clone(),
                chapter_repo.clone(),
                user_repo.clone(),
            ),
            list_novels_handler: ListNovelsHandler::new(novel_repo.clone()),
        }
    }
}
