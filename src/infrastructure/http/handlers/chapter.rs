//! Chapter HTTP Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::application::GetChapter;
use crate::infrastructure::http::dto::{ApiResponse, ChapterViewResponse, GetChapterRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 阅读页：解析章节及前后章节
pub async fn get_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetChapterRequest>,
) -> Result<Json<ApiResponse<ChapterViewResponse>>, ApiError> {
    read_chapter(&state, req.novel_id, req.chapter_id).await
}

/// 同 [`get_chapter`]，标识取自路径
pub async fn get_chapter_by_path(
    State(state): State<Arc<AppState>>,
    Path((novel_id, chapter_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<ChapterViewResponse>>, ApiError> {
    read_chapter(&state, novel_id, chapter_id).await
}

async fn read_chapter(
    state: &AppState,
    novel_id: String,
    chapter_id: String,
) -> Result<Json<ApiResponse<ChapterViewResponse>>, ApiError> {
    let query = GetChapter {
        novel_id,
        chapter_id,
    };

    let view = state.get_chapter_handler.handle(query).await?;

    Ok(Json(ApiResponse::success(view.into())))
}
