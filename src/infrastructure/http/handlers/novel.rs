//! Novel HTTP Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{GetNovel, ListNovels};
use crate::infrastructure::http::dto::{
    ApiResponse, GetNovelRequest, NovelDetailResponse, NovelSummaryResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 获取小说列表
pub async fn list_novels(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<NovelSummaryResponse>>>, ApiError> {
    let result = state.list_novels_handler.handle(ListNovels).await?;

    let responses: Vec<NovelSummaryResponse> =
        result.into_iter().map(NovelSummaryResponse::from).collect();

    Ok(Json(ApiResponse::success(responses)))
}

/// 获取小说详情及章节目录
pub async fn get_novel(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetNovelRequest>,
) -> Result<Json<ApiResponse<NovelDetailResponse>>, ApiError> {
    let query = GetNovel { novel_id: req.id };

    let result = state.get_novel_handler.handle(query).await?;

    Ok(Json(ApiResponse::success(result.into())))
}
