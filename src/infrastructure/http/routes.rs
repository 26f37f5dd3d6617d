//! HTTP Routes
//!
//! API 路由定义
//!
//! API Endpoints:
//! - /api/ping                                      GET   健康检查
//! - /api/novel/list                                GET   列出所有小说
//! - /api/novel/get                                 POST  获取小说详情及章节目录
//! - /api/chapter/get                               POST  阅读页（章节 + 前后章节）
//! - /api/novels/:novel_id/chapters/:chapter_id     GET   同上，标识取自路径

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/novel", novel_routes())
        .nest("/chapter", chapter_routes())
        .route(
            "/novels/:novel_id/chapters/:chapter_id",
            get(handlers::get_chapter_by_path),
        )
}

/// Novel 路由
fn novel_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/get", post(handlers::get_novel))
        .route("/list", get(handlers::list_novels))
}

/// Chapter 路由
fn chapter_routes() -> Router<Arc<AppState>> {
    Router::new().route("/get", post(handlers::get_chapter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        ChapterRecord, ChapterRepositoryPort, NovelRecord, NovelRepositoryPort,
    };
    use crate::domain::novel::DocumentId;
    use crate::infrastructure::memory::InMemoryDocumentStore;
    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::util::ServiceExt;

    async fn test_router() -> Router {
        let store = Arc::new(InMemoryDocumentStore::new());

        let mut novel = NovelRecord::new(DocumentId::Text("n1".to_string()), "测试小说");
        novel.chapter_ids = Some(vec![
            DocumentId::Text("c1".to_string()),
            DocumentId::Text("c2".to_string()),
        ]);
        NovelRepositoryPort::save(&*store, &novel).await.unwrap();

        for (id, n) in [("c1", 1), ("c2", 2)] {
            let chapter = ChapterRecord {
                id: DocumentId::Text(id.to_string()),
                novel_id: Some(DocumentId::Text("n1".to_string())),
                chapter_number: n,
                title: format!("第{}章", n),
                content: "第一段\n\n![图](a.png)\n\n第二段".to_string(),
                images: Vec::new(),
                created_at: None,
            };
            ChapterRepositoryPort::save(&*store, &chapter).await.unwrap();
        }

        let state = AppState::new(store.clone(), store.clone(), store);
        create_routes().with_state(Arc::new(state))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_ping() {
        let app = test_router().await;
        let response = app
            .oneshot(Request::builder().uri("/api/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_get_chapter_with_navigation() {
        let app = test_router().await;
        let response = app
            .oneshot(post_json(
                "/api/chapter/get",
                serde_json::json!({"novel_id": "n1", "chapter_id": "c1"}),
            ))
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["errno"], 0);
        let data = &json["data"];
        assert_eq!(data["chapter"]["id"], "c1");
        assert_eq!(data["chapter"]["synthesized"], false);
        assert_eq!(data["navigation"]["previous"], Value::Null);
        assert_eq!(data["navigation"]["next"]["id"], "c2");
        assert_eq!(data["navigation"]["author_name"], "Unknown Author");
        assert_eq!(data["resolved_by"], "direct_id");

        let html = data["chapter"]["html"].as_str().unwrap();
        assert!(html.contains("<p>第一段</p>"));
        assert!(html.contains("data-chapter-image=\"0\""));
    }

    #[tokio::test]
    async fn test_get_chapter_by_path_placeholder() {
        let app = test_router().await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/novels/n1/chapters/dummy-chapter-2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["data"]["chapter"]["id"], "c2");
        assert_eq!(json["data"]["navigation"]["previous"]["id"], "c1");
        assert_eq!(json["data"]["resolved_by"], "chapter_number");
    }

    #[tokio::test]
    async fn test_missing_novel_envelope() {
        let app = test_router().await;
        let response = app
            .oneshot(post_json(
                "/api/chapter/get",
                serde_json::json!({"novel_id": "nope", "chapter_id": "c1"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["errno"], 404);
        assert_eq!(json["data"], Value::Null);
    }

    #[tokio::test]
    async fn test_novel_list_and_detail() {
        let app = test_router().await;
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/api/novel/list").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["data"][0]["chapter_count"], 2);

        let response = app
            .oneshot(post_json("/api/novel/get", serde_json::json!({"id": "n1"})))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["data"]["chapters"].as_array().unwrap().len(), 2);
        assert_eq!(json["data"]["chapter_storage"], "referenced");
    }
}
