//! HTTP Server
//!
//! 阅读接口的监听、跨域与优雅关闭

use std::sync::Arc;
use std::time::Duration;

use axum::middleware;
use axum::Router;
use http::header::CONTENT_TYPE;
use http::Method;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::middleware::error_logging_middleware;
use super::routes::create_routes;
use super::state::AppState;
use crate::config::ServerConfig;

/// 预检结果的缓存时间
const CORS_MAX_AGE: Duration = Duration::from_secs(3600);

/// 监听地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
}

impl ListenConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&ServerConfig> for ListenConfig {
    fn from(config: &ServerConfig) -> Self {
        Self::new(config.host.clone(), config.port)
    }
}

/// HTTP 服务器
pub struct HttpServer {
    listen: ListenConfig,
    state: Arc<AppState>,
}

impl HttpServer {
    pub fn new(listen: ListenConfig, state: AppState) -> Self {
        Self {
            listen,
            state: Arc::new(state),
        }
    }

    /// 完整的 Router（路由 + 中间件 + 状态）
    pub fn router(&self) -> Router {
        // 接口全部只读，跨域只放开 GET/POST
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([CONTENT_TYPE])
            .max_age(CORS_MAX_AGE);

        // 请求体只有小的 JSON 查询，没有上传，沿用 axum 默认的请求体上限
        create_routes()
            .layer(middleware::from_fn(error_logging_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// 启动服务器，shutdown_signal 完成后停止接收新连接
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        let addr = self.listen.addr();

        let listener = TcpListener::bind(&addr).await?;
        info!(addr = %addr, "Reader API listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryDocumentStore;
    use axum::body::Body;
    use http::{header, Request, StatusCode};
    use tower::util::ServiceExt;

    fn server() -> HttpServer {
        let store = Arc::new(InMemoryDocumentStore::new());
        let state = AppState::new(store.clone(), store.clone(), store);
        HttpServer::new(ListenConfig::new("127.0.0.1", 0), state)
    }

    #[test]
    fn test_listen_config_from_settings() {
        let settings = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8088,
            ..ServerConfig::default()
        };
        let listen = ListenConfig::from(&settings);
        assert_eq!(listen.addr(), "127.0.0.1:8088");
    }

    #[tokio::test]
    async fn test_preflight_allows_post_only_reads() {
        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/chapter/get")
                    .header(header::ORIGIN, "https://reader.example")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
        assert!(methods.contains("GET"));
        assert!(methods.contains("POST"));
        assert!(!methods.contains("DELETE"));
        assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "3600");
    }

    #[tokio::test]
    async fn test_router_serves_ping_with_cors() {
        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/ping")
                    .header(header::ORIGIN, "https://reader.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
