//! Novella - 网络小说阅读页服务
//!
//! - Domain: novel/ + 正文格式化
//! - Application: queries, ports
//! - Infrastructure: http, memory, persistence

use std::sync::Arc;

use novella::application::{ChapterRepositoryPort, NovelRepositoryPort, UserRepositoryPort};
use novella::config::{load_config, print_config, AppConfig, LogConfig, StorageBackend};
use novella::infrastructure::http::{AppState, HttpServer, ListenConfig};
use novella::infrastructure::memory::InMemoryDocumentStore;
use novella::infrastructure::persistence::import_seed;
use novella::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteChapterRepository, SqliteNovelRepository,
    SqliteUserRepository,
};

/// 三个仓储端口的具体实现
struct Repositories {
    novels: Arc<dyn NovelRepositoryPort>,
    chapters: Arc<dyn ChapterRepositoryPort>,
    users: Arc<dyn UserRepositoryPort>,
}

fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},novella={},tower_http=debug", log.level, log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn open_repositories(config: &AppConfig) -> anyhow::Result<Repositories> {
    match config.database.backend {
        StorageBackend::Sqlite => {
            // 确保数据目录存在
            if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            let db_config = DatabaseConfig {
                database_url: config.database.database_url(),
                max_connections: config.database.max_connections,
            };
            let pool = create_pool(&db_config).await?;
            run_migrations(&pool).await?;

            Ok(Repositories {
                novels: Arc::new(SqliteNovelRepository::new(pool.clone())),
                chapters: Arc::new(SqliteChapterRepository::new(pool.clone())),
                users: Arc::new(SqliteUserRepository::new(pool)),
            })
        }
        StorageBackend::Memory => {
            let store = InMemoryDocumentStore::new().arc();
            Ok(Repositories {
                novels: store.clone(),
                chapters: store.clone(),
                users: store,
            })
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    tracing::info!("Novella - 网络小说阅读页服务");
    print_config(&config);

    let repos = open_repositories(&config).await?;

    if let Some(seed_path) = &config.database.seed_path {
        import_seed(
            seed_path,
            &*repos.novels,
            &*repos.chapters,
            &*repos.users,
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to import seed data: {}", e))?;
    }

    // 创建 HTTP 服务器
    let state = AppState::new(repos.novels, repos.chapters, repos.users);
    let server = HttpServer::new(ListenConfig::from(&config.server), state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Received shutdown signal"),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for ctrl-c");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
