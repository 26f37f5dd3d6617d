//! SQLite Database - 数据库连接和迁移

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::path::Path;

use crate::application::ports::RepositoryError;
use crate::domain::novel::{DocumentId, IdKind, NovelError};

/// 数据库配置
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    pub database_url: String,
    /// 最大连接数
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:./data/novella.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            database_url: format!("sqlite:{}?mode=rwc", path.as_ref().display()),
            max_connections: 5,
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }

    /// 内存库每个连接都是独立的库，只能开一个连接
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }
}

/// 数据库连接池
pub type DbPool = Pool<Sqlite>;

/// 创建数据库连接池
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    // 启用 WAL 模式，允许并发读写
    sqlx::query("PRAGMA journal_mode=WAL")
        .execute(&pool)
        .await?;

    // 遇到锁时等待而不是立即失败
    sqlx::query("PRAGMA busy_timeout=5000")
        .execute(&pool)
        .await?;

    tracing::info!(url = %config.database_url, "SQLite pool created");

    Ok(pool)
}

/// 运行数据库迁移
///
/// 标识按 (值, 编码) 存储：同一个十六进制值的结构化形式和字符串形式是两行。
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    // 创建 novels 表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS novels (
            id TEXT NOT NULL,
            id_kind TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            author_id TEXT,
            author_kind TEXT,
            chapters_json TEXT,
            chapter_ids_json TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (id, id_kind)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建 chapters 表；novel_id 存归一化字符串，便于按号查找
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chapters (
            id TEXT NOT NULL,
            id_kind TEXT NOT NULL,
            novel_id TEXT,
            novel_kind TEXT,
            chapter_number INTEGER NOT NULL DEFAULT 0,
            title TEXT NOT NULL DEFAULT '',
            content TEXT NOT NULL DEFAULT '',
            images_json TEXT NOT NULL DEFAULT '[]',
            created_at TEXT,
            PRIMARY KEY (id, id_kind)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建 users 表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT NOT NULL,
            id_kind TEXT NOT NULL,
            name TEXT,
            username TEXT,
            PRIMARY KEY (id, id_kind)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建索引
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_chapters_novel_number
        ON chapters(novel_id, chapter_number)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_novels_created_at
        ON novels(created_at)
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed");
    Ok(())
}

/// 由 (值, 编码) 两列还原标识
pub(super) fn decode_id(value: &str, kind: &str) -> Result<DocumentId, RepositoryError> {
    let kind: IdKind = kind
        .parse()
        .map_err(|e: NovelError| RepositoryError::SerializationError(e.to_string()))?;
    DocumentId::from_parts(kind, value)
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

/// 可空的 (值, 编码) 两列
pub(super) fn decode_optional_id(
    value: Option<String>,
    kind: Option<String>,
) -> Result<Option<DocumentId>, RepositoryError> {
    match (value, kind) {
        (Some(value), Some(kind)) => decode_id(&value, &kind).map(Some),
        _ => Ok(None),
    }
}

pub(super) fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

pub(super) fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}

pub(super) fn json_error(e: serde_json::Error) -> RepositoryError {
    RepositoryError::SerializationError(e.to_string())
}
