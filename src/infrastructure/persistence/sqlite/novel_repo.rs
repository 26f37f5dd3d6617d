//! SQLite Novel Repository

use async_trait::async_trait;
use sqlx::FromRow;

use super::database::{db_error, decode_id, decode_optional_id, decode_timestamp, json_error};
use super::DbPool;
use crate::application::ports::{ChapterRecord, NovelRecord, NovelRepositoryPort, RepositoryError};
use crate::domain::novel::DocumentId;

/// SQLite Novel Repository
///
/// 内嵌章节和引用列表原样存成 JSON 列；字段缺失和空数组是两种不同的状态。
pub struct SqliteNovelRepository {
    pool: DbPool,
}

impl SqliteNovelRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct NovelRow {
    id: String,
    id_kind: String,
    title: String,
    description: Option<String>,
    author_id: Option<String>,
    author_kind: Option<String>,
    chapters_json: Option<String>,
    chapter_ids_json: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<NovelRow> for NovelRecord {
    type Error = RepositoryError;

    fn try_from(row: NovelRow) -> Result<Self, Self::Error> {
        let chapters = row
            .chapters_json
            .map(|json| serde_json::from_str::<Vec<ChapterRecord>>(&json))
            .transpose()
            .map_err(json_error)?;
        let chapter_ids = row
            .chapter_ids_json
            .map(|json| serde_json::from_str::<Vec<DocumentId>>(&json))
            .transpose()
            .map_err(json_error)?;

        Ok(NovelRecord {
            id: decode_id(&row.id, &row.id_kind)?,
            title: row.title,
            description: row.description,
            author_id: decode_optional_id(row.author_id, row.author_kind)?,
            chapters,
            chapter_ids,
            created_at: decode_timestamp(&row.created_at)?,
            updated_at: decode_timestamp(&row.updated_at)?,
        })
    }
}

const SELECT_NOVEL: &str = "SELECT id, id_kind, title, description, author_id, author_kind, chapters_json, chapter_ids_json, created_at, updated_at FROM novels";

#[async_trait]
impl NovelRepositoryPort for SqliteNovelRepository {
    async fn save(&self, novel: &NovelRecord) -> Result<(), RepositoryError> {
        let chapters_json = novel
            .chapters
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(json_error)?;
        let chapter_ids_json = novel
            .chapter_ids
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(json_error)?;

        sqlx::query(
            r#"
            INSERT INTO novels (id, id_kind, title, description, author_id, author_kind,
                                chapters_json, chapter_ids_json, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id, id_kind) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                author_id = excluded.author_id,
                author_kind = excluded.author_kind,
                chapters_json = excluded.chapters_json,
                chapter_ids_json = excluded.chapter_ids_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(novel.id.canonical())
        .bind(novel.id.kind().as_str())
        .bind(&novel.title)
        .bind(&novel.description)
        .bind(novel.author_id.as_ref().map(DocumentId::canonical))
        .bind(novel.author_id.as_ref().map(|a| a.kind().as_str()))
        .bind(chapters_json)
        .bind(chapter_ids_json)
        .bind(novel.created_at.to_rfc3339())
        .bind(novel.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<NovelRecord>, RepositoryError> {
        let row: Option<NovelRow> =
            sqlx::query_as(&format!("{} WHERE id = ? AND id_kind = ?", SELECT_NOVEL))
                .bind(id.canonical())
                .bind(id.kind().as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;

        row.map(NovelRecord::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<NovelRecord>, RepositoryError> {
        let rows: Vec<NovelRow> =
            sqlx::query_as(&format!("{} ORDER BY created_at DESC", SELECT_NOVEL))
                .fetch_all(&self.pool)
                .await
                .map_err(db_error)?;

        rows.into_iter().map(NovelRecord::try_from).collect()
    }
}
