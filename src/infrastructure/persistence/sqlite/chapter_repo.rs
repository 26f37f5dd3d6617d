//! SQLite Chapter Repository

use async_trait::async_trait;
use sqlx::FromRow;

use super::database::{db_error, decode_id, decode_optional_id, decode_timestamp, json_error};
use super::DbPool;
use crate::application::ports::{ChapterRecord, ChapterRepositoryPort, RepositoryError};
use crate::domain::novel::{ChapterImage, DocumentId};

/// SQLite Chapter Repository
pub struct SqliteChapterRepository {
    pool: DbPool,
}

impl SqliteChapterRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ChapterRow {
    id: String,
    id_kind: String,
    novel_id: Option<String>,
    novel_kind: Option<String>,
    chapter_number: i64,
    title: String,
    content: String,
    images_json: String,
    created_at: Option<String>,
}

impl TryFrom<ChapterRow> for ChapterRecord {
    type Error = RepositoryError;

    fn try_from(row: ChapterRow) -> Result<Self, Self::Error> {
        let images: Vec<ChapterImage> = serde_json::from_str(&row.images_json).map_err(json_error)?;

        Ok(ChapterRecord {
            id: decode_id(&row.id, &row.id_kind)?,
            novel_id: decode_optional_id(row.novel_id, row.novel_kind)?,
            chapter_number: row.chapter_number,
            title: row.title,
            content: row.content,
            images,
            created_at: row.created_at.as_deref().map(decode_timestamp).transpose()?,
        })
    }
}

const SELECT_CHAPTER: &str = "SELECT id, id_kind, novel_id, novel_kind, chapter_number, title, content, images_json, created_at FROM chapters";

#[async_trait]
impl ChapterRepositoryPort for SqliteChapterRepository {
    async fn save(&self, chapter: &ChapterRecord) -> Result<(), RepositoryError> {
        let images_json = serde_json::to_string(&chapter.images).map_err(json_error)?;

        sqlx::query(
            r#"
            INSERT INTO chapters (id, id_kind, novel_id, novel_kind, chapter_number,
                                  title, content, images_json, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id, id_kind) DO UPDATE SET
                novel_id = excluded.novel_id,
                novel_kind = excluded.novel_kind,
                chapter_number = excluded.chapter_number,
                title = excluded.title,
                content = excluded.content,
                images_json = excluded.images_json,
                created_at = excluded.created_at
            "#,
        )
        .bind(chapter.id.canonical())
        .bind(chapter.id.kind().as_str())
        .bind(chapter.novel_id.as_ref().map(DocumentId::canonical))
        .bind(chapter.novel_id.as_ref().map(|n| n.kind().as_str()))
        .bind(chapter.chapter_number)
        .bind(&chapter.title)
        .bind(&chapter.content)
        .bind(images_json)
        .bind(chapter.created_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<ChapterRecord>, RepositoryError> {
        let row: Option<ChapterRow> =
            sqlx::query_as(&format!("{} WHERE id = ? AND id_kind = ?", SELECT_CHAPTER))
                .bind(id.canonical())
                .bind(id.kind().as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;

        row.map(ChapterRecord::try_from).transpose()
    }

    async fn find_by_number(
        &self,
        novel_ref: &str,
        number: u32,
    ) -> Result<Option<ChapterRecord>, RepositoryError> {
        // 同号多条时取标识最小的，保证结果稳定
        let row: Option<ChapterRow> = sqlx::query_as(&format!(
            "{} WHERE novel_id = ? AND chapter_number = ? ORDER BY id LIMIT 1",
            SELECT_CHAPTER
        ))
        .bind(novel_ref)
        .bind(i64::from(number))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(ChapterRecord::try_from).transpose()
    }

    async fn find_by_novel(&self, novel_ref: &str) -> Result<Vec<ChapterRecord>, RepositoryError> {
        let rows: Vec<ChapterRow> = sqlx::query_as(&format!(
            "{} WHERE novel_id = ? ORDER BY chapter_number, id",
            SELECT_CHAPTER
        ))
        .bind(novel_ref)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(ChapterRecord::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    const HEX: &str = "65a1f0c2b3d4e5f601234567";

    async fn repo() -> SqliteChapterRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteChapterRepository::new(pool)
    }

    fn chapter(id: &str, novel: DocumentId, n: i64) -> ChapterRecord {
        ChapterRecord {
            id: DocumentId::Text(id.to_string()),
            novel_id: Some(novel),
            chapter_number: n,
            title: format!("第{}章", n),
            content: "正文".to_string(),
            images: vec![ChapterImage::new("a.png").with_caption("插图")],
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_save_and_find_by_id() {
        let repo = repo().await;
        let record = chapter("c1", DocumentId::Text("n1".to_string()), 1);
        repo.save(&record).await.unwrap();

        let found = repo
            .find_by_id(&DocumentId::Text("c1".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, record);
    }

    #[tokio::test]
    async fn test_find_by_number_uses_canonical_owner() {
        let repo = repo().await;
        let owner = DocumentId::Object(HEX.parse().unwrap());
        repo.save(&chapter("c2", owner.clone(), 2)).await.unwrap();
        repo.save(&chapter("c1", owner, 1)).await.unwrap();
        repo.save(&chapter("x1", DocumentId::Text("other".to_string()), 1))
            .await
            .unwrap();

        let first = repo.find_by_number(HEX, 1).await.unwrap().unwrap();
        assert_eq!(first.id, DocumentId::Text("c1".to_string()));
        assert!(repo.find_by_number(HEX, 5).await.unwrap().is_none());

        let all = repo.find_by_novel(HEX).await.unwrap();
        let numbers: Vec<i64> = all.iter().map(|c| c.chapter_number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }
}
