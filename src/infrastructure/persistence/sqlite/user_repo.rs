//! SQLite User Repository

use async_trait::async_trait;
use sqlx::FromRow;

use super::database::{db_error, decode_id};
use super::DbPool;
use crate::application::ports::{RepositoryError, UserRecord, UserRepositoryPort};
use crate::domain::novel::DocumentId;

/// SQLite User Repository
pub struct SqliteUserRepository {
    pool: DbPool,
}

impl SqliteUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: String,
    id_kind: String,
    name: Option<String>,
    username: Option<String>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(UserRecord {
            id: decode_id(&row.id, &row.id_kind)?,
            name: row.name,
            username: row.username,
        })
    }
}

#[async_trait]
impl UserRepositoryPort for SqliteUserRepository {
    async fn save(&self, user: &UserRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, id_kind, name, username)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id, id_kind) DO UPDATE SET
                name = excluded.name,
                username = excluded.username
            "#,
        )
        .bind(user.id.canonical())
        .bind(user.id.kind().as_str())
        .bind(&user.name)
        .bind(&user.username)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<UserRecord>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, id_kind, name, username FROM users WHERE id = ? AND id_kind = ?",
        )
        .bind(id.canonical())
        .bind(id.kind().as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(UserRecord::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    #[tokio::test]
    async fn test_save_and_find_user() {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let repo = SqliteUserRepository::new(pool);

        let user = UserRecord {
            id: DocumentId::Text("u1".to_string()),
            name: None,
            username: Some("scribe".to_string()),
        };
        repo.save(&user).await.unwrap();

        let found = repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(found.display_name(), Some("scribe"));
        assert!(repo
            .find_by_id(&DocumentId::Text("u2".to_string()))
            .await
            .unwrap()
            .is_none());
    }
}
