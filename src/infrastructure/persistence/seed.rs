//! Seed Import - 从 JSON 文件导入初始文档
//!
//! 文件形如 `{"novels": [...], "chapters": [...], "users": [...]}`，
//! 每个数组都可省略；文档形状与仓储记录一致。

use serde::Deserialize;
use std::path::Path;

use crate::application::ports::{
    ChapterRecord, ChapterRepositoryPort, NovelRecord, NovelRepositoryPort, RepositoryError,
    UserRecord, UserRepositoryPort,
};

#[derive(Debug, Default, Deserialize)]
struct SeedFile {
    #[serde(default)]
    novels: Vec<NovelRecord>,
    #[serde(default)]
    chapters: Vec<ChapterRecord>,
    #[serde(default)]
    users: Vec<UserRecord>,
}

/// 导入结果统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub novels: usize,
    pub chapters: usize,
    pub users: usize,
}

/// 导入种子文件，已存在的文档会被覆盖
pub async fn import_seed(
    path: impl AsRef<Path>,
    novel_repo: &dyn NovelRepositoryPort,
    chapter_repo: &dyn ChapterRepositoryPort,
    user_repo: &dyn UserRepositoryPort,
) -> Result<SeedSummary, RepositoryError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| RepositoryError::IoError(format!("{}: {}", path.display(), e)))?;
    let seed: SeedFile = serde_json::from_str(&raw)
        .map_err(|e| RepositoryError::SerializationError(format!("{}: {}", path.display(), e)))?;

    for user in &seed.users {
        user_repo.save(user).await?;
    }
    for chapter in &seed.chapters {
        chapter_repo.save(chapter).await?;
    }
    for novel in &seed.novels {
        novel_repo.save(novel).await?;
    }

    let summary = SeedSummary {
        novels: seed.novels.len(),
        chapters: seed.chapters.len(),
        users: seed.users.len(),
    };

    tracing::info!(
        path = %path.display(),
        novels = summary.novels,
        chapters = summary.chapters,
        users = summary.users,
        "Seed data imported"
    );

    Ok(summary)
}
