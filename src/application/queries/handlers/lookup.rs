//! 查询共用的读取步骤
//!
//! - 按标识的多种编码依次查找
//! - 可选步骤的错误降级为默认值并记录日志

use std::future::Future;

use crate::application::error::ApplicationError;
use crate::application::ports::{NovelRepositoryPort, RepositoryError, UserRepositoryPort};
use crate::domain::novel::{DocumentId, Novel};

/// 作者查找失败时的显示名
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// 依次尝试 raw 的每种编码
///
/// 某种编码出错不影响下一种；出现过一次干净的未命中就返回 `Ok(None)`。
/// 全部编码都出错说明存储本身不可用，此时把仓储错误原样返回，
/// 不当作"未找到"，调用方据此区分 404 与 500。
pub async fn find_any<T, F, Fut>(raw: &str, mut find: F) -> Result<Option<T>, RepositoryError>
where
    F: FnMut(DocumentId) -> Fut,
    Fut: Future<Output = Result<Option<T>, RepositoryError>>,
{
    let mut last_error = None;
    let mut clean_miss = false;

    for candidate in DocumentId::candidates(raw) {
        let kind = candidate.kind();
        match find(candidate).await {
            Ok(Some(found)) => return Ok(Some(found)),
            Ok(None) => clean_miss = true,
            Err(e) => {
                tracing::debug!(id = %raw, kind = kind.as_str(), error = %e, "Lookup failed under encoding");
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if !clean_miss => Err(e),
        _ => Ok(None),
    }
}

/// 可选步骤：错误记录后当作未命中
pub fn soften<T>(step: &'static str, result: Result<Option<T>, RepositoryError>) -> Option<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!(step = step, error = %e, "Optional lookup failed, using default");
        None
    })
}

/// 加载小说
///
/// 空白 id 不查库，直接视为找不到；查库未命中同样返回 NotFound。
/// 小说存储整体不可用时（每种编码都出错）返回 `RepositoryError`，不降级为 NotFound。
pub async fn load_novel(
    novel_repo: &dyn NovelRepositoryPort,
    raw_id: &str,
) -> Result<Novel, ApplicationError> {
    if raw_id.trim().is_empty() {
        return Err(ApplicationError::not_found("Novel", raw_id));
    }

    let record = find_any(raw_id, |id| async move { novel_repo.find_by_id(&id).await })
        .await?
        .ok_or_else(|| ApplicationError::not_found("Novel", raw_id))?;

    Ok(Novel::from(record))
}

/// 作者显示名，任何失败都回退为 "Unknown Author"
pub async fn author_name(user_repo: &dyn UserRepositoryPort, novel: &Novel) -> String {
    let Some(author_id) = novel.author_id() else {
        return UNKNOWN_AUTHOR.to_string();
    };

    let raw = author_id.canonical();
    let user = soften(
        "author",
        find_any(&raw, |id| async move { user_repo.find_by_id(&id).await }).await,
    );

    user.as_ref()
        .and_then(|u| u.display_name())
        .unwrap_or(UNKNOWN_AUTHOR)
        .to_string()
}
