//! Repository lookups that span both stores.

use crate::db::Store;
use crate::error::{AppError, AppResult};
use crate::models::{CommitSummary, RepositoryDetail};

/// Repository with all of its commits.
///
/// The repository record is the gate: a known repository without commits
/// yields an empty list, an unknown one fails even if commits were pushed for it.
pub async fn repository_detail<S: Store + ?Sized>(
    store: &S,
    full_name: &str,
) -> AppResult<RepositoryDetail> {
    let repository = store
        .find_repository(full_name)
        .await?
        .ok_or_else(|| AppError::RepositoryNotFound(full_name.to_string()))?;

    let commits = store
        .commits_for(full_name)
        .await?
        .into_iter()
        .map(CommitSummary::from)
        .collect();

    Ok(RepositoryDetail::new(repository, commits))
}
