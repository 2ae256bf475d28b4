//! Storage seams for repositories and commits.
//!
//! `DbPool` implements both traits; the ingestion workflow and handlers only
//! depend on the traits so a different store can be substituted.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Commit, NewCommit, Repository};

/// Accessor over repository subscription records.
#[async_trait]
pub trait RepositoryStore: Send + Sync {
    /// All repositories, in name order.
    async fn list_repositories(&self) -> AppResult<Vec<Repository>>;

    /// Repositories whose name starts with `prefix` (literal match).
    async fn repositories_with_prefix(&self, prefix: &str) -> AppResult<Vec<Repository>>;

    /// Repositories whose name ends with `suffix` (literal match).
    async fn repositories_with_suffix(&self, suffix: &str) -> AppResult<Vec<Repository>>;

    /// Insert or update the subscription flag for `full_name`.
    async fn upsert_repository(&self, full_name: &str, subscribed: bool)
    -> AppResult<Repository>;

    async fn find_repository(&self, full_name: &str) -> AppResult<Option<Repository>>;

    /// Prefix matches, or suffix matches when nothing starts with `query`.
    async fn search_repositories(&self, query: &str) -> AppResult<Vec<Repository>> {
        let by_prefix = self.repositories_with_prefix(query).await?;
        if !by_prefix.is_empty() {
            return Ok(by_prefix);
        }
        self.repositories_with_suffix(query).await
    }
}

/// Accessor over commit records keyed by (repo, sha).
#[async_trait]
pub trait CommitStore: Send + Sync {
    /// All commits of a repository, newest first.
    async fn commits_for(&self, full_name: &str) -> AppResult<Vec<Commit>>;

    async fn find_commit(&self, full_name: &str, sha: &str) -> AppResult<Option<Commit>>;

    /// Most recent commit by date. Fails with `NoCommits` when there is none.
    async fn last_commit(&self, full_name: &str) -> AppResult<Commit>;

    /// Store every commit not already present, as unchecked.
    ///
    /// Returns `DuplicateKey` after the insert when any commit of the batch was
    /// already stored (or repeated in the batch). Existing rows are untouched.
    async fn insert_commits(&self, commits: &[NewCommit]) -> AppResult<()>;

    /// Atomically move a commit from unchecked (or an expired checking claim)
    /// to checking. Returns whether this caller now owns the check.
    async fn claim_commit(&self, full_name: &str, sha: &str, lease: Duration) -> AppResult<bool>;

    /// Record the check result on a claimed commit and return it.
    async fn complete_check(
        &self,
        full_name: &str,
        sha: &str,
        warnings: &[String],
    ) -> AppResult<Commit>;

    /// Give a claimed commit back to unchecked so a later push retries it.
    async fn release_claim(&self, full_name: &str, sha: &str) -> AppResult<()>;
}

/// Everything the service needs from persistence.
pub trait Store: RepositoryStore + CommitStore {}

impl<T: RepositoryStore + CommitStore> Store for T {}
