//! Push ingestion: store the pushed commits and run the flint check on the
//! latest one, at most once per commit.
//!
//! Duplicate pushes are expected (webhook redeliveries, overlapping pushes).
//! The store's (repo, sha) uniqueness absorbs them, and the atomic claim on the
//! resolved commit decides which request invokes the check.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, error, info, warn};

use crate::config::CheckSettings;
use crate::db::Store;
use crate::error::{AppError, AppResult};
use crate::models::{Commit, IncomingCommit, NewCommit};
use crate::services::flint::CheckInvoker;

/// How often a caller that lost the claim looks at the commit again.
const CLAIM_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Extra wait past the check timeout for the claim holder to store its result.
const CLAIM_WAIT_GRACE: Duration = Duration::from_secs(2);

/// Ingestion workflow over an injected store and check invoker.
#[derive(Clone)]
pub struct Ingestion {
    store: Arc<dyn Store>,
    checker: Arc<dyn CheckInvoker>,
    check_timeout: Duration,
    claim_lease: Duration,
}

impl Ingestion {
    pub fn new(
        store: Arc<dyn Store>,
        checker: Arc<dyn CheckInvoker>,
        settings: &CheckSettings,
    ) -> Self {
        Self {
            store,
            checker,
            check_timeout: settings.timeout(),
            claim_lease: settings.lease(),
        }
    }

    /// Store a push and return its latest commit, checked.
    ///
    /// Already-stored commits are kept as they are; the latest commit of the
    /// repository is checked only if nobody has checked (or is checking) it.
    pub async fn check_push(&self, repo: &str, commits: Vec<IncomingCommit>) -> AppResult<Commit> {
        if repo.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "repository name must not be empty".to_string(),
            ));
        }

        let batch = commits
            .into_iter()
            .map(|c| c.normalize(repo))
            .collect::<AppResult<Vec<NewCommit>>>()?;

        if !batch.is_empty() {
            match self.store.insert_commits(&batch).await {
                Ok(()) => debug!(repo = %repo, count = batch.len(), "Stored pushed commits"),
                Err(AppError::DuplicateKey(detail)) => {
                    info!(repo = %repo, "Tried to insert existing commit ({})", detail);
                }
                Err(e) => return Err(e),
            }
        }

        let latest = self.store.last_commit(repo).await?;
        if latest.status.is_terminal() {
            debug!(repo = %repo, sha = %latest.sha, status = %latest.status, "Latest commit already checked");
            return Ok(latest);
        }

        self.check_commit(latest).await
    }

    /// Check the commit, or wait for whoever holds the claim to finish.
    ///
    /// A caller that loses the claim polls until the commit is terminal, bounded
    /// by the check timeout plus a grace period for storing the result. If the
    /// holder gives the claim back in the meantime, the next poll claims it.
    async fn check_commit(&self, commit: Commit) -> AppResult<Commit> {
        let deadline = Instant::now() + self.check_timeout + CLAIM_WAIT_GRACE;

        loop {
            if self
                .store
                .claim_commit(&commit.repo, &commit.sha, self.claim_lease)
                .await?
            {
                return self.run_check(commit).await;
            }

            let current = self
                .store
                .find_commit(&commit.repo, &commit.sha)
                .await?
                .ok_or_else(|| {
                    AppError::Database(format!("Commit {} missing in {}", commit.sha, commit.repo))
                })?;
            if current.status.is_terminal() {
                return Ok(current);
            }

            if Instant::now() >= deadline {
                warn!(repo = %commit.repo, sha = %commit.sha, "Gave up waiting for check held elsewhere");
                return Err(AppError::CheckFailed(format!(
                    "check of {} is still in progress elsewhere",
                    commit.sha
                )));
            }

            debug!(repo = %commit.repo, sha = %commit.sha, "Commit check claimed elsewhere, waiting");
            sleep(CLAIM_POLL_INTERVAL).await;
        }
    }

    /// Run the check on a claimed commit and record or release the claim.
    async fn run_check(&self, commit: Commit) -> AppResult<Commit> {
        let outcome = match tokio::time::timeout(self.check_timeout, self.checker.flint_commit(&commit))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(AppError::CheckFailed(format!(
                "check of {} timed out after {}s",
                commit.sha,
                self.check_timeout.as_secs()
            ))),
        };

        match outcome {
            Ok(warnings) => {
                let checked = self
                    .store
                    .complete_check(&commit.repo, &commit.sha, &warnings)
                    .await?;
                info!(
                    repo = %checked.repo,
                    sha = %checked.sha,
                    status = %checked.status,
                    "Commit {} in repo {} has {} warnings",
                    checked.sha,
                    checked.repo,
                    warnings.len()
                );
                Ok(checked)
            }
            Err(e) => {
                warn!(repo = %commit.repo, sha = %commit.sha, "Flint check failed: {}", e);
                if let Err(release_err) = self.store.release_claim(&commit.repo, &commit.sha).await {
                    error!(
                        repo = %commit.repo,
                        sha = %commit.sha,
                        "Failed to release commit claim: {}",
                        release_err
                    );
                }
                Err(e)
            }
        }
    }
}
