//! Database operations for commits.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::debug;

use crate::entity::commit::{self, ActiveModel, Entity as CommitEntity};
use crate::error::{AppError, AppResult};
use crate::models::{Commit, CommitStatus, NewCommit};

use super::store::CommitStore;
use super::{DbPool, db_error};

#[async_trait]
impl CommitStore for DbPool {
    async fn commits_for(&self, full_name: &str) -> AppResult<Vec<Commit>> {
        let result = CommitEntity::find()
            .filter(commit::Column::Repo.eq(full_name))
            .order_by_desc(commit::Column::Date)
            .order_by_desc(commit::Column::Id)
            .all(self.connection())
            .await
            .map_err(db_error("Failed to get commits for repository"))?;

        result.into_iter().map(model_to_commit).collect()
    }

    async fn find_commit(&self, full_name: &str, sha: &str) -> AppResult<Option<Commit>> {
        let result = CommitEntity::find()
            .filter(commit::Column::Repo.eq(full_name))
            .filter(commit::Column::Sha.eq(sha))
            .one(self.connection())
            .await
            .map_err(db_error("Failed to get commit"))?;

        result.map(model_to_commit).transpose()
    }

    async fn last_commit(&self, full_name: &str) -> AppResult<Commit> {
        // Same date: the later insert wins
        let result = CommitEntity::find()
            .filter(commit::Column::Repo.eq(full_name))
            .order_by_desc(commit::Column::Date)
            .order_by_desc(commit::Column::Id)
            .one(self.connection())
            .await
            .map_err(db_error("Failed to get last commit"))?;

        match result {
            Some(m) => model_to_commit(m),
            None => Err(AppError::NoCommits(full_name.to_string())),
        }
    }

    async fn insert_commits(&self, commits: &[NewCommit]) -> AppResult<()> {
        // Rows commit one by one in push order: no row lock outlives its own
        // statement, and a later row still wins a same-date tie.
        let now = Utc::now();
        let mut duplicates = Vec::new();

        for new_commit in commits {
            let model = ActiveModel {
                repo: Set(new_commit.repo.clone()),
                sha: Set(new_commit.sha.clone()),
                date: Set(new_commit.date),
                status: Set(CommitStatus::Unchecked.as_str().to_string()),
                warnings: Set(None),
                claimed_at: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };

            let inserted = CommitEntity::insert(model)
                .on_conflict(
                    OnConflict::columns([commit::Column::Repo, commit::Column::Sha])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(self.connection())
                .await
                .map_err(db_error("Failed to insert commit"))?;

            if inserted == 0 {
                duplicates.push(new_commit.sha.as_str());
            }
        }

        if duplicates.is_empty() {
            Ok(())
        } else {
            Err(AppError::DuplicateKey(format!(
                "commits already stored for {}: {}",
                commits.first().map(|c| c.repo.as_str()).unwrap_or_default(),
                duplicates.join(", ")
            )))
        }
    }

    async fn claim_commit(&self, full_name: &str, sha: &str, lease: Duration) -> AppResult<bool> {
        let now = Utc::now();
        let lease = TimeDelta::from_std(lease)
            .map_err(|_| AppError::InvalidInput("claim lease out of range".to_string()))?;
        let stale_before = now - lease;

        let claimable = Condition::any()
            .add(commit::Column::Status.eq(CommitStatus::Unchecked.as_str()))
            .add(
                Condition::all()
                    .add(commit::Column::Status.eq(CommitStatus::Checking.as_str()))
                    .add(commit::Column::ClaimedAt.lt(stale_before)),
            );

        let result = CommitEntity::update_many()
            .set(ActiveModel {
                status: Set(CommitStatus::Checking.as_str().to_string()),
                claimed_at: Set(Some(now)),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(commit::Column::Repo.eq(full_name))
            .filter(commit::Column::Sha.eq(sha))
            .filter(claimable)
            .exec(self.connection())
            .await
            .map_err(db_error("Failed to claim commit"))?;

        let claimed = result.rows_affected == 1;
        debug!(repo = %full_name, sha = %sha, claimed, "Commit claim attempted");
        Ok(claimed)
    }

    async fn complete_check(
        &self,
        full_name: &str,
        sha: &str,
        warnings: &[String],
    ) -> AppResult<Commit> {
        let now = Utc::now();
        let status = CommitStatus::from_warnings(warnings);

        let result = CommitEntity::update_many()
            .set(ActiveModel {
                status: Set(status.as_str().to_string()),
                warnings: Set(Some(serde_json::to_value(warnings)?)),
                claimed_at: Set(None),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(commit::Column::Repo.eq(full_name))
            .filter(commit::Column::Sha.eq(sha))
            .filter(commit::Column::Status.eq(CommitStatus::Checking.as_str()))
            .exec(self.connection())
            .await
            .map_err(db_error("Failed to store check result"))?;

        if result.rows_affected == 0 {
            debug!(repo = %full_name, sha = %sha, "Check result arrived after claim was lost");
        }

        self.find_commit(full_name, sha)
            .await?
            .ok_or_else(|| AppError::Database(format!("Commit {} missing in {}", sha, full_name)))
    }

    async fn release_claim(&self, full_name: &str, sha: &str) -> AppResult<()> {
        CommitEntity::update_many()
            .set(ActiveModel {
                status: Set(CommitStatus::Unchecked.as_str().to_string()),
                claimed_at: Set(None),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(commit::Column::Repo.eq(full_name))
            .filter(commit::Column::Sha.eq(sha))
            .filter(commit::Column::Status.eq(CommitStatus::Checking.as_str()))
            .exec(self.connection())
            .await
            .map_err(db_error("Failed to release commit claim"))?;

        Ok(())
    }
}

fn model_to_commit(m: commit::Model) -> AppResult<Commit> {
    let status = CommitStatus::parse(&m.status).ok_or_else(|| {
        AppError::Database(format!(
            "Commit {} has unknown status '{}'",
            m.sha, m.status
        ))
    })?;

    let warnings = match m.warnings {
        Some(value) => Some(serde_json::from_value::<Vec<String>>(value).map_err(|e| {
            AppError::Database(format!("Commit {} has malformed warnings: {}", m.sha, e))
        })?),
        None => None,
    };

    Ok(Commit {
        repo: m.repo,
        sha: m.sha,
        date: m.date,
        status,
        warnings,
    })
}
