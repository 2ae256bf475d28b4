//! Database operations for repository subscriptions.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{LikeExpr, OnConflict};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::debug;

use crate::entity::repository::{self, ActiveModel, Entity as RepositoryEntity};
use crate::error::{AppError, AppResult};
use crate::models::Repository;

use super::store::RepositoryStore;
use super::{DbPool, db_error, escape_like};

impl DbPool {
    /// Names matching a LIKE pattern, re-filtered with `keep` since SQLite
    /// LIKE ignores ASCII case.
    async fn repositories_like(
        &self,
        pattern: String,
        keep: impl Fn(&str) -> bool,
    ) -> AppResult<Vec<Repository>> {
        let found = RepositoryEntity::find()
            .filter(repository::Column::Repo.like(LikeExpr::new(pattern).escape('\\')))
            .order_by_asc(repository::Column::Repo)
            .all(self.connection())
            .await
            .map_err(db_error("Failed to search repositories"))?;

        Ok(found
            .into_iter()
            .filter(|m| keep(&m.repo))
            .map(model_to_repository)
            .collect())
    }
}

#[async_trait]
impl RepositoryStore for DbPool {
    async fn list_repositories(&self) -> AppResult<Vec<Repository>> {
        let result = RepositoryEntity::find()
            .order_by_asc(repository::Column::Repo)
            .all(self.connection())
            .await
            .map_err(db_error("Failed to list repositories"))?;

        Ok(result.into_iter().map(model_to_repository).collect())
    }

    async fn repositories_with_prefix(&self, prefix: &str) -> AppResult<Vec<Repository>> {
        self.repositories_like(format!("{}%", escape_like(prefix)), |name| {
            name.starts_with(prefix)
        })
        .await
    }

    async fn repositories_with_suffix(&self, suffix: &str) -> AppResult<Vec<Repository>> {
        self.repositories_like(format!("%{}", escape_like(suffix)), |name| {
            name.ends_with(suffix)
        })
        .await
    }

    async fn upsert_repository(
        &self,
        full_name: &str,
        subscribed: bool,
    ) -> AppResult<Repository> {
        let now = Utc::now();

        let model = ActiveModel {
            repo: Set(full_name.to_string()),
            subscribed: Set(subscribed),
            created_at: Set(now),
            updated_at: Set(now),
        };

        RepositoryEntity::insert(model)
            .on_conflict(
                OnConflict::column(repository::Column::Repo)
                    .update_columns([repository::Column::Subscribed, repository::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(self.connection())
            .await
            .map_err(db_error("Failed to upsert repository"))?;

        debug!(repo = %full_name, subscribed, "Repository subscription stored");

        self.find_repository(full_name).await?.ok_or_else(|| {
            AppError::Database(format!("Repository {} missing after upsert", full_name))
        })
    }

    async fn find_repository(&self, full_name: &str) -> AppResult<Option<Repository>> {
        let result = RepositoryEntity::find_by_id(full_name.to_string())
            .one(self.connection())
            .await
            .map_err(db_error("Failed to get repository"))?;

        Ok(result.map(model_to_repository))
    }
}

fn model_to_repository(m: repository::Model) -> Repository {
    Repository {
        repo: m.repo,
        subscribed: m.subscribed,
    }
}
