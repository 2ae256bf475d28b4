//! Repository domain models and DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::commit::CommitSummary;

/// Repository subscription record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Repository {
    /// Full name, e.g. `org/project`.
    pub repo: String,
    /// Only subscribed repositories have webhook pushes checked.
    pub subscribed: bool,
}

/// Repository with its full commit list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RepositoryDetail {
    pub repo: String,
    pub subscribed: bool,
    pub commits: Vec<CommitSummary>,
}

impl RepositoryDetail {
    pub fn new(repository: Repository, commits: Vec<CommitSummary>) -> Self {
        Self {
            repo: repository.repo,
            subscribed: repository.subscribed,
            commits,
        }
    }
}

/// Request body for changing a subscription.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubscribeRequest {
    pub subscribed: bool,
}

/// Query parameters for listing repositories.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ListRepositoriesQuery {
    /// Name prefix, falling back to suffix when nothing starts with it.
    #[serde(default)]
    pub q: Option<String>,
}

impl ListRepositoriesQuery {
    /// The search term, if one was given.
    pub fn search_term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}
