//! GitHub webhook payloads.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::commit::IncomingCommit;

/// Repository block of a push event.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PushRepository {
    pub full_name: String,
}

/// The parts of a GitHub `push` event this service reads.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GitHubPushEvent {
    pub repository: PushRepository,
    /// Empty for branch deletions.
    #[serde(default)]
    pub commits: Vec<IncomingCommit>,
}

/// Acknowledgement for webhook deliveries that did not trigger a check.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebhookAck {
    pub status: String,
    pub reason: String,
}

impl WebhookAck {
    pub fn ignored(reason: impl Into<String>) -> Self {
        Self {
            status: "ignored".to_string(),
            reason: reason.into(),
        }
    }
}
