//! Domain models and DTOs for the flint tracker.

pub mod commit;
pub mod repository;
pub mod webhook;

// Re-export commonly used types
pub use commit::{Commit, CommitStatus, CommitSummary, IncomingCommit, NewCommit, PushRequest};
pub use repository::{ListRepositoriesQuery, Repository, RepositoryDetail, SubscribeRequest};
pub use webhook::{GitHubPushEvent, PushRepository, WebhookAck};
