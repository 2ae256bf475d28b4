//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Flint Tracker",
        version = "0.1.0",
        description = "Tracks repositories and commits, recording whether each commit passed the flint check"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Repository endpoints
        api::repositories::list_repositories,
        api::repositories::get_repository,
        api::repositories::set_subscription,
        // Commit endpoints
        api::repositories::latest_commit,
        api::repositories::push_commits,
        // Webhooks
        api::webhook::github_webhook,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Repositories
            models::Repository,
            models::RepositoryDetail,
            models::SubscribeRequest,
            models::ListRepositoriesQuery,
            // Commits
            models::CommitStatus,
            models::Commit,
            models::CommitSummary,
            models::IncomingCommit,
            models::PushRequest,
            // Webhooks
            models::GitHubPushEvent,
            models::PushRepository,
            models::WebhookAck,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Repositories", description = "Repository subscriptions and lookup"),
        (name = "Commits", description = "Commit ingestion and flint results"),
        (name = "Webhooks", description = "GitHub push webhooks")
    )
)]
pub struct ApiDoc;
