//! Repository and commit API handlers.

use actix_web::{HttpResponse, web};
use tracing::info;

use crate::db::{CommitStore, DbPool, RepositoryStore};
use crate::error::AppResult;
use crate::models::{ListRepositoriesQuery, PushRequest, SubscribeRequest};
use crate::services::Ingestion;
use crate::services::repositories::repository_detail;

/// Join the `{owner}/{name}` path segments into a full name.
fn full_name(path: web::Path<(String, String)>) -> String {
    let (owner, name) = path.into_inner();
    format!("{}/{}", owner, name)
}

/// List repositories, optionally searching by name.
///
/// With `q`, returns repositories whose name starts with `q`; if there are
/// none, those whose name ends with `q`.
#[utoipa::path(
    get,
    path = "/api/v1/repos",
    tag = "Repositories",
    params(
        ("q" = Option<String>, Query, description = "Name prefix (falls back to suffix)")
    ),
    responses(
        (status = 200, description = "Repositories", body = Vec<crate::models::Repository>),
    )
)]
pub async fn list_repositories(
    pool: web::Data<DbPool>,
    query: web::Query<ListRepositoriesQuery>,
) -> AppResult<HttpResponse> {
    let repositories = match query.search_term() {
        Some(term) => pool.search_repositories(term).await?,
        None => pool.list_repositories().await?,
    };

    Ok(HttpResponse::Ok().json(repositories))
}

/// Get a repository with all of its commits.
#[utoipa::path(
    get,
    path = "/api/v1/repos/{owner}/{name}",
    tag = "Repositories",
    params(
        ("owner" = String, Path, description = "Repository owner"),
        ("name" = String, Path, description = "Repository name")
    ),
    responses(
        (status = 200, description = "Repository with commits", body = crate::models::RepositoryDetail),
        (status = 404, description = "Repository not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_repository(
    pool: web::Data<DbPool>,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let detail = repository_detail(pool.get_ref(), &full_name(path)).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// Subscribe to or unsubscribe from a repository.
///
/// Creates the repository record when it does not exist yet.
#[utoipa::path(
    put,
    path = "/api/v1/repos/{owner}/{name}/subscription",
    tag = "Repositories",
    params(
        ("owner" = String, Path, description = "Repository owner"),
        ("name" = String, Path, description = "Repository name")
    ),
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Stored subscription", body = crate::models::Repository),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
    )
)]
pub async fn set_subscription(
    pool: web::Data<DbPool>,
    path: web::Path<(String, String)>,
    body: web::Json<SubscribeRequest>,
) -> AppResult<HttpResponse> {
    let repo = full_name(path);
    let subscribed = body.into_inner().subscribed;

    let repository = pool.upsert_repository(&repo, subscribed).await?;
    info!(repo = %repo, subscribed, "Subscription updated");

    Ok(HttpResponse::Ok().json(repository))
}

/// Get the most recent commit of a repository.
#[utoipa::path(
    get,
    path = "/api/v1/repos/{owner}/{name}/commits/latest",
    tag = "Commits",
    params(
        ("owner" = String, Path, description = "Repository owner"),
        ("name" = String, Path, description = "Repository name")
    ),
    responses(
        (status = 200, description = "Latest commit", body = crate::models::Commit),
        (status = 404, description = "No commits for repository", body = crate::error::ErrorResponse),
    )
)]
pub async fn latest_commit(
    pool: web::Data<DbPool>,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let commit = pool.last_commit(&full_name(path)).await?;
    Ok(HttpResponse::Ok().json(commit))
}

/// Ingest a push and return the latest commit after its flint check.
#[utoipa::path(
    post,
    path = "/api/v1/repos/{owner}/{name}/push",
    tag = "Commits",
    params(
        ("owner" = String, Path, description = "Repository owner"),
        ("name" = String, Path, description = "Repository name")
    ),
    request_body = PushRequest,
    responses(
        (status = 200, description = "Latest commit, checked", body = crate::models::Commit),
        (status = 400, description = "Invalid commits", body = crate::error::ErrorResponse),
        (status = 404, description = "No commits for repository", body = crate::error::ErrorResponse),
        (status = 502, description = "Flint check failed", body = crate::error::ErrorResponse),
    )
)]
pub async fn push_commits(
    ingestion: web::Data<Ingestion>,
    path: web::Path<(String, String)>,
    body: web::Json<PushRequest>,
) -> AppResult<HttpResponse> {
    let repo = full_name(path);
    let commit = ingestion.check_push(&repo, body.into_inner().commits).await?;
    Ok(HttpResponse::Ok().json(commit))
}

/// Configure repository routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/repos").route(web::get().to(list_repositories)))
        .service(web::resource("/repos/{owner}/{name}").route(web::get().to(get_repository)))
        .service(
            web::resource("/repos/{owner}/{name}/subscription")
                .route(web::put().to(set_subscription)),
        )
        .service(
            web::resource("/repos/{owner}/{name}/commits/latest")
                .route(web::get().to(latest_commit)),
        )
        .service(web::resource("/repos/{owner}/{name}/push").route(web::post().to(push_commits)));
}
