//! GitHub webhook handler.
//!
//! Push events for subscribed repositories run through push ingestion;
//! everything else is acknowledged and ignored.

use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{debug, info, warn};

use crate::config::{EVENT_HEADER, SIGNATURE_HEADER, WebhookSettings};
use crate::db::{DbPool, RepositoryStore};
use crate::error::{AppError, AppResult};
use crate::models::{GitHubPushEvent, WebhookAck};
use crate::services::Ingestion;
use crate::services::signature::verify_signature;

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Receive a GitHub webhook delivery.
#[utoipa::path(
    post,
    path = "/api/v1/webhooks/github",
    tag = "Webhooks",
    request_body = GitHubPushEvent,
    responses(
        (status = 200, description = "Push checked; latest commit", body = crate::models::Commit),
        (status = 202, description = "Delivery ignored", body = WebhookAck),
        (status = 400, description = "Malformed payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Bad signature", body = crate::error::ErrorResponse),
        (status = 502, description = "Flint check failed", body = crate::error::ErrorResponse),
    )
)]
pub async fn github_webhook(
    req: HttpRequest,
    body: web::Bytes,
    pool: web::Data<DbPool>,
    ingestion: web::Data<Ingestion>,
    settings: web::Data<WebhookSettings>,
) -> AppResult<HttpResponse> {
    if let Some(secret) = settings.secret.as_ref() {
        let signature = header(&req, SIGNATURE_HEADER).unwrap_or("");
        if !verify_signature(secret, &body, signature) {
            warn!("Webhook signature validation failed");
            return Err(AppError::Unauthorized(
                "invalid webhook signature".to_string(),
            ));
        }
    }

    match header(&req, EVENT_HEADER).unwrap_or("unknown") {
        "push" => {}
        "ping" => {
            info!("Received GitHub ping webhook");
            return Ok(HttpResponse::Ok().json(WebhookAck {
                status: "pong".to_string(),
                reason: "ping received".to_string(),
            }));
        }
        other => {
            debug!("Ignoring webhook event: {}", other);
            return Ok(HttpResponse::Accepted()
                .json(WebhookAck::ignored(format!("event '{}' is not handled", other))));
        }
    }

    let event: GitHubPushEvent = serde_json::from_slice(&body)?;
    let repo = event.repository.full_name;

    if event.commits.is_empty() {
        debug!(repo = %repo, "Push without commits");
        return Ok(HttpResponse::Accepted().json(WebhookAck::ignored("push has no commits")));
    }

    match pool.find_repository(&repo).await? {
        Some(repository) if repository.subscribed => {}
        Some(_) => {
            debug!(repo = %repo, "Push for unsubscribed repository");
            return Ok(
                HttpResponse::Accepted().json(WebhookAck::ignored("repository is not subscribed"))
            );
        }
        None => {
            debug!(repo = %repo, "Push for unknown repository");
            return Ok(HttpResponse::Accepted().json(WebhookAck::ignored("repository is unknown")));
        }
    }

    let commit = ingestion.check_push(&repo, event.commits).await?;
    Ok(HttpResponse::Ok().json(commit))
}

/// Configure webhook routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/webhooks/github").route(web::post().to(github_webhook)));
}
