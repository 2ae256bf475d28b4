//! Client for the external flint check.
//!
//! The check is an opaque collaborator: it receives a commit and answers with
//! a list of warnings, where an empty list means the commit passed.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::CheckSettings;
use crate::error::{AppError, AppResult};
use crate::models::Commit;

/// Connect timeout for the check endpoint; the request timeout comes from config.
const CHECK_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs the flint check over a commit.
#[async_trait]
pub trait CheckInvoker: Send + Sync {
    /// Warnings for the commit; empty means success.
    async fn flint_commit(&self, commit: &Commit) -> AppResult<Vec<String>>;
}

/// Body posted to the check endpoint.
#[derive(Debug, Serialize)]
struct CheckRequest<'a> {
    repo: &'a str,
    sha: &'a str,
    date: DateTime<Utc>,
}

/// Response from the check endpoint.
#[derive(Debug, Deserialize)]
struct CheckResponse {
    #[serde(default)]
    warnings: Vec<String>,
}

/// Check invoker calling a flint HTTP endpoint.
#[derive(Clone)]
pub struct HttpCheckInvoker {
    client: reqwest::Client,
    url: String,
}

impl HttpCheckInvoker {
    pub fn new(settings: &CheckSettings) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CHECK_CONNECT_TIMEOUT)
            .timeout(settings.timeout())
            .build()
            .map_err(|e| AppError::CheckFailed(format!("Failed to build HTTP client: {}", e)))?;

        info!("Flint check client initialized (url={})", settings.url);

        Ok(Self {
            client,
            url: settings.url.clone(),
        })
    }
}

#[async_trait]
impl CheckInvoker for HttpCheckInvoker {
    async fn flint_commit(&self, commit: &Commit) -> AppResult<Vec<String>> {
        debug!(repo = %commit.repo, sha = %commit.sha, "Invoking flint check");

        let response = self
            .client
            .post(&self.url)
            .json(&CheckRequest {
                repo: &commit.repo,
                sha: &commit.sha,
                date: commit.date,
            })
            .send()
            .await
            .map_err(|e| {
                warn!("Flint check request failed for {}: {}", commit.sha, e);
                AppError::CheckFailed(format!("request to check service failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::CheckFailed(format!(
                "check service answered {} for {}",
                status, commit.sha
            )));
        }

        let body: CheckResponse = response.json().await.map_err(|e| {
            AppError::CheckFailed(format!("unreadable check response for {}: {}", commit.sha, e))
        })?;

        Ok(body.warnings)
    }
}
