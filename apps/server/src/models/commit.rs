//! Commit domain models and DTOs.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Commit check status.
///
/// `Checking` is held only while a worker owns the check claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CommitStatus {
    /// Stored, not yet checked.
    Unchecked,
    /// Claimed by a worker; check in flight.
    Checking,
    /// Check returned no warnings.
    Success,
    /// Check returned at least one warning.
    Failed,
}

impl CommitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unchecked => "unchecked",
            Self::Checking => "checking",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unchecked" => Some(Self::Unchecked),
            "checking" => Some(Self::Checking),
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Final status for a completed check.
    pub fn from_warnings(warnings: &[String]) -> Self {
        if warnings.is_empty() {
            Self::Success
        } else {
            Self::Failed
        }
    }

    /// Success and failed are never left again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

impl std::fmt::Display for CommitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stored commit as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Commit {
    pub repo: String,
    pub sha: String,
    pub date: DateTime<Utc>,
    pub status: CommitStatus,
    /// Present once the commit has been checked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

/// Commit inside a repository detail response (repository name omitted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CommitSummary {
    pub sha: String,
    pub date: DateTime<Utc>,
    pub status: CommitStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

impl From<Commit> for CommitSummary {
    fn from(commit: Commit) -> Self {
        Self {
            sha: commit.sha,
            date: commit.date,
            status: commit.status,
            warnings: commit.warnings,
        }
    }
}

/// Commit as it arrives in a push.
///
/// Accepts both the plain `{sha, date}` shape and GitHub's push payload
/// shape (`{id, timestamp, ...}`); other fields are ignored.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IncomingCommit {
    #[serde(alias = "id")]
    pub sha: String,
    #[serde(alias = "timestamp")]
    pub date: String,
}

impl IncomingCommit {
    /// Attach the repository and parse the date.
    pub fn normalize(self, repo: &str) -> AppResult<NewCommit> {
        let sha = self.sha.trim();
        if sha.is_empty() {
            return Err(AppError::InvalidInput(
                "commit sha must not be empty".to_string(),
            ));
        }

        let date = parse_commit_date(&self.date).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "commit {} has unparseable date '{}'",
                sha, self.date
            ))
        })?;

        Ok(NewCommit {
            repo: repo.to_string(),
            sha: sha.to_string(),
            date,
        })
    }
}

/// Normalized commit ready for insertion; always stored as unchecked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommit {
    pub repo: String,
    pub sha: String,
    pub date: DateTime<Utc>,
}

/// Request body for a push.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PushRequest {
    #[serde(default)]
    pub commits: Vec<IncomingCommit>,
}

/// Parse a commit date.
///
/// Accepts RFC 3339 (with offset), a naive `YYYY-MM-DDTHH:MM:SS` taken as UTC,
/// and a bare `YYYY-MM-DD` taken as midnight UTC.
pub fn parse_commit_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
