//! E2E tests: the HTTP check client against a mock flint service.

use chrono::{TimeZone, Utc};
use flint_tracker_lib::config::CheckSettings;
use flint_tracker_lib::error::AppError;
use flint_tracker_lib::models::{Commit, CommitStatus};
use flint_tracker_lib::services::{CheckInvoker, HttpCheckInvoker};

use super::mock_flint_service::MockFlintService;

fn commit(sha: &str) -> Commit {
    Commit {
        repo: "org/x".to_string(),
        sha: sha.to_string(),
        date: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        status: CommitStatus::Checking,
        warnings: None,
    }
}

fn client_for(url: &str) -> HttpCheckInvoker {
    HttpCheckInvoker::new(&CheckSettings {
        url: url.to_string(),
        timeout_secs: 5,
        lease_secs: 600,
    })
    .expect("Failed to build check client")
}

#[actix_rt::test]
async fn test_http_check_passes_clean_commit() {
    let mock = MockFlintService::start().await;
    let client = client_for(&mock.check_url);

    let warnings = client.flint_commit(&commit("a2")).await.unwrap();
    assert!(warnings.is_empty());

    let received = mock.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].repo, "org/x");
    assert_eq!(received[0].sha, "a2");
    assert!(received[0].date.starts_with("2024-01-02T00:00:00"));
}

#[actix_rt::test]
async fn test_http_check_returns_warnings() {
    let mock = MockFlintService::start().await;
    let client = client_for(&mock.check_url);

    let warnings = client.flint_commit(&commit("bad1")).await.unwrap();
    assert_eq!(warnings, vec!["org/x: unused import".to_string()]);
}

#[actix_rt::test]
async fn test_http_check_server_error_is_check_failed() {
    let mock = MockFlintService::start().await;
    let client = client_for(&mock.check_url);

    let err = client.flint_commit(&commit("broken1")).await.unwrap_err();
    assert!(matches!(err, AppError::CheckFailed(_)), "got {:?}", err);
}

#[actix_rt::test]
async fn test_http_check_unreachable_is_check_failed() {
    // Port 9 (discard) is not listening
    let client = client_for("http://127.0.0.1:9/check");

    let err = client.flint_commit(&commit("a1")).await.unwrap_err();
    assert!(matches!(err, AppError::CheckFailed(_)), "got {:?}", err);
}
