//! E2E tests: repository subscriptions, search and detail.

use flint_tracker_lib::db::{CommitStore, RepositoryStore};
use flint_tracker_lib::error::AppError;
use flint_tracker_lib::services::repositories::repository_detail;

use super::test_helpers::*;

fn names(repos: &[flint_tracker_lib::models::Repository]) -> Vec<&str> {
    repos.iter().map(|r| r.repo.as_str()).collect()
}

#[actix_rt::test]
async fn test_subscribe_twice_keeps_one_record() {
    let pool = create_test_pool().await;

    pool.upsert_repository("org/x", true).await.unwrap();
    let repo = pool.upsert_repository("org/x", true).await.unwrap();

    assert!(repo.subscribed);
    assert_eq!(names(&pool.list_repositories().await.unwrap()), vec!["org/x"]);
}

#[actix_rt::test]
async fn test_unsubscribe_updates_flag() {
    let pool = create_test_pool().await;

    pool.upsert_repository("org/x", true).await.unwrap();
    let repo = pool.upsert_repository("org/x", false).await.unwrap();

    assert!(!repo.subscribed);
    let stored = pool.find_repository("org/x").await.unwrap().unwrap();
    assert!(!stored.subscribed);
}

#[actix_rt::test]
async fn test_list_is_ordered_by_name() {
    let pool = create_test_pool().await;
    for name in ["zeta/one", "alpha/two", "mid/three"] {
        pool.upsert_repository(name, true).await.unwrap();
    }

    assert_eq!(
        names(&pool.list_repositories().await.unwrap()),
        vec!["alpha/two", "mid/three", "zeta/one"]
    );
}

#[actix_rt::test]
async fn test_search_prefers_prefix_then_suffix() {
    let pool = create_test_pool().await;
    for name in ["acme/api", "acme/web", "other/acme"] {
        pool.upsert_repository(name, false).await.unwrap();
    }

    let by_prefix = pool.search_repositories("acme").await.unwrap();
    assert_eq!(names(&by_prefix), vec!["acme/api", "acme/web"]);

    let by_suffix = pool.search_repositories("/web").await.unwrap();
    assert_eq!(names(&by_suffix), vec!["acme/web"]);

    assert!(pool.search_repositories("nothing").await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_search_treats_wildcards_literally() {
    let pool = create_test_pool().await;
    pool.upsert_repository("org/my_repo", true).await.unwrap();
    pool.upsert_repository("org/myXrepo", true).await.unwrap();

    let found = pool.search_repositories("org/my_").await.unwrap();
    assert_eq!(names(&found), vec!["org/my_repo"]);

    assert!(pool.search_repositories("%").await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_search_is_case_sensitive() {
    let pool = create_test_pool().await;
    pool.upsert_repository("Org/Repo", true).await.unwrap();

    assert!(pool.search_repositories("org").await.unwrap().is_empty());
    assert_eq!(
        names(&pool.search_repositories("Org").await.unwrap()),
        vec!["Org/Repo"]
    );
}

#[actix_rt::test]
async fn test_detail_of_unknown_repository() {
    let pool = create_test_pool().await;

    let err = repository_detail(&pool, "unknown/repo").await.unwrap_err();
    assert!(matches!(err, AppError::RepositoryNotFound(ref name) if name == "unknown/repo"));
}

#[actix_rt::test]
async fn test_detail_requires_repository_record() {
    let pool = create_test_pool().await;
    let checker = FakeChecker::passing();
    let ingestion = create_ingestion(&pool, &checker);

    // Commits alone do not make a repository known
    ingestion
        .check_push("org/x", vec![incoming("a1", "2024-01-01")])
        .await
        .unwrap();

    let err = repository_detail(&pool, "org/x").await.unwrap_err();
    assert!(matches!(err, AppError::RepositoryNotFound(_)), "got {:?}", err);
}

#[actix_rt::test]
async fn test_detail_of_repository_without_commits() {
    let pool = create_test_pool().await;
    pool.upsert_repository("org/x", true).await.unwrap();

    let detail = repository_detail(&pool, "org/x").await.unwrap();
    assert_eq!(detail.repo, "org/x");
    assert!(detail.subscribed);
    assert!(detail.commits.is_empty());

    // last_commit still reports the absence
    let err = pool.last_commit("org/x").await.unwrap_err();
    assert!(matches!(err, AppError::NoCommits(_)));
}

#[actix_rt::test]
async fn test_detail_lists_commits_newest_first() {
    let pool = create_test_pool().await;
    let checker = FakeChecker::passing();
    let ingestion = create_ingestion(&pool, &checker);
    pool.upsert_repository("org/x", true).await.unwrap();

    ingestion
        .check_push(
            "org/x",
            vec![incoming("a1", "2024-01-01"), incoming("a2", "2024-01-02")],
        )
        .await
        .unwrap();

    let detail = repository_detail(&pool, "org/x").await.unwrap();
    let shas: Vec<&str> = detail.commits.iter().map(|c| c.sha.as_str()).collect();
    assert_eq!(shas, vec!["a2", "a1"]);
}
