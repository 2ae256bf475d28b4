//! E2E tests: HTTP routes.

use actix_web::test;
use serde_json::{Value, json};

use super::test_helpers::*;

#[actix_rt::test]
async fn test_health_and_ready() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, &FakeChecker::passing(), webhook_settings(false)).await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");

    let req = test::TestRequest::get().uri("/api/v1/ready").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["database"], "connected");
}

#[actix_rt::test]
async fn test_subscribe_then_get_repository() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, &FakeChecker::passing(), webhook_settings(false)).await;

    let req = test::TestRequest::put()
        .uri("/api/v1/repos/org/x/subscription")
        .set_json(json!({ "subscribed": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "repo": "org/x", "subscribed": true }));

    let req = test::TestRequest::get().uri("/api/v1/repos/org/x").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["repo"], "org/x");
    assert_eq!(body["commits"], json!([]));
}

#[actix_rt::test]
async fn test_unknown_repository_is_404() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, &FakeChecker::passing(), webhook_settings(false)).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/repos/unknown/repo")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "NOT_FOUND");

    let req = test::TestRequest::get()
        .uri("/api/v1/repos/unknown/repo/commits/latest")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[actix_rt::test]
async fn test_search_repositories() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, &FakeChecker::passing(), webhook_settings(false)).await;

    for name in ["acme/api", "acme/web", "other/web"] {
        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/repos/{}/subscription", name))
            .set_json(json!({ "subscribed": false }))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());
    }

    let req = test::TestRequest::get().uri("/api/v1/repos").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().unwrap().len(), 3);

    let req = test::TestRequest::get().uri("/api/v1/repos?q=acme").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body,
        json!([
            { "repo": "acme/api", "subscribed": false },
            { "repo": "acme/web", "subscribed": false }
        ])
    );

    let req = test::TestRequest::get().uri("/api/v1/repos?q=web").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["repo"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["acme/web", "other/web"]);

    let req = test::TestRequest::get().uri("/api/v1/repos?q=zzz").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!([]));
}

#[actix_rt::test]
async fn test_push_then_latest_commit() {
    let pool = create_test_pool().await;
    let checker = FakeChecker::passing();
    let app = create_test_app(&pool, &checker, webhook_settings(false)).await;

    let push = json!({
        "commits": [
            { "sha": "a1", "date": "2024-01-01" },
            { "sha": "a2", "date": "2024-01-02" }
        ]
    });
    let req = test::TestRequest::post()
        .uri("/api/v1/repos/org/x/push")
        .set_json(&push)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["sha"], "a2");
    assert_eq!(body["status"], "success");
    assert_eq!(body["warnings"], json!([]));

    // Redelivery returns the same result without a second check
    let req = test::TestRequest::post()
        .uri("/api/v1/repos/org/x/push")
        .set_json(&push)
        .to_request();
    let again: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(again, body);
    assert_eq!(checker.calls(), 1);

    let req = test::TestRequest::get()
        .uri("/api/v1/repos/org/x/commits/latest")
        .to_request();
    let latest: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(latest, body);
}

#[actix_rt::test]
async fn test_push_with_bad_date_is_400() {
    let pool = create_test_pool().await;
    let checker = FakeChecker::passing();
    let app = create_test_app(&pool, &checker, webhook_settings(false)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/repos/org/x/push")
        .set_json(json!({ "commits": [{ "sha": "a1", "date": "not a date" }] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_INPUT");
    assert_eq!(checker.calls(), 0);
}

#[actix_rt::test]
async fn test_failed_check_is_502() {
    let pool = create_test_pool().await;
    let checker = FakeChecker::scripted(vec![Outcome::Fail]);
    let app = create_test_app(&pool, &checker, webhook_settings(false)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/repos/org/x/push")
        .set_json(json!({ "commits": [{ "sha": "a1", "date": "2024-01-01" }] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 502);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "CHECK_FAILED");
}
