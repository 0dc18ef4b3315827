/// Integration tests for the TaskForge API
///
/// These tests exercise the full stack end to end: router, auth
/// middleware, guard checks, validation, and SQL. They need a running
/// PostgreSQL instance configured via `DATABASE_URL` (plus `JWT_SECRET`),
/// so they are ignored by default:
///
/// ```bash
/// cargo test -p taskforge-api -- --ignored
/// ```

mod common;

use axum::http::StatusCode;
use common::{json_request, response_json, TestContext};
use serde_json::json;
use tower::Service as _;

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_project_crud_lifecycle() {
    let ctx = TestContext::new().await.unwrap();

    // Create
    let request = json_request(
        "POST",
        "/v1/projects",
        &ctx.auth_header(),
        Some(json!({ "name": "Website Redesign", "description": "Q3 work" })),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["message"], "Project created successfully");
    assert_eq!(body["data"]["status"], "active");
    assert_eq!(body["data"]["tasks_count"], 0);
    let project_id = body["data"]["id"].as_str().unwrap().to_string();

    // Show returns the bare resource
    let request = json_request(
        "GET",
        &format!("/v1/projects/{}", project_id),
        &ctx.auth_header(),
        None,
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["name"], "Website Redesign");

    // Partial update leaves omitted fields alone
    let request = json_request(
        "PATCH",
        &format!("/v1/projects/{}", project_id),
        &ctx.auth_header(),
        Some(json!({ "status": "completed" })),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["name"], "Website Redesign");

    // Delete
    let request = json_request(
        "DELETE",
        &format!("/v1/projects/{}", project_id),
        &ctx.auth_header(),
        None,
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = json_request(
        "GET",
        &format!("/v1/projects/{}", project_id),
        &ctx.auth_header(),
        None,
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_project_ownership_is_enforced() {
    let ctx = TestContext::new().await.unwrap();

    // Admin creates a project; the member must not reach it
    let request = json_request(
        "POST",
        "/v1/projects",
        &ctx.admin_header(),
        Some(json!({ "name": "Admin Project" })),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let project_id = body["data"]["id"].as_str().unwrap().to_string();

    // There is no admin bypass either way: ownership is per-user
    let request = json_request(
        "GET",
        &format!("/v1/projects/{}", project_id),
        &ctx.auth_header(),
        None,
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A missing project is 404 even for a caller who owns nothing
    let request = json_request(
        "GET",
        &format!("/v1/projects/{}", uuid::Uuid::new_v4()),
        &ctx.auth_header(),
        None,
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_validation_reports_all_fields_together() {
    let ctx = TestContext::new().await.unwrap();

    let request = json_request(
        "POST",
        "/v1/projects",
        &ctx.auth_header(),
        Some(json!({ "name": "", "description": "d".repeat(2001) })),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response_json(response).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"].as_array().unwrap().len(), 2);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_task_tag_sync_distinguishes_absent_from_empty() {
    let ctx = TestContext::new().await.unwrap();

    // Project to hold the task
    let request = json_request(
        "POST",
        "/v1/projects",
        &ctx.auth_header(),
        Some(json!({ "name": "Tagging" })),
    );
    let body = response_json(ctx.app.clone().call(request).await.unwrap()).await;
    let project_id = body["data"]["id"].as_str().unwrap().to_string();

    // Two tags created by the admin
    let mut tag_ids = Vec::new();
    for name in ["backend", "frontend"] {
        let request = json_request(
            "POST",
            "/v1/tags",
            &ctx.admin_header(),
            Some(json!({ "name": format!("{}-{}", name, uuid::Uuid::new_v4()) })),
        );
        let body = response_json(ctx.app.clone().call(request).await.unwrap()).await;
        tag_ids.push(body["data"]["id"].as_str().unwrap().to_string());
    }

    // Create with both tags
    let request = json_request(
        "POST",
        &format!("/v1/projects/{}/tasks", project_id),
        &ctx.auth_header(),
        Some(json!({ "title": "Wire it up", "tag_ids": tag_ids })),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let task_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["tags"].as_array().unwrap().len(), 2);

    // A patch without tag_ids leaves the associations alone
    let request = json_request(
        "PATCH",
        &format!("/v1/projects/{}/tasks/{}", project_id, task_id),
        &ctx.auth_header(),
        Some(json!({ "status": "in_progress" })),
    );
    let body = response_json(ctx.app.clone().call(request).await.unwrap()).await;
    assert_eq!(body["data"]["tags"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["status"], "in_progress");

    // An explicit empty list clears them
    let request = json_request(
        "PATCH",
        &format!("/v1/projects/{}/tasks/{}", project_id, task_id),
        &ctx.auth_header(),
        Some(json!({ "tag_ids": [] })),
    );
    let body = response_json(ctx.app.clone().call(request).await.unwrap()).await;
    assert_eq!(body["data"]["tags"].as_array().unwrap().len(), 0);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_task_must_belong_to_path_project() {
    let ctx = TestContext::new().await.unwrap();

    // Two projects, one task in the first
    let mut project_ids = Vec::new();
    for name in ["First", "Second"] {
        let request = json_request(
            "POST",
            "/v1/projects",
            &ctx.auth_header(),
            Some(json!({ "name": name })),
        );
        let body = response_json(ctx.app.clone().call(request).await.unwrap()).await;
        project_ids.push(body["data"]["id"].as_str().unwrap().to_string());
    }

    let request = json_request(
        "POST",
        &format!("/v1/projects/{}/tasks", project_ids[0]),
        &ctx.auth_header(),
        Some(json!({ "title": "Misrouted" })),
    );
    let body = response_json(ctx.app.clone().call(request).await.unwrap()).await;
    let task_id = body["data"]["id"].as_str().unwrap().to_string();

    // Reaching the task through the wrong project is forbidden even
    // though the caller owns both
    let request = json_request(
        "GET",
        &format!("/v1/projects/{}/tasks/{}", project_ids[1], task_id),
        &ctx.auth_header(),
        None,
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_tag_writes_require_admin() {
    let ctx = TestContext::new().await.unwrap();

    let request = json_request(
        "POST",
        "/v1/tags",
        &ctx.auth_header(),
        Some(json!({ "name": format!("nope-{}", uuid::Uuid::new_v4()) })),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = response_json(response).await;
    assert_eq!(body["message"], "Forbidden. Admin access required.");

    // Reads stay open to members
    let request = json_request("GET", "/v1/tags", &ctx.auth_header(), None);
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_register_and_login_flow() {
    let ctx = TestContext::new().await.unwrap();

    let email = format!("flow-{}@example.com", uuid::Uuid::new_v4());
    let request = json_request(
        "POST",
        "/v1/auth/register",
        "",
        Some(json!({
            "name": "Flow Tester",
            "email": &email,
            "password": "a-long-password"
        })),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["user"]["role"], "member");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["access_token"].is_string());

    // Registering the same email again is a validation failure, not a 500
    let request = json_request(
        "POST",
        "/v1/auth/register",
        "",
        Some(json!({
            "name": "Flow Tester",
            "email": &email,
            "password": "a-long-password"
        })),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(body["details"][0]["field"], "email");

    // Login with the same credentials
    let request = json_request(
        "POST",
        "/v1/auth/login",
        "",
        Some(json!({ "email": &email, "password": "a-long-password" })),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let token = body["access_token"].as_str().unwrap().to_string();

    // The token authenticates /me
    let request = json_request("GET", "/v1/auth/me", &format!("Bearer {}", token), None);
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A bad password is rejected without saying which part was wrong
    let request = json_request(
        "POST",
        "/v1/auth/login",
        "",
        Some(json!({ "email": &email, "password": "wrong-password" })),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_requests_without_token_are_unauthorized() {
    let ctx = TestContext::new().await.unwrap();

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/v1/projects")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_dashboard_admin_section() {
    let ctx = TestContext::new().await.unwrap();

    // Member dashboard has no admin section
    let request = json_request("GET", "/v1/dashboard", &ctx.auth_header(), None);
    let body = response_json(ctx.app.clone().call(request).await.unwrap()).await;
    assert!(body.get("admin").is_none());
    assert!(body["recent_tasks"].is_array());

    // Admin dashboard carries system-wide totals
    let request = json_request("GET", "/v1/dashboard", &ctx.admin_header(), None);
    let body = response_json(ctx.app.clone().call(request).await.unwrap()).await;
    assert!(body["admin"]["total_users"].as_i64().unwrap() >= 2);

    ctx.cleanup().await.unwrap();
}
