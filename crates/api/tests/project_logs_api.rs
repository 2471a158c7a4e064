//! Manual log entries and log deletion over HTTP.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json, seed_user};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn new_project(app: axum::Router, token: &str) -> i64 {
    let response = post_json(app, "/api/projects", Some(token), json!({ "title": "Clinic" })).await;
    body_json(response).await["id"].as_i64().unwrap()
}

async fn log_list(app: axum::Router, id: i64) -> Vec<Value> {
    body_json(get(app, &format!("/api/projects/{id}/logs")).await)
        .await
        .as_array()
        .unwrap()
        .clone()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_add_note(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Aisha", "aisha@pmo.test", "USER").await;
    let app = common::build_test_app(pool);
    let id = new_project(app.clone(), &token).await;

    let response = post_json(
        app.clone(),
        &format!("/api/projects/{id}/logs"),
        Some(&token),
        json!({ "note": "Vendor confirmed delivery" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let log = body_json(response).await;
    assert_eq!(log["action"], "NOTE_ADDED");
    assert_eq!(log["note"], "Vendor confirmed delivery");
    assert_eq!(log["createdByName"], "Aisha");

    let entries = log_list(app, id).await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["id"], log["id"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_add_log_validation(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Aisha", "aisha@pmo.test", "USER").await;
    let app = common::build_test_app(pool);
    let id = new_project(app.clone(), &token).await;
    let uri = format!("/api/projects/{id}/logs");

    let no_note = post_json(app.clone(), &uri, Some(&token), json!({})).await;
    assert_eq!(no_note.status(), StatusCode::BAD_REQUEST);

    let bad_action =
        post_json(app.clone(), &uri, Some(&token), json!({ "action": "RENAMED" })).await;
    assert_eq!(bad_action.status(), StatusCode::BAD_REQUEST);

    let anonymous = post_json(app, &uri, None, json!({ "note": "hi" })).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_logs_of_missing_project_are_404(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Aisha", "aisha@pmo.test", "USER").await;
    let app = common::build_test_app(pool);

    assert_eq!(
        get(app.clone(), "/api/projects/777/logs").await.status(),
        StatusCode::NOT_FOUND
    );
    let response = post_json(
        app,
        "/api/projects/777/logs",
        Some(&token),
        json!({ "note": "orphan" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_single_log_is_scoped_to_project(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Aisha", "aisha@pmo.test", "USER").await;
    let app = common::build_test_app(pool);
    let first = new_project(app.clone(), &token).await;
    let second = new_project(app.clone(), &token).await;

    let entry = log_list(app.clone(), first).await[0]["id"].as_i64().unwrap();

    let wrong_project = delete(
        app.clone(),
        &format!("/api/projects/{second}/logs?logId={entry}"),
        Some(&token),
    )
    .await;
    assert_eq!(wrong_project.status(), StatusCode::NOT_FOUND);

    let removed = delete(
        app.clone(),
        &format!("/api/projects/{first}/logs?logId={entry}"),
        Some(&token),
    )
    .await;
    assert_eq!(removed.status(), StatusCode::NO_CONTENT);
    assert!(log_list(app, first).await.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_all_logs_reports_each_entry(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Aisha", "aisha@pmo.test", "USER").await;
    let app = common::build_test_app(pool);
    let id = new_project(app.clone(), &token).await;
    let uri = format!("/api/projects/{id}/logs");

    for note in ["one", "two"] {
        post_json(app.clone(), &uri, Some(&token), json!({ "note": note })).await;
    }

    let response = delete(app.clone(), &uri, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["matched"], 3);
    assert_eq!(report["applied"], 3);
    assert_eq!(report["failed"].as_array().unwrap().len(), 0);

    assert!(log_list(app, id).await.is_empty());
}
