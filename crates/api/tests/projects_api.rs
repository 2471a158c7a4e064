//! Project CRUD, archive views, savings derivation, and change logging
//! over HTTP.

mod common;

use axum::http::StatusCode;
use chrono::{DateTime, SubsecRound, Utc};
use common::{body_json, delete, get, post_json, put_json, seed_user};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn create_project(app: axum::Router, token: &str, body: Value) -> Value {
    let response = post_json(app, "/api/projects", Some(token), body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn logs(app: axum::Router, id: i64) -> Vec<Value> {
    let response = get(app, &format!("/api/projects/{id}/logs")).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await.as_array().unwrap().clone()
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_requires_auth(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/projects", None, json!({ "title": "X" })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_applies_defaults_and_derives_savings(pool: PgPool) {
    let (user, token) = seed_user(&pool, "Aisha", "aisha@pmo.test", "USER").await;
    let app = common::build_test_app(pool);

    let project = create_project(
        app.clone(),
        &token,
        json!({
            "title": "  Fleet renewal ",
            "budget": "1,000",
            "awardAmount": 800,
            "savingsOMR": 999,
            "startDate": "2024-03-15",
            "completionDate": { "seconds": 1_735_689_600, "nanoseconds": 0 }
        }),
    )
    .await;

    assert_eq!(project["title"], "Fleet renewal");
    assert_eq!(project["status"], "Possible");
    assert_eq!(project["percentage"], 0);
    assert_eq!(project["savingsOMR"], 200.0);
    assert_eq!(project["savingsPercentage"], 20.0);
    assert_eq!(project["isArchived"], false);
    assert_eq!(project["createdBy"], user.id);
    assert!(project["startDate"].as_str().unwrap().starts_with("2024-03-15"));
    assert!(project["completionDate"].as_str().unwrap().starts_with("2025-01-01"));

    let id = project["id"].as_i64().unwrap();
    let entries = logs(app, id).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["action"], "PROJECT_CREATED");
    assert_eq!(entries[0]["description"], "Project \"Fleet renewal\" was created");
    assert_eq!(entries[0]["createdBy"], user.id);
    assert_eq!(entries[0]["createdByName"], "Aisha");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_validation_errors(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Aisha", "aisha@pmo.test", "USER").await;
    let app = common::build_test_app(pool);

    for body in [
        json!({ "title": "   " }),
        json!({ "title": "X", "status": "Cancelled" }),
        json!({ "title": "X", "percentage": 140 }),
        json!({ "title": "X", "budget": -5 }),
        json!({ "title": "X", "departmentId": 999_999 }),
    ] {
        let response = post_json(app.clone(), "/api/projects", Some(&token), body.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        let json = body_json(response).await;
        assert_eq!(json["code"], "VALIDATION_ERROR", "body: {body}");
    }

    let response = post_json(
        app,
        "/api/projects",
        Some(&token),
        json!({ "title": "X", "budget": "plenty" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_missing_project_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/projects/424242").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_by_status(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Aisha", "aisha@pmo.test", "USER").await;
    let app = common::build_test_app(pool);

    create_project(app.clone(), &token, json!({ "title": "A", "status": "Execution" })).await;
    create_project(app.clone(), &token, json!({ "title": "B" })).await;

    let all = body_json(get(app.clone(), "/api/projects").await).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let executing = body_json(get(app, "/api/projects?status=Execution").await).await;
    let executing = executing.as_array().unwrap();
    assert_eq!(executing.len(), 1);
    assert_eq!(executing[0]["title"], "A");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unparseable_date_is_stored_as_unknown(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Aisha", "aisha@pmo.test", "USER").await;
    let app = common::build_test_app(pool);

    let project = create_project(
        app,
        &token,
        json!({ "title": "Clinic", "startDate": "whenever", "completionDate": "2025-01-01" }),
    )
    .await;

    assert!(project["startDate"].is_null());
    assert!(project["completionDate"]
        .as_str()
        .unwrap()
        .starts_with("2025-01-01"));
}

// ---------------------------------------------------------------------------
// Update and change logging
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_change_records_single_log(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Aisha", "aisha@pmo.test", "USER").await;
    let app = common::build_test_app(pool);

    let project = create_project(app.clone(), &token, json!({ "title": "Clinic" })).await;
    let id = project["id"].as_i64().unwrap();

    let started = Utc::now().trunc_subsecs(6);
    let response = put_json(
        app.clone(),
        &format!("/api/projects/{id}"),
        Some(&token),
        json!({ "status": "scoping", "budget": 5000 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["status"], "Scoping");
    assert_eq!(updated["budget"], 5000.0);

    let entries = logs(app, id).await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["action"], "STATUS_CHANGE");
    assert_eq!(
        entries[0]["description"],
        "Status changed from \"Possible\" to \"Scoping\""
    );
    assert_eq!(entries[0]["changes"]["status"]["from"]["value"], "Possible");
    assert_eq!(entries[0]["changes"]["status"]["to"]["value"], "Scoping");
    assert!(entries[0]["changes"].get("budget").is_none());

    let logged_at = DateTime::parse_from_rfc3339(entries[0]["createdAt"].as_str().unwrap())
        .unwrap()
        .with_timezone(&Utc);
    assert!(logged_at >= started);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_significant_field_change_is_logged(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Aisha", "aisha@pmo.test", "USER").await;
    let app = common::build_test_app(pool);

    let project =
        create_project(app.clone(), &token, json!({ "title": "Clinic", "budget": 100 })).await;
    let id = project["id"].as_i64().unwrap();

    put_json(
        app.clone(),
        &format!("/api/projects/{id}"),
        Some(&token),
        json!({ "budget": 250, "description": "new scope" }),
    )
    .await;

    let entries = logs(app, id).await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["action"], "PROJECT_UPDATED");
    assert_eq!(entries[0]["description"], "Updated Budget");
    assert_eq!(entries[0]["changes"]["budget"]["from"]["value"], 100.0);
    assert_eq!(entries[0]["changes"]["budget"]["to"]["value"], 250.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_untracked_change_writes_no_log(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Aisha", "aisha@pmo.test", "USER").await;
    let app = common::build_test_app(pool);

    let project = create_project(app.clone(), &token, json!({ "title": "Clinic" })).await;
    let id = project["id"].as_i64().unwrap();

    let response = put_json(
        app.clone(),
        &format!("/api/projects/{id}"),
        Some(&token),
        json!({ "description": "only prose changed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(logs(app, id).await.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_rederives_savings_from_stored_budget(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Aisha", "aisha@pmo.test", "USER").await;
    let app = common::build_test_app(pool);

    let project =
        create_project(app.clone(), &token, json!({ "title": "Clinic", "budget": 1000 })).await;
    let id = project["id"].as_i64().unwrap();
    assert!(project["savingsOMR"].is_null());

    let updated = body_json(
        put_json(
            app,
            &format!("/api/projects/{id}"),
            Some(&token),
            json!({ "awardAmount": "800" }),
        )
        .await,
    )
    .await;
    assert_eq!(updated["savingsOMR"], 200.0);
    assert_eq!(updated["savingsPercentage"], 20.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_null_date_clears_it(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Aisha", "aisha@pmo.test", "USER").await;
    let app = common::build_test_app(pool);

    let project = create_project(
        app.clone(),
        &token,
        json!({ "title": "Clinic", "startDate": "2024-03-15" }),
    )
    .await;
    let id = project["id"].as_i64().unwrap();

    let untouched = body_json(
        put_json(
            app.clone(),
            &format!("/api/projects/{id}"),
            Some(&token),
            json!({ "percentage": 10 }),
        )
        .await,
    )
    .await;
    assert!(untouched["startDate"].is_string());

    let cleared = body_json(
        put_json(
            app,
            &format!("/api/projects/{id}"),
            Some(&token),
            json!({ "startDate": null }),
        )
        .await,
    )
    .await;
    assert!(cleared["startDate"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_null_clears_award_and_savings(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Aisha", "aisha@pmo.test", "USER").await;
    let app = common::build_test_app(pool);

    let project = create_project(
        app.clone(),
        &token,
        json!({
            "title": "Clinic",
            "budget": 1000,
            "awardAmount": 800,
            "opdFocal": "Salim",
            "subStatus": "RFQ"
        }),
    )
    .await;
    let id = project["id"].as_i64().unwrap();
    assert_eq!(project["savingsOMR"], 200.0);

    let response = put_json(
        app,
        &format!("/api/projects/{id}"),
        Some(&token),
        json!({
            "title": "Clinic",
            "budget": 1000,
            "awardAmount": null,
            "opdFocal": null,
            "subStatus": null
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;

    assert_eq!(updated["budget"], 1000.0);
    assert!(updated["awardAmount"].is_null());
    assert!(updated["savingsOMR"].is_null());
    assert!(updated["savingsPercentage"].is_null());
    assert!(updated["opdFocal"].is_null());
    assert!(updated["subStatus"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_missing_project_is_404(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Aisha", "aisha@pmo.test", "USER").await;
    let app = common::build_test_app(pool);
    let response = put_json(app, "/api/projects/9999", Some(&token), json!({ "title": "X" })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Archive views
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_archive_moves_project_between_views(pool: PgPool) {
    let (user, token) = seed_user(&pool, "Aisha", "aisha@pmo.test", "USER").await;
    let app = common::build_test_app(pool);

    let keep = create_project(app.clone(), &token, json!({ "title": "Keep" })).await;
    let old = create_project(app.clone(), &token, json!({ "title": "Old" })).await;
    let old_id = old["id"].as_i64().unwrap();

    let archived = body_json(
        put_json(
            app.clone(),
            &format!("/api/projects/{old_id}"),
            Some(&token),
            json!({ "isArchived": true }),
        )
        .await,
    )
    .await;
    assert_eq!(archived["isArchived"], true);
    assert!(archived["archivedAt"].is_string());
    assert_eq!(archived["archivedBy"], user.id);

    let active = body_json(get(app.clone(), "/api/projects/active").await).await;
    let active = active.as_array().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["id"], keep["id"]);

    let archive = body_json(get(app.clone(), "/api/projects/archived").await).await;
    let archive = archive.as_array().unwrap();
    assert_eq!(archive.len(), 1);
    assert_eq!(archive[0]["id"], old_id);

    let restored = body_json(
        put_json(
            app,
            &format!("/api/projects/{old_id}"),
            Some(&token),
            json!({ "isArchived": false }),
        )
        .await,
    )
    .await;
    assert!(restored["archivedAt"].is_null());
    assert!(restored["archivedBy"].is_null());
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_project(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Aisha", "aisha@pmo.test", "USER").await;
    let app = common::build_test_app(pool);

    let project = create_project(app.clone(), &token, json!({ "title": "Temp" })).await;
    let id = project["id"].as_i64().unwrap();
    let uri = format!("/api/projects/{id}");

    assert_eq!(delete(app.clone(), &uri, None).await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(delete(app.clone(), &uri, Some(&token)).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(get(app.clone(), &uri).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(delete(app, &uri, Some(&token)).await.status(), StatusCode::NOT_FOUND);
}
