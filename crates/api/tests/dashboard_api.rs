mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json, put_json, seed_user};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_kanban_and_summary(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Aisha", "aisha@pmo.test", "USER").await;
    let app = common::build_test_app(pool);

    for body in [
        json!({ "title": "A", "status": "Execution", "percentage": 40, "budget": 1000, "awardAmount": 800 }),
        json!({ "title": "B", "status": "Execution", "percentage": 60 }),
        json!({ "title": "C", "percentage": 100, "budget": 500 }),
    ] {
        let response = post_json(app.clone(), "/api/projects", Some(&token), body).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    let archived = body_json(
        post_json(app.clone(), "/api/projects", Some(&token), json!({ "title": "Old" })).await,
    )
    .await;
    put_json(
        app.clone(),
        &format!("/api/projects/{}", archived["id"]),
        Some(&token),
        json!({ "isArchived": true }),
    )
    .await;

    let board = body_json(get(app.clone(), "/api/dashboard/kanban").await).await;
    let columns = board["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 6);
    assert_eq!(columns[0]["status"], "Possible");
    assert_eq!(columns[0]["items"].as_array().unwrap().len(), 1);
    assert_eq!(columns[3]["status"], "Execution");
    assert_eq!(columns[3]["items"].as_array().unwrap().len(), 2);
    assert!(board["unrecognized"].as_array().unwrap().is_empty());

    let summary = body_json(get(app, "/api/dashboard/summary").await).await;
    assert_eq!(summary["total"], 4);
    assert_eq!(summary["active"], 3);
    assert_eq!(summary["archived"], 1);
    assert_eq!(summary["byStatus"]["Execution"], 2);
    assert_eq!(summary["totalBudget"], 1500.0);
    assert_eq!(summary["totalSavingsOMR"], 200.0);
    assert_eq!(summary["averagePercentage"], 66.67);
}
