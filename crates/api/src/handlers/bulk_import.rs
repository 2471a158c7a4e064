//! Handler for `POST /projects/bulk-import`.
//!
//! Rows are created one at a time. A bad row is reported and skipped; the
//! rows before and after it are unaffected.

use axum::extract::State;
use axum::Json;
use pmo_core::change_log::{Actor, LogDraft};
use pmo_core::types::DbId;
use pmo_db::models::project::CreateProject;
use pmo_db::repositories::ProjectRepo;
use pmo_db::DbPool;
use serde::Serialize;
use serde_json::Value;

use crate::error::{classify_sqlx_error, AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::project::{prepare_create, record_best_effort};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Largest batch accepted in one request.
pub const MAX_IMPORT_ROWS: usize = 500;

/// Outcome for one input row, keyed by its position in the request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRowResult {
    pub index: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<ImportRowResult>,
}

async fn import_row(pool: &DbPool, row: Value, actor: &Actor) -> Result<DbId, String> {
    let input: CreateProject = serde_json::from_value(row).map_err(|e| e.to_string())?;
    let input = prepare_create(input).map_err(|e| e.to_string())?;

    let project = ProjectRepo::create(pool, &input, Some(actor.id))
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Bulk import row failed to insert");
            let (_, _, message) = classify_sqlx_error(&e);
            message
        })?;

    record_best_effort(pool, project.id, &LogDraft::created(&project.title), actor).await;
    Ok(project.id)
}

/// POST /api/projects/bulk-import
///
/// Body is a JSON array of project objects. Always 200 once the batch is
/// accepted; per-row failures are in `results`.
pub async fn bulk_import(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(rows): AppJson<Vec<Value>>,
) -> AppResult<Json<ImportReport>> {
    if rows.len() > MAX_IMPORT_ROWS {
        return Err(AppError::BadRequest(format!(
            "At most {MAX_IMPORT_ROWS} rows may be imported at once, got {}",
            rows.len()
        )));
    }
    let actor = auth.actor(&state.pool).await?;

    let total = rows.len();
    let mut results = Vec::with_capacity(total);
    for (index, row) in rows.into_iter().enumerate() {
        let result = match import_row(&state.pool, row, &actor).await {
            Ok(id) => ImportRowResult {
                index,
                success: true,
                id: Some(id),
                error: None,
            },
            Err(error) => ImportRowResult {
                index,
                success: false,
                id: None,
                error: Some(error),
            },
        };
        results.push(result);
    }

    let succeeded = results.iter().filter(|r| r.success).count();
    tracing::info!(user_id = actor.id, total, succeeded, "Bulk import finished");

    Ok(Json(ImportReport {
        total,
        succeeded,
        failed: total - succeeded,
        results,
    }))
}
