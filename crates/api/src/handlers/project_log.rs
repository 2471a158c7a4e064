//! Handlers for `/projects/{id}/logs`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pmo_core::change_log::{changes_from_json, Changes, LogAction, LogDraft};
use pmo_core::error::CoreError;
use pmo_core::types::DbId;
use pmo_core::validation::{require_text, validate_note, FieldError, MAX_TITLE_LENGTH};
use pmo_db::models::project_log::{CreateProjectLog, DeleteLogsQuery, ProjectLog};
use pmo_db::repositories::{ProjectLogRepo, ProjectRepo};
use pmo_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

async fn ensure_project(pool: &DbPool, project_id: DbId) -> AppResult<()> {
    match ProjectRepo::find_by_id(pool, project_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::Core(CoreError::not_found("Project", project_id))),
    }
}

/// Turn a hand-written log request into a draft.
///
/// A `NOTE_ADDED` entry needs a non-blank note. The description falls back to
/// a generic sentence for the action when omitted.
fn draft_from_request(input: CreateProjectLog) -> Result<LogDraft, FieldError> {
    let action = match input.action.as_deref() {
        None => LogAction::NoteAdded,
        Some(raw) => raw
            .parse::<LogAction>()
            .map_err(|msg| FieldError::new("action", msg))?,
    };

    let note = input
        .note
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    match (&note, action) {
        (Some(n), _) => validate_note(n)?,
        (None, LogAction::NoteAdded) => return Err(FieldError::new("note", "is required")),
        (None, _) => {}
    }

    let changes = match input.changes {
        None | Some(serde_json::Value::Null) => Changes::new(),
        Some(raw) => changes_from_json(&raw).map_err(|msg| FieldError::new("changes", msg))?,
    };

    let description = match input.description.map(|d| d.trim().to_string()) {
        Some(d) if !d.is_empty() => {
            require_text("description", &d, MAX_TITLE_LENGTH)?;
            d
        }
        _ => default_description(action).to_string(),
    };

    Ok(LogDraft {
        action,
        description,
        changes,
        note,
    })
}

fn default_description(action: LogAction) -> &'static str {
    match action {
        LogAction::StatusChange => "Status changed",
        LogAction::SubstatusChange => "Sub-status changed",
        LogAction::NoteAdded => "Note added",
        LogAction::ProjectCreated => "Project created",
        LogAction::ProjectUpdated => "Project updated",
    }
}

/// GET /api/projects/{id}/logs
///
/// Newest first.
pub async fn list(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Vec<ProjectLog>>> {
    ensure_project(&state.pool, project_id).await?;
    let logs = ProjectLogRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(logs))
}

/// POST /api/projects/{id}/logs
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<DbId>,
    AppJson(input): AppJson<CreateProjectLog>,
) -> AppResult<(StatusCode, Json<ProjectLog>)> {
    let draft = draft_from_request(input)?;
    ensure_project(&state.pool, project_id).await?;
    let actor = auth.actor(&state.pool).await?;

    let log = ProjectLogRepo::record(&state.pool, project_id, &draft, &actor).await?;
    tracing::info!(project_id, log_id = log.id, action = %draft.action, "Log entry added");
    Ok((StatusCode::CREATED, Json(log)))
}

/// DELETE /api/projects/{id}/logs[?logId=]
///
/// With `logId`, removes that one entry (404 if it is not on this project)
/// and returns 204. Without it, removes every entry and returns the
/// per-entry report.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<DbId>,
    Query(query): Query<DeleteLogsQuery>,
) -> AppResult<Response> {
    ensure_project(&state.pool, project_id).await?;

    if let Some(log_id) = query.log_id {
        if !ProjectLogRepo::delete(&state.pool, project_id, log_id).await? {
            return Err(AppError::Core(CoreError::not_found("ProjectLog", log_id)));
        }
        tracing::info!(project_id, log_id, user_id = auth.user_id, "Log entry deleted");
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let report = ProjectLogRepo::delete_all_for_project(
        &state.pool,
        project_id,
        state.config.fanout_concurrency,
    )
    .await?;
    tracing::info!(
        project_id,
        user_id = auth.user_id,
        removed = report.applied,
        failed = report.failed.len(),
        "Project log cleared"
    );
    Ok(Json(report).into_response())
}
