//! Handlers for the `/projects` resource.
//!
//! Every successful create or update records at most one change-log entry.
//! The log insert is a separate statement from the project write; if it
//! fails the project change stands and the failure is logged.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use pmo_core::change_log::{plan_update_log, Actor, LogDraft};
use pmo_core::error::CoreError;
use pmo_core::patch;
use pmo_core::project::{derive_savings, partition_archived, ProjectStatus};
use pmo_core::types::DbId;
use pmo_core::validation::{validate_amount, validate_percentage, validate_title, FieldError};
use pmo_db::models::project::{CreateProject, Project, ProjectFilter, UpdateProject};
use pmo_db::repositories::{ProjectLogRepo, ProjectRepo};
use pmo_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Input normalization
// ---------------------------------------------------------------------------

/// Validate a create payload and fill in server-derived fields.
///
/// Shared by single create and bulk import so both apply identical rules.
pub(crate) fn prepare_create(mut input: CreateProject) -> Result<CreateProject, FieldError> {
    input.title = input.title.trim().to_string();
    validate_title(&input.title)?;

    input.status = input.status.as_deref().map(canonical_status).transpose()?;
    if let Some(p) = input.percentage {
        validate_percentage(p)?;
    }
    if let Some(b) = input.budget {
        validate_amount("budget", b)?;
    }
    if let Some(a) = input.award_amount {
        validate_amount("awardAmount", a)?;
    }
    input.opd_focal = trimmed(input.opd_focal);
    input.department = trimmed(input.department);

    if let Some(savings) = derive_savings(input.budget, input.award_amount) {
        input.savings_omr = Some(savings.omr);
        input.savings_percentage = Some(savings.percentage);
    }
    Ok(input)
}

/// Validate an update payload against the stored row.
///
/// Savings are re-derived from the effective budget and award: the incoming
/// value when the field is sent (including an explicit `null`), the stored
/// one otherwise. Clearing either input clears both savings columns.
pub(crate) fn prepare_update(
    existing: &Project,
    mut input: UpdateProject,
) -> Result<UpdateProject, FieldError> {
    if let Some(title) = input.title.as_deref() {
        let title = title.trim().to_string();
        validate_title(&title)?;
        input.title = Some(title);
    }

    input.status = input.status.as_deref().map(canonical_status).transpose()?;
    if let Some(p) = input.percentage {
        validate_percentage(p)?;
    }
    if let Some(&b) = patch::value(&input.budget) {
        validate_amount("budget", b)?;
    }
    if let Some(&a) = patch::value(&input.award_amount) {
        validate_amount("awardAmount", a)?;
    }
    input.opd_focal = input.opd_focal.map(trimmed);
    input.department = input.department.map(trimmed);

    let budget = input.budget.unwrap_or(existing.budget);
    let award = input.award_amount.unwrap_or(existing.award_amount);
    match derive_savings(budget, award) {
        Some(savings) => {
            input.savings_omr = Some(Some(savings.omr));
            input.savings_percentage = Some(Some(savings.percentage));
        }
        None if patch::is_cleared(&input.budget) || patch::is_cleared(&input.award_amount) => {
            input.savings_omr = Some(None);
            input.savings_percentage = Some(None);
        }
        None => {}
    }
    Ok(input)
}

fn canonical_status(raw: &str) -> Result<String, FieldError> {
    raw.parse::<ProjectStatus>()
        .map(|s| s.as_str().to_string())
        .map_err(|msg| FieldError::new("status", msg))
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Insert a log entry without failing the surrounding request.
pub(crate) async fn record_best_effort(
    pool: &DbPool,
    project_id: DbId,
    draft: &LogDraft,
    actor: &Actor,
) {
    if let Err(e) = ProjectLogRepo::record(pool, project_id, draft, actor).await {
        tracing::warn!(
            project_id,
            action = %draft.action,
            error = %e,
            "Project changed but its log entry could not be written"
        );
    }
}

fn snapshot(project: &Project) -> AppResult<serde_json::Value> {
    serde_json::to_value(project)
        .map_err(|e| AppError::InternalError(format!("Failed to serialize project: {e}")))
}

async fn load(pool: &DbPool, id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Project", id)))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/projects
///
/// Optional `?department=&status=` equality filters.
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ProjectFilter>,
) -> AppResult<Json<Vec<Project>>> {
    let projects = ProjectRepo::list(&state.pool, &filter).await?;
    Ok(Json(projects))
}

/// GET /api/projects/active
pub async fn list_active(State(state): State<AppState>) -> AppResult<Json<Vec<Project>>> {
    let all = ProjectRepo::list(&state.pool, &ProjectFilter::default()).await?;
    let (active, _) = partition_archived(all);
    Ok(Json(active))
}

/// GET /api/projects/archived
pub async fn list_archived(State(state): State<AppState>) -> AppResult<Json<Vec<Project>>> {
    let all = ProjectRepo::list(&state.pool, &ProjectFilter::default()).await?;
    let (_, archived) = partition_archived(all);
    Ok(Json(archived))
}

/// GET /api/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    Ok(Json(load(&state.pool, id).await?))
}

/// POST /api/projects
///
/// Creates the project and records a `PROJECT_CREATED` entry.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let actor = auth.actor(&state.pool).await?;
    let input = prepare_create(input)?;

    let project = ProjectRepo::create(&state.pool, &input, Some(actor.id)).await?;
    tracing::info!(project_id = project.id, user_id = actor.id, "Project created");

    record_best_effort(&state.pool, project.id, &LogDraft::created(&project.title), &actor).await;
    Ok((StatusCode::CREATED, Json(project)))
}

/// PUT /api/projects/{id}
///
/// Loads the current row first (404 if missing), applies the update, then
/// records the single most significant change, if any.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateProject>,
) -> AppResult<Json<Project>> {
    let actor = auth.actor(&state.pool).await?;
    let existing = load(&state.pool, id).await?;
    let input = prepare_update(&existing, input)?;

    let updated = ProjectRepo::update(&state.pool, id, &input, actor.id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Project", id)))?;

    if let Some(draft) = plan_update_log(&snapshot(&existing)?, &snapshot(&updated)?) {
        tracing::info!(project_id = id, action = %draft.action, "Project updated");
        record_best_effort(&state.pool, id, &draft, &actor).await;
    }
    Ok(Json(updated))
}

/// DELETE /api/projects/{id}
///
/// Hard delete; the project's log entries are removed with it.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ProjectRepo::delete(&state.pool, id).await? {
        tracing::info!(project_id = id, user_id = auth.user_id, "Project deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::not_found("Project", id)))
    }
}
