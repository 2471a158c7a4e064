//! Handlers for the `/departments` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use pmo_core::error::CoreError;
use pmo_core::types::DbId;
use pmo_core::validation::{require_text, validate_amount, FieldError, MAX_NAME_LENGTH};
use pmo_db::models::department::{CreateDepartment, DeleteOutcome, Department, UpdateDepartment};
use pmo_db::repositories::DepartmentRepo;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::rbac::RequireManager;
use crate::state::AppState;

fn validate_fields(name: Option<&str>, budget: Option<f64>) -> Result<(), FieldError> {
    if let Some(name) = name {
        require_text("name", name, MAX_NAME_LENGTH)?;
    }
    if let Some(budget) = budget {
        validate_amount("budget", budget)?;
    }
    Ok(())
}

/// GET /api/departments
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Department>>> {
    Ok(Json(DepartmentRepo::list(&state.pool).await?))
}

/// GET /api/departments/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Department>> {
    let department = DepartmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Department", id)))?;
    Ok(Json(department))
}

/// POST /api/departments
pub async fn create(
    State(state): State<AppState>,
    RequireManager(admin): RequireManager,
    AppJson(input): AppJson<CreateDepartment>,
) -> AppResult<(StatusCode, Json<Department>)> {
    validate_fields(Some(&input.name), input.budget)?;
    let department = DepartmentRepo::create(&state.pool, &input).await?;
    tracing::info!(department_id = department.id, created_by = admin.user_id, "Department created");
    Ok((StatusCode::CREATED, Json(department)))
}

/// PUT /api/departments/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireManager(admin): RequireManager,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateDepartment>,
) -> AppResult<Json<Department>> {
    validate_fields(input.name.as_deref(), input.budget)?;
    let department = DepartmentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Department", id)))?;
    tracing::info!(department_id = id, updated_by = admin.user_id, "Department updated");
    Ok(Json(department))
}

/// DELETE /api/departments/{id}
///
/// Refused with 409 while any user or project still references it.
pub async fn delete(
    State(state): State<AppState>,
    RequireManager(admin): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    match DepartmentRepo::delete_checked(&state.pool, id).await? {
        DeleteOutcome::Deleted => {
            tracing::info!(department_id = id, deleted_by = admin.user_id, "Department deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        DeleteOutcome::NotFound => Err(AppError::Core(CoreError::not_found("Department", id))),
        DeleteOutcome::HasDependents { users, projects } => {
            Err(AppError::Core(CoreError::Conflict(format!(
                "Department is still referenced by {users} user(s) and {projects} project(s)"
            ))))
        }
    }
}
