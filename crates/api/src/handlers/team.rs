//! Handlers for the `/team` resource (user roster).
//!
//! Reads are open to any authenticated caller's UI; writes require a
//! manager role (ADMIN or PMO).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use pmo_core::error::CoreError;
use pmo_core::roles::Role;
use pmo_core::types::DbId;
use pmo_core::validation::{
    normalize_email, require_text, validate_email, FieldError, MAX_NAME_LENGTH,
};
use pmo_db::models::user::{CreateUser, UpdateUser, User, UserFilter, UserResponse};
use pmo_db::repositories::{ProjectRepo, UserRepo};
use serde::Deserialize;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::rbac::RequireManager;
use crate::state::AppState;

/// Request body for adding a team member.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Defaults to `USER`.
    pub role: Option<String>,
    pub department: Option<String>,
    pub department_id: Option<DbId>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub job_title: Option<String>,
}

pub(crate) fn validate_name(name: &str) -> Result<String, FieldError> {
    require_text("name", name, MAX_NAME_LENGTH)?;
    Ok(name.trim().to_string())
}

pub(crate) fn canonical_role(raw: &str) -> Result<String, FieldError> {
    raw.parse::<Role>()
        .map(|r| r.as_str().to_string())
        .map_err(|msg| FieldError::new("role", msg))
}

async fn ensure_email_free(state: &AppState, email: &str, except: Option<DbId>) -> AppResult<()> {
    match UserRepo::find_by_email(&state.pool, email).await? {
        Some(other) if Some(other.id) != except => Err(AppError::Core(CoreError::Conflict(
            format!("A user with email '{email}' already exists"),
        ))),
        _ => Ok(()),
    }
}

/// Validate and apply a user update, then propagate a name change to the
/// projects that name this user as focal person.
///
/// The propagation runs after the user row is committed. If it fails the
/// rename still stands and the failure is logged.
pub(crate) async fn apply_user_update(
    state: &AppState,
    id: DbId,
    mut input: UpdateUser,
) -> AppResult<User> {
    let existing = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("User", id)))?;

    if let Some(name) = input.name.as_deref() {
        input.name = Some(validate_name(name)?);
    }
    if let Some(email) = input.email.as_deref() {
        validate_email(email)?;
        let email = normalize_email(email);
        ensure_email_free(state, &email, Some(id)).await?;
        input.email = Some(email);
    }
    input.role = input.role.as_deref().map(canonical_role).transpose()?;

    let updated = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("User", id)))?;

    if updated.name != existing.name {
        match ProjectRepo::rename_focal_person(
            &state.pool,
            &existing.name,
            &updated.name,
            state.config.fanout_concurrency,
        )
        .await
        {
            Ok(report) if !report.is_complete() => tracing::warn!(
                user_id = id,
                failed = ?report.failed,
                "Some projects still carry the old focal person name"
            ),
            Ok(report) => tracing::info!(
                user_id = id,
                projects = report.applied,
                "Focal person renamed on projects"
            ),
            Err(e) => tracing::warn!(
                user_id = id,
                error = %e,
                "User renamed but project focal names were not updated"
            ),
        }
    }

    Ok(updated)
}

/// GET /api/team
///
/// Optional `?role=&departmentId=` filters.
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = UserRepo::list(&state.pool, &filter).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /api/team/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("User", id)))?;
    Ok(Json(user.into()))
}

/// POST /api/team
pub async fn create(
    State(state): State<AppState>,
    RequireManager(admin): RequireManager,
    AppJson(input): AppJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let name = validate_name(&input.name)?;
    validate_email(&input.email)?;
    let email = normalize_email(&input.email);
    let role = canonical_role(input.role.as_deref().unwrap_or(Role::User.as_str()))?;
    validate_password_strength(&input.password, state.config.min_password_length)
        .map_err(|msg| FieldError::new("password", msg))?;

    ensure_email_free(&state, &email, None).await?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Failed to hash password: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name,
            email,
            password_hash,
            role,
            department: input.department,
            department_id: input.department_id,
            phone: input.phone,
            bio: input.bio,
            job_title: input.job_title,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, created_by = admin.user_id, "Team member added");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// PUT /api/team/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireManager(admin): RequireManager,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    let user = apply_user_update(&state, id, input).await?;
    tracing::info!(user_id = id, updated_by = admin.user_id, "Team member updated");
    Ok(Json(user.into()))
}

/// DELETE /api/team/{id}
///
/// Managers cannot delete their own account.
pub async fn delete(
    State(state): State<AppState>,
    RequireManager(admin): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::BadRequest("You cannot delete your own account".into()));
    }
    if UserRepo::delete(&state.pool, id).await? {
        tracing::info!(user_id = id, deleted_by = admin.user_id, "Team member removed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::not_found("User", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_canonicalized() {
        assert_eq!(canonical_role("pmo").unwrap(), "PMO");
        assert_eq!(canonical_role(" Admin ").unwrap(), "ADMIN");
        assert_eq!(canonical_role("OWNER").unwrap_err().field, "role");
    }

    #[test]
    fn names_are_trimmed_and_required() {
        assert_eq!(validate_name("  Salim Al Harthy ").unwrap(), "Salim Al Harthy");
        assert!(validate_name("  ").is_err());
        assert!(validate_name(&"n".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }
}
