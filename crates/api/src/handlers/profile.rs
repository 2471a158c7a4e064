//! Handlers for `/user/profile`: the signed-in user's own record.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use pmo_core::error::CoreError;
use pmo_core::validation::FieldError;
use pmo_db::models::user::{UpdateUser, UserResponse};
use pmo_db::repositories::UserRepo;
use serde::Deserialize;

use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::team::apply_user_update;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// GET /api/user/profile
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("User", auth.user_id)))?;
    Ok(Json(user.into()))
}

/// PUT /api/user/profile
///
/// Same rules as a team update, except the caller cannot change their role.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    if input.role.is_some() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Role cannot be changed from the profile".into(),
        )));
    }
    let user = apply_user_update(&state, auth.user_id, input).await?;
    tracing::info!(user_id = auth.user_id, "Profile updated");
    Ok(Json(user.into()))
}

/// PATCH /api/user/profile/password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("User", auth.user_id)))?;

    let valid = verify_password(&input.current_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))?;
    if !valid {
        return Err(AppError::BadRequest("Current password is incorrect".into()));
    }
    validate_password_strength(&input.new_password, state.config.min_password_length)
        .map_err(|msg| FieldError::new("newPassword", msg))?;

    let hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Failed to hash password: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &hash).await?;

    tracing::info!(user_id = user.id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}
