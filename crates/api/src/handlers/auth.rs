//! Handlers for `/auth` (login and logout).

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use pmo_core::error::CoreError;
use pmo_db::models::user::UserResponse;
use pmo_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::auth::password::verify_password;
use crate::auth::session::{cleared_session_cookie, issue_session};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
}

fn set_cookie(value: String) -> AppResult<AppendHeaders<[(HeaderName, HeaderValue); 1]>> {
    let value = HeaderValue::try_from(value)
        .map_err(|e| AppError::InternalError(format!("Invalid session cookie: {e}")))?;
    Ok(AppendHeaders([(SET_COOKIE, value)]))
}

/// POST /api/auth/login
///
/// Unknown email and wrong password produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    let valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))?;
    if !valid {
        tracing::info!(user_id = user.id, "Login rejected: wrong password");
        return Err(invalid_credentials());
    }

    let session = issue_session(user.id, &user.role, &state.config.session)
        .map_err(|e| AppError::InternalError(format!("Failed to sign session: {e}")))?;
    tracing::info!(user_id = user.id, role = %user.role, "User logged in");

    Ok((
        set_cookie(session.cookie())?,
        Json(LoginResponse {
            expires_in: session.expires_in,
            token: session.token,
            user: user.into(),
        }),
    ))
}

/// POST /api/auth/logout
///
/// Expires the session cookie. Sessions are stateless, so a token already
/// handed to an API client stays valid until it expires.
pub async fn logout() -> AppResult<impl IntoResponse> {
    Ok((StatusCode::NO_CONTENT, set_cookie(cleared_session_cookie())?))
}
