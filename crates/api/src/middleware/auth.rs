//! Session authentication extractor: Bearer header or `pmo_session` cookie.

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use pmo_core::change_log::Actor;
use pmo_core::error::CoreError;
use pmo_core::types::DbId;
use pmo_db::repositories::UserRepo;
use pmo_db::DbPool;

use crate::auth::session::{verify_session, SESSION_COOKIE};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Authenticated user extracted from the request.
///
/// The token is read from `Authorization: Bearer <token>` or, failing that,
/// from the `pmo_session` cookie set by login.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// The user's role at token issue time.
    pub role: String,
}

impl AuthUser {
    /// Resolve the acting user's current display name for log attribution.
    ///
    /// A token whose user has since been deleted is rejected.
    pub async fn actor(&self, pool: &DbPool) -> AppResult<Actor> {
        let user = UserRepo::find_by_id(pool, self.user_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("User no longer exists".into()))
            })?;
        Ok(Actor {
            id: user.id,
            name: user.name,
        })
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?
            .or_else(|| session_cookie(&parts.headers))
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Authentication required".into()))
            })?;

        let claims = verify_session(&token, &state.config.session).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

/// `Ok(None)` when there is no Authorization header; an error when there is
/// one but it is not a Bearer token.
fn bearer_token(headers: &HeaderMap) -> AppResult<Option<String>> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| Some(t.trim().to_string()))
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}
