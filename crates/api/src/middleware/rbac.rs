//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the requirement.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use pmo_core::error::CoreError;
use pmo_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires a role that may manage the team and departments (`ADMIN` or
/// `PMO`). Rejects with 403 Forbidden otherwise.
///
/// The role is read from the session token, not the database. A user whose
/// role is changed keeps the old rights until their token expires, at most
/// `SESSION_TTL_MINS` (480 minutes by default) after login.
///
/// ```ignore
/// async fn manage(RequireManager(user): RequireManager) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireManager(pub AuthUser);

impl FromRequestParts<AppState> for RequireManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let can_manage = user
            .role
            .parse::<Role>()
            .map(Role::can_manage)
            .unwrap_or(false);
        if !can_manage {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin or PMO role required".into(),
            )));
        }
        Ok(RequireManager(user))
    }
}
