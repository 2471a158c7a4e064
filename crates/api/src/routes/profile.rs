//! Route definitions for `/user/profile`.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::profile;
use crate::state::AppState;

/// ```text
/// GET    /                        -> get
/// PUT    /                        -> update
/// PATCH  /password                -> change_password
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::get).put(profile::update))
        .route("/password", patch(profile::change_password))
}
