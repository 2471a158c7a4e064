//! Route definitions for `/dashboard`.

use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/kanban", get(dashboard::kanban))
        .route("/summary", get(dashboard::summary))
}
