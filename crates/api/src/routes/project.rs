//! Route definitions for the `/projects` resource, including the
//! per-project change log under `/projects/{id}/logs`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{bulk_import, project, project_log};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                        -> list
/// POST   /                        -> create
/// GET    /active                  -> list_active
/// GET    /archived                -> list_archived
/// POST   /bulk-import             -> bulk_import
/// GET    /{id}                    -> get_by_id
/// PUT    /{id}                    -> update
/// DELETE /{id}                    -> delete
///
/// GET    /{id}/logs               -> project_log::list
/// POST   /{id}/logs               -> project_log::create
/// DELETE /{id}/logs               -> project_log::delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route("/active", get(project::list_active))
        .route("/archived", get(project::list_archived))
        .route("/bulk-import", post(bulk_import::bulk_import))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .route(
            "/{id}/logs",
            get(project_log::list)
                .post(project_log::create)
                .delete(project_log::delete),
        )
}
