pub mod auth;
pub mod dashboard;
pub mod department;
pub mod health;
pub mod profile;
pub mod project;
pub mod team;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                              login (public)
/// /auth/logout                             logout (public, clears cookie)
///
/// /projects                                list, create
/// /projects/active                         non-archived projects
/// /projects/archived                       archived projects
/// /projects/bulk-import                    create many (POST)
/// /projects/{id}                           get, update, delete
/// /projects/{id}/logs                      list, add, delete (?logId=)
///
/// /team                                    list, create (create: ADMIN/PMO)
/// /team/{id}                               get, update, delete (writes: ADMIN/PMO)
///
/// /user/profile                            get, update own record
/// /user/profile/password                   change own password (PATCH)
///
/// /departments                             list, create (create: ADMIN/PMO)
/// /departments/{id}                        get, update, delete (writes: ADMIN/PMO)
///
/// /dashboard/kanban                        status board
/// /dashboard/summary                       portfolio totals
/// ```
///
/// Reads are public. Every mutation requires a session.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/projects", project::router())
        .nest("/team", team::router())
        .nest("/user/profile", profile::router())
        .nest("/departments", department::router())
        .nest("/dashboard", dashboard::router())
}
