//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a Bearer token
//!   or the session cookie.
//! - [`rbac::RequireManager`] -- Requires the `ADMIN` or `PMO` role.

pub mod auth;
pub mod rbac;
