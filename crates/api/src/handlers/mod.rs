//! HTTP handlers, one module per resource.

pub mod auth;
pub mod bulk_import;
pub mod dashboard;
pub mod department;
pub mod profile;
pub mod project;
pub mod project_log;
pub mod team;
