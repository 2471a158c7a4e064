//! Domain logic for the PMO portfolio service.
//!
//! Nothing in this crate touches the network or the database. The `db` and
//! `api` crates build on these types and helpers.

pub mod change_log;
pub mod coerce;
pub mod error;
pub mod patch;
pub mod project;
pub mod roles;
pub mod timestamp;
pub mod types;
pub mod validation;
