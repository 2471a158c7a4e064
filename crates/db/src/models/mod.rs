//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for partial updates
//!
//! Everything crossing the wire is camelCase.

pub mod department;
pub mod project;
pub mod project_log;
pub mod user;
