//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Lookups return `Ok(None)` for a
//! missing row; only backend failures are errors.

pub mod department_repo;
pub mod fan_out;
pub mod project_log_repo;
pub mod project_repo;
pub mod user_repo;

pub use department_repo::DepartmentRepo;
pub use fan_out::FanOutReport;
pub use project_log_repo::ProjectLogRepo;
pub use project_repo::ProjectRepo;
pub use user_repo::UserRepo;
