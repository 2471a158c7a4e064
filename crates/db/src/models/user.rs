//! User entity model and DTOs.

use pmo_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub department: Option<String>,
    pub department_id: Option<DbId>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub job_title: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub department: Option<String>,
    pub department_id: Option<DbId>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub job_title: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            department: u.department,
            department_id: u.department_id,
            phone: u.phone,
            bio: u.bio,
            job_title: u.job_title,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// DTO for inserting a user. The caller hashes the password first.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    /// Already normalized (trimmed, lower-case).
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub department: Option<String>,
    pub department_id: Option<DbId>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub job_title: Option<String>,
}

/// DTO for updating a user. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub department_id: Option<DbId>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub job_title: Option<String>,
}

/// Equality filters for listing users.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilter {
    pub role: Option<String>,
    pub department_id: Option<DbId>,
}
