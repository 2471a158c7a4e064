//! Department entity model and DTOs.

use pmo_core::coerce::loose_f64;
use pmo_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `departments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub budget: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartment {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "loose_f64::deserialize")]
    pub budget: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDepartment {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "loose_f64::deserialize")]
    pub budget: Option<f64>,
}

/// Result of a precondition-checked department delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    /// Users or projects still reference the department; nothing was deleted.
    HasDependents { users: i64, projects: i64 },
}
