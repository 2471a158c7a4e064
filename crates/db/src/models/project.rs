//! Project entity model and DTOs.

use pmo_core::coerce::{loose_f64, loose_f64_patch, loose_i32};
use pmo_core::patch::nullable;
use pmo_core::project::BoardItem;
use pmo_core::timestamp::{loose_option, loose_patch};
use pmo_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: DbId,
    pub title: String,
    /// Free-text department label as entered on the form.
    pub department: Option<String>,
    pub department_id: Option<DbId>,
    pub status: String,
    pub sub_status: Option<String>,
    pub percentage: i32,
    pub budget: Option<f64>,
    pub award_amount: Option<f64>,
    #[serde(rename = "savingsOMR")]
    pub savings_omr: Option<f64>,
    pub savings_percentage: Option<f64>,
    /// Display name of the focal person; denormalized from `users.name`.
    pub opd_focal: Option<String>,
    pub start_date: Option<Timestamp>,
    pub completion_date: Option<Timestamp>,
    pub description: Option<String>,
    pub is_archived: bool,
    pub archived_at: Option<Timestamp>,
    pub archived_by: Option<DbId>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BoardItem for Project {
    fn status_label(&self) -> &str {
        &self.status
    }

    fn is_archived(&self) -> bool {
        self.is_archived
    }
}

/// DTO for creating a project.
///
/// Numeric fields accept numeric strings and dates accept any shape the
/// timestamp normalizer understands.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    #[serde(default)]
    pub title: String,
    pub department: Option<String>,
    pub department_id: Option<DbId>,
    /// Defaults to `Possible` when omitted.
    pub status: Option<String>,
    pub sub_status: Option<String>,
    #[serde(default, deserialize_with = "loose_i32::deserialize")]
    pub percentage: Option<i32>,
    #[serde(default, deserialize_with = "loose_f64::deserialize")]
    pub budget: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64::deserialize")]
    pub award_amount: Option<f64>,
    #[serde(
        default,
        rename = "savingsOMR",
        deserialize_with = "loose_f64::deserialize"
    )]
    pub savings_omr: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64::deserialize")]
    pub savings_percentage: Option<f64>,
    pub opd_focal: Option<String>,
    #[serde(default, deserialize_with = "loose_option::deserialize")]
    pub start_date: Option<Timestamp>,
    #[serde(default, deserialize_with = "loose_option::deserialize")]
    pub completion_date: Option<Timestamp>,
    pub description: Option<String>,
}

/// DTO for updating a project. Absent fields are left unchanged.
///
/// Nullable columns are `Option<Option<_>>`: an explicit `null` clears the
/// stored value (see [`pmo_core::patch`]). `is_archived` drives the archive
/// stamp columns.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub department: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub department_id: Option<Option<DbId>>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub sub_status: Option<Option<String>>,
    #[serde(default, deserialize_with = "loose_i32::deserialize")]
    pub percentage: Option<i32>,
    #[serde(default, deserialize_with = "loose_f64_patch::deserialize")]
    pub budget: Option<Option<f64>>,
    #[serde(default, deserialize_with = "loose_f64_patch::deserialize")]
    pub award_amount: Option<Option<f64>>,
    #[serde(
        default,
        rename = "savingsOMR",
        deserialize_with = "loose_f64_patch::deserialize"
    )]
    pub savings_omr: Option<Option<f64>>,
    #[serde(default, deserialize_with = "loose_f64_patch::deserialize")]
    pub savings_percentage: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub opd_focal: Option<Option<String>>,
    #[serde(default, deserialize_with = "loose_patch::deserialize")]
    pub start_date: Option<Option<Timestamp>>,
    #[serde(default, deserialize_with = "loose_patch::deserialize")]
    pub completion_date: Option<Option<Timestamp>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub is_archived: Option<bool>,
}

/// Equality filters for listing projects.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {
    pub department: Option<String>,
    pub status: Option<String>,
}
