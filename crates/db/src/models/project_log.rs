//! Project change-log entity model and DTOs.
//!
//! Log rows are immutable once created (no `updated_at`).

use pmo_core::change_log::Changes;
use pmo_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A single change-log entry.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLog {
    pub id: DbId,
    pub project_id: DbId,
    /// One of the `LogAction` strings (`STATUS_CHANGE`, ...).
    pub action: String,
    pub description: String,
    pub changes: Json<Changes>,
    pub note: Option<String>,
    pub created_by: DbId,
    pub created_by_name: String,
    pub created_at: Timestamp,
}

/// Request body for appending a log entry by hand.
///
/// `changes` is classified field by field before it is stored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectLog {
    /// Defaults to `NOTE_ADDED`.
    pub action: Option<String>,
    pub description: Option<String>,
    pub changes: Option<serde_json::Value>,
    pub note: Option<String>,
}

/// Query parameters for `DELETE /projects/{id}/logs`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteLogsQuery {
    pub log_id: Option<DbId>,
}
