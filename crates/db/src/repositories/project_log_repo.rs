//! Repository for the `project_logs` table.
//!
//! Entries are insert-only. There is no update method.

use pmo_core::change_log::{Actor, LogDraft};
use pmo_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::project_log::ProjectLog;
use crate::repositories::fan_out::{self, FanOutReport};

const COLUMNS: &str = "\
    id, project_id, action, description, changes, note, \
    created_by, created_by_name, created_at";

/// Provides insert, read and delete operations for project logs.
pub struct ProjectLogRepo;

impl ProjectLogRepo {
    /// Persist one immutable entry for `project_id`, attributed to `actor`.
    pub async fn record(
        pool: &PgPool,
        project_id: DbId,
        draft: &LogDraft,
        actor: &Actor,
    ) -> Result<ProjectLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_logs
                (project_id, action, description, changes, note, created_by, created_by_name)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectLog>(&query)
            .bind(project_id)
            .bind(draft.action.as_str())
            .bind(&draft.description)
            .bind(Json(&draft.changes))
            .bind(&draft.note)
            .bind(actor.id)
            .bind(&actor.name)
            .fetch_one(pool)
            .await
    }

    /// All entries for a project, newest first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_logs
             WHERE project_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ProjectLog>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a single entry. The entry must belong to `project_id`.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(
        pool: &PgPool,
        project_id: DbId,
        log_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_logs WHERE id = $1 AND project_id = $2")
            .bind(log_id)
            .bind(project_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every entry for a project, one statement per entry.
    ///
    /// Not transactional: a failed delete is reported and the rest proceed.
    pub async fn delete_all_for_project(
        pool: &PgPool,
        project_id: DbId,
        concurrency: usize,
    ) -> Result<FanOutReport, sqlx::Error> {
        let ids: Vec<DbId> =
            sqlx::query_scalar("SELECT id FROM project_logs WHERE project_id = $1 ORDER BY id")
                .bind(project_id)
                .fetch_all(pool)
                .await?;

        let report = fan_out::run("delete_project_logs", ids, concurrency, |id| async move {
            sqlx::query("DELETE FROM project_logs WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
                .map(|r| r.rows_affected())
        })
        .await;

        Ok(report)
    }
}
