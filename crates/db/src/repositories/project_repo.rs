//! Repository for the `projects` table.

use pmo_core::patch;
use pmo_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::{CreateProject, Project, ProjectFilter, UpdateProject};
use crate::repositories::fan_out::{self, FanOutReport};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, title, department, department_id, status, sub_status, percentage, \
    budget, award_amount, savings_omr, savings_percentage, opd_focal, \
    start_date, completion_date, description, is_archived, archived_at, \
    archived_by, created_by, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    ///
    /// `status` defaults to `Possible` and `percentage` to 0.
    pub async fn create(
        pool: &PgPool,
        input: &CreateProject,
        created_by: Option<DbId>,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects
                (title, department, department_id, status, sub_status, percentage,
                 budget, award_amount, savings_omr, savings_percentage, opd_focal,
                 start_date, completion_date, description, created_by)
             VALUES ($1, $2, $3, COALESCE($4, 'Possible'), $5, COALESCE($6, 0),
                     $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.title)
            .bind(&input.department)
            .bind(input.department_id)
            .bind(&input.status)
            .bind(&input.sub_status)
            .bind(input.percentage)
            .bind(input.budget)
            .bind(input.award_amount)
            .bind(input.savings_omr)
            .bind(input.savings_percentage)
            .bind(&input.opd_focal)
            .bind(input.start_date)
            .bind(input.completion_date)
            .bind(&input.description)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a project by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List projects, most recently created first.
    ///
    /// Each filter field is an equality match; `None` or an empty string
    /// means "any".
    pub async fn list(pool: &PgPool, filter: &ProjectFilter) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE ($1::text IS NULL OR department = $1)
               AND ($2::text IS NULL OR status = $2)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(non_empty(&filter.department))
            .bind(non_empty(&filter.status))
            .fetch_all(pool)
            .await
    }

    /// Update a project and stamp `updated_at`.
    ///
    /// `None` fields are left alone. Nullable columns take `Some(None)` as
    /// "clear" and `Some(Some(v))` as "set".
    ///
    /// Archiving (`is_archived = true`) stamps `archived_at` and sets
    /// `archived_by` to `actor_id` unless the project is already archived;
    /// unarchiving clears all three columns.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
        actor_id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                title = COALESCE($2, title),
                department = CASE WHEN $3 THEN $4 ELSE department END,
                department_id = CASE WHEN $5 THEN $6 ELSE department_id END,
                status = COALESCE($7, status),
                sub_status = CASE WHEN $8 THEN $9 ELSE sub_status END,
                percentage = COALESCE($10, percentage),
                budget = CASE WHEN $11 THEN $12 ELSE budget END,
                award_amount = CASE WHEN $13 THEN $14 ELSE award_amount END,
                savings_omr = CASE WHEN $15 THEN $16 ELSE savings_omr END,
                savings_percentage = CASE WHEN $17 THEN $18 ELSE savings_percentage END,
                opd_focal = CASE WHEN $19 THEN $20 ELSE opd_focal END,
                start_date = CASE WHEN $21 THEN $22 ELSE start_date END,
                completion_date = CASE WHEN $23 THEN $24 ELSE completion_date END,
                description = CASE WHEN $25 THEN $26 ELSE description END,
                is_archived = COALESCE($27, is_archived),
                archived_at = CASE
                    WHEN $27 IS NULL THEN archived_at
                    WHEN $27 THEN COALESCE(archived_at, NOW())
                    ELSE NULL
                END,
                archived_by = CASE
                    WHEN $27 IS NULL THEN archived_by
                    WHEN $27 AND NOT is_archived THEN $28
                    WHEN $27 THEN archived_by
                    ELSE NULL
                END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.department.is_some())
            .bind(patch::value(&input.department))
            .bind(input.department_id.is_some())
            .bind(patch::value(&input.department_id))
            .bind(&input.status)
            .bind(input.sub_status.is_some())
            .bind(patch::value(&input.sub_status))
            .bind(input.percentage)
            .bind(input.budget.is_some())
            .bind(patch::value(&input.budget))
            .bind(input.award_amount.is_some())
            .bind(patch::value(&input.award_amount))
            .bind(input.savings_omr.is_some())
            .bind(patch::value(&input.savings_omr))
            .bind(input.savings_percentage.is_some())
            .bind(patch::value(&input.savings_percentage))
            .bind(input.opd_focal.is_some())
            .bind(patch::value(&input.opd_focal))
            .bind(input.start_date.is_some())
            .bind(patch::value(&input.start_date))
            .bind(input.completion_date.is_some())
            .bind(patch::value(&input.completion_date))
            .bind(input.description.is_some())
            .bind(patch::value(&input.description))
            .bind(input.is_archived)
            .bind(actor_id)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a project. Its log entries go with it.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Rewrite the denormalized focal-person name on every project that
    /// still carries `old_name`.
    ///
    /// Each project is written independently with at most `concurrency`
    /// writes in flight. A write only touches a row whose value differs
    /// from `new_name`, so re-running after a partial failure is safe.
    pub async fn rename_focal_person(
        pool: &PgPool,
        old_name: &str,
        new_name: &str,
        concurrency: usize,
    ) -> Result<FanOutReport, sqlx::Error> {
        let ids: Vec<DbId> =
            sqlx::query_scalar("SELECT id FROM projects WHERE opd_focal = $1 ORDER BY id")
                .bind(old_name)
                .fetch_all(pool)
                .await?;

        let report = fan_out::run("rename_focal_person", ids, concurrency, |id| async move {
            sqlx::query(
                "UPDATE projects SET opd_focal = $2, updated_at = NOW()
                 WHERE id = $1 AND opd_focal IS DISTINCT FROM $2",
            )
            .bind(id)
            .bind(new_name)
            .execute(pool)
            .await
            .map(|r| r.rows_affected())
        })
        .await;

        Ok(report)
    }

    /// Count projects referencing a department.
    pub async fn count_by_department(
        pool: &PgPool,
        department_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE department_id = $1")
            .bind(department_id)
            .fetch_one(pool)
            .await
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
