//! Repository for the `departments` table.

use pmo_core::types::DbId;
use sqlx::PgPool;

use crate::models::department::{CreateDepartment, DeleteOutcome, Department, UpdateDepartment};
use crate::repositories::{ProjectRepo, UserRepo};

const COLUMNS: &str = "id, name, description, budget, created_at, updated_at";

/// Provides CRUD operations for departments.
pub struct DepartmentRepo;

impl DepartmentRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateDepartment,
    ) -> Result<Department, sqlx::Error> {
        let query = format!(
            "INSERT INTO departments (name, description, budget)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Department>(&query)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(input.budget)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Department>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM departments WHERE id = $1");
        sqlx::query_as::<_, Department>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all departments ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Department>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM departments ORDER BY name, id");
        sqlx::query_as::<_, Department>(&query).fetch_all(pool).await
    }

    /// Update a department. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDepartment,
    ) -> Result<Option<Department>, sqlx::Error> {
        let query = format!(
            "UPDATE departments SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                budget = COALESCE($4, budget),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Department>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.budget)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a department. Returns `true` if a row was removed.
    ///
    /// Does not look at dependents; see [`DepartmentRepo::delete_checked`].
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a department only if no user or project references it.
    pub async fn delete_checked(pool: &PgPool, id: DbId) -> Result<DeleteOutcome, sqlx::Error> {
        if Self::find_by_id(pool, id).await?.is_none() {
            return Ok(DeleteOutcome::NotFound);
        }

        let users = UserRepo::count_by_department(pool, id).await?;
        let projects = ProjectRepo::count_by_department(pool, id).await?;
        if users > 0 || projects > 0 {
            return Ok(DeleteOutcome::HasDependents { users, projects });
        }

        if Self::delete(pool, id).await? {
            Ok(DeleteOutcome::Deleted)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }
}
