use sqlx::PgPool;

/// All `id` columns must be bigint.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_all_pks_are_bigint(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, data_type
         FROM information_schema.columns
         WHERE column_name = 'id'
           AND table_schema = 'public'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(rows.len(), 4);
    for (table, data_type) in &rows {
        assert_eq!(data_type, "bigint", "Table {table}.id should be bigint");
    }
}

/// Every timestamp column is timestamptz, never a naive timestamp.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_no_naive_timestamps(pool: PgPool) {
    let naive: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, column_name
         FROM information_schema.columns
         WHERE table_schema = 'public'
           AND data_type = 'timestamp without time zone'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(naive.is_empty(), "naive timestamp columns found: {naive:?}");
}

/// The per-project log listing is backed by a composite index.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_logs_listing_index_exists(pool: PgPool) {
    let found: Option<(String,)> = sqlx::query_as(
        "SELECT indexname FROM pg_indexes
         WHERE tablename = 'project_logs'
           AND indexname = 'idx_project_logs_project_created'",
    )
    .fetch_optional(&pool)
    .await
    .unwrap();

    assert!(found.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_check(pool: PgPool) {
    pmo_db::health_check(&pool).await.unwrap();
}
