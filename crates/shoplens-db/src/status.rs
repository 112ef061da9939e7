//! Status-check records used by the `/api/status` liveness endpoints.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `status_checks` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatusCheckRow {
    pub id: Uuid,
    pub client_name: String,
    pub recorded_at: DateTime<Utc>,
}

/// Inserts a status check with a generated id and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_status_check(
    pool: &PgPool,
    client_name: &str,
) -> Result<StatusCheckRow, DbError> {
    let row = sqlx::query_as::<_, StatusCheckRow>(
        "INSERT INTO status_checks (id, client_name, recorded_at) \
         VALUES ($1, $2, NOW()) \
         RETURNING id, client_name, recorded_at",
    )
    .bind(Uuid::new_v4())
    .bind(client_name)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Lists stored status checks, newest first, capped at `limit`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_status_checks(pool: &PgPool, limit: i64) -> Result<Vec<StatusCheckRow>, DbError> {
    let rows = sqlx::query_as::<_, StatusCheckRow>(
        "SELECT id, client_name, recorded_at FROM status_checks \
         ORDER BY recorded_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
