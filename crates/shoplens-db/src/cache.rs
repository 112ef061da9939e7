//! TTL response cache keyed by deterministic request strings.
//!
//! Reads return a payload only while `expires_at` is in the future; expired
//! rows are logically dead and simply shadowed by the next write. Writes
//! upsert by key, so the newest result supersedes, never merges. Concurrent
//! same-key writes are fine: each carries an independently fetched,
//! equally valid result, so last write wins.

use chrono::{Duration, Utc};
use sqlx::PgPool;

use crate::DbError;

/// Returns the cached payload for `key` if a fresh entry exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn fetch_cached(pool: &PgPool, key: &str) -> Result<Option<serde_json::Value>, DbError> {
    let payload = sqlx::query_scalar::<_, serde_json::Value>(
        "SELECT payload FROM cache_entries WHERE cache_key = $1 AND expires_at > NOW()",
    )
    .bind(key)
    .fetch_optional(pool)
    .await?;
    Ok(payload)
}

/// Stores `payload` under `key` with `expires_at = now + ttl`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the write fails.
pub async fn store_cached(
    pool: &PgPool,
    key: &str,
    payload: &serde_json::Value,
    ttl: Duration,
) -> Result<(), DbError> {
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO cache_entries (cache_key, payload, created_at, expires_at) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (cache_key) DO UPDATE SET \
             payload = EXCLUDED.payload, \
             created_at = EXCLUDED.created_at, \
             expires_at = EXCLUDED.expires_at",
    )
    .bind(key)
    .bind(payload)
    .bind(now)
    .bind(now + ttl)
    .execute(pool)
    .await?;
    Ok(())
}
