//! Search-query stats backing the suggestion feature.
//!
//! This data is advisory: callers are expected to swallow errors from this
//! module and degrade to an empty suggestion list.

use sqlx::PgPool;

use crate::DbError;

/// Upserts a search query: new queries start at count 1, repeats increment
/// and re-stamp `last_used`. Queries are stored lowercased.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the write fails.
pub async fn record_search_query(pool: &PgPool, query: &str) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO search_query_stats (query, count, last_used) \
         VALUES (LOWER($1), 1, NOW()) \
         ON CONFLICT (query) DO UPDATE SET \
             count = search_query_stats.count + 1, \
             last_used = NOW()",
    )
    .bind(query)
    .execute(pool)
    .await?;
    Ok(())
}

/// Returns up to `limit` past queries matching `q` as a case-insensitive
/// substring, most popular first. An empty `q` returns the global
/// most-popular queries.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn suggest_queries(pool: &PgPool, q: &str, limit: i64) -> Result<Vec<String>, DbError> {
    let needle = q.trim().to_lowercase();
    // POSITION does literal containment, so '%' and '_' in user input are not
    // treated as pattern metacharacters the way LIKE would.
    let rows = sqlx::query_scalar::<_, String>(
        "SELECT query FROM search_query_stats \
         WHERE $1 = '' OR POSITION($1 IN query) > 0 \
         ORDER BY count DESC, last_used DESC \
         LIMIT $2",
    )
    .bind(needle)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
