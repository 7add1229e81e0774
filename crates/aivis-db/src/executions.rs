//! Windowed reads over the append-only `prompt_executions` history.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `prompt_executions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExecutionRow {
    pub id: i64,
    pub account_id: i64,
    pub prompt_id: i64,
    pub brand_id: i64,
    pub executed_at: DateTime<Utc>,
}

/// Returns all executions within the trailing `window_days` window, oldest
/// first. This is the router's only historical signal.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_executions(
    pool: &PgPool,
    now: DateTime<Utc>,
    window_days: i64,
) -> Result<Vec<ExecutionRow>, DbError> {
    let cutoff = now - Duration::days(window_days);

    let rows = sqlx::query_as::<_, ExecutionRow>(
        "SELECT id, account_id, prompt_id, brand_id, executed_at \
         FROM prompt_executions \
         WHERE executed_at >= $1 \
         ORDER BY executed_at",
    )
    .bind(cutoff)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
