//! Database operations for the `prompts` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `prompts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PromptRow {
    pub id: i64,
    pub public_id: Uuid,
    pub brand_id: i64,
    pub text: String,
    pub status: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Returns up to `limit` active prompts for a brand, in configured position
/// order. The limit is the per-brand prompt cap applied during discovery.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_prompts(
    pool: &PgPool,
    brand_id: i64,
    limit: i64,
) -> Result<Vec<PromptRow>, DbError> {
    let rows = sqlx::query_as::<_, PromptRow>(
        "SELECT id, public_id, brand_id, text, status, position, created_at, updated_at \
         FROM prompts \
         WHERE brand_id = $1 AND status = 'active' \
         ORDER BY position, id \
         LIMIT $2",
    )
    .bind(brand_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
