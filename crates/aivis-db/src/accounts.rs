//! Database operations for the `automation_accounts` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `automation_accounts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRow {
    pub id: i64,
    pub public_id: Uuid,
    pub email: String,
    pub status: String,
    pub proxy_url: Option<String>,
    pub is_eligible: bool,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Returns all accounts the router may assign work to: active, eligible, and
/// proxy-configured. Ordered by id so the router's tie-breaking is stable
/// across runs.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_routable_accounts(pool: &PgPool) -> Result<Vec<AccountRow>, DbError> {
    let rows = sqlx::query_as::<_, AccountRow>(
        "SELECT id, public_id, email, status, proxy_url, is_eligible, \
                last_used_at, created_at, updated_at \
         FROM automation_accounts \
         WHERE status = 'active' AND is_eligible = true AND proxy_url IS NOT NULL \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
