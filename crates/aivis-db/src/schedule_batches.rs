//! Database operations for the `schedule_batches` table.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `schedule_batches` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScheduleBatchRow {
    pub id: i64,
    pub public_id: Uuid,
    pub schedule_date: NaiveDate,
    pub owner_id: Uuid,
    pub brand_id: i64,
    pub account_id: i64,
    pub batch_number: i32,
    pub execution_at: DateTime<Utc>,
    pub prompt_ids: Vec<i64>,
    pub batch_size: i32,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A batch ready for insertion, produced by the planner.
#[derive(Debug, Clone)]
pub struct NewScheduleBatch {
    pub schedule_date: NaiveDate,
    pub owner_id: Uuid,
    pub brand_id: i64,
    pub account_id: i64,
    pub batch_number: i32,
    pub execution_at: DateTime<Utc>,
    pub prompt_ids: Vec<i64>,
}

// ---------------------------------------------------------------------------
// Planning-side operations
// ---------------------------------------------------------------------------

/// Returns `true` if any batches already exist for the given date. The
/// generator consults this before planning so re-runs are no-ops.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn schedule_exists_for_date(pool: &PgPool, date: NaiveDate) -> Result<bool, DbError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM schedule_batches WHERE schedule_date = $1",
    )
    .bind(date)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Inserts a full day's batches inside a single transaction.
///
/// All rows are created in `pending` status. The transaction plus the
/// `UNIQUE (schedule_date, batch_number)` constraint guarantee that two
/// overlapping generation runs cannot both commit: the loser rolls back
/// with a constraint violation and no partial schedule is left behind.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; nothing is committed in
/// that case.
pub async fn insert_schedule_batches(
    pool: &PgPool,
    batches: &[NewScheduleBatch],
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    for batch in batches {
        let batch_size = i32::try_from(batch.prompt_ids.len()).unwrap_or(i32::MAX);
        sqlx::query(
            "INSERT INTO schedule_batches \
                 (schedule_date, owner_id, brand_id, account_id, batch_number, \
                  execution_at, prompt_ids, batch_size, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending')",
        )
        .bind(batch.schedule_date)
        .bind(batch.owner_id)
        .bind(batch.brand_id)
        .bind(batch.account_id)
        .bind(batch.batch_number)
        .bind(batch.execution_at)
        .bind(&batch.prompt_ids)
        .bind(batch_size)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Returns all batches for a date, ordered by execution time.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_batches_for_date(
    pool: &PgPool,
    date: NaiveDate,
) -> Result<Vec<ScheduleBatchRow>, DbError> {
    let rows = sqlx::query_as::<_, ScheduleBatchRow>(
        "SELECT id, public_id, schedule_date, owner_id, brand_id, account_id, \
                batch_number, execution_at, prompt_ids, batch_size, status, \
                error_message, created_at, updated_at \
         FROM schedule_batches \
         WHERE schedule_date = $1 \
         ORDER BY execution_at, batch_number",
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Executor-side transitions
// ---------------------------------------------------------------------------
// The batch runner (out of scope here) drives pending → running →
// completed | failed. Transitions are guarded updates: touching a row that
// is not in the expected status affects zero rows and returns a typed error.

/// Marks a batch as `running`.
///
/// # Errors
///
/// Returns [`DbError::InvalidBatchTransition`] if the batch is not
/// `pending`, or [`DbError::Sqlx`] if the update fails.
pub async fn start_batch(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE schedule_batches \
         SET status = 'running', updated_at = NOW() \
         WHERE id = $1 AND status = 'pending'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidBatchTransition {
            id,
            expected_status: "pending",
        });
    }

    Ok(())
}

/// Marks a batch as `completed`.
///
/// # Errors
///
/// Returns [`DbError::InvalidBatchTransition`] if the batch is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_batch(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE schedule_batches \
         SET status = 'completed', updated_at = NOW() \
         WHERE id = $1 AND status = 'running'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidBatchTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a batch as `failed` with an error message.
///
/// # Errors
///
/// Returns [`DbError::InvalidBatchTransition`] if the batch is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_batch(pool: &PgPool, id: i64, error_message: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE schedule_batches \
         SET status = 'failed', error_message = $1, updated_at = NOW() \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidBatchTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}
