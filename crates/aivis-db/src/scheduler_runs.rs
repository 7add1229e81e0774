//! Database operations for the `scheduler_runs` audit table.
//!
//! Every generation attempt — including idempotent skips — leaves a row
//! here, so operators can see what the nightly job did without reading logs.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `scheduler_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SchedulerRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub schedule_date: NaiveDate,
    pub trigger_source: String,
    pub status: String,
    pub work_items: i32,
    pub batches: i32,
    pub error_message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Creates a new scheduler run in `queued` status.
///
/// Generates a UUID in Rust and binds it to `public_id`. Returns the full
/// newly-created row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_scheduler_run(
    pool: &PgPool,
    schedule_date: NaiveDate,
    trigger_source: &str,
) -> Result<SchedulerRunRow, DbError> {
    let public_id = Uuid::new_v4();

    let row = sqlx::query_as::<_, SchedulerRunRow>(
        "INSERT INTO scheduler_runs (public_id, schedule_date, trigger_source, status) \
         VALUES ($1, $2, $3, 'queued') \
         RETURNING id, public_id, schedule_date, trigger_source, status, \
                   work_items, batches, error_message, started_at, completed_at, created_at",
    )
    .bind(public_id)
    .bind(schedule_date)
    .bind(trigger_source)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `queued`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn start_scheduler_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE scheduler_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a run as `succeeded` with final work-item and batch counts.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `running`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn complete_scheduler_run(
    pool: &PgPool,
    id: i64,
    work_items: i32,
    batches: i32,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE scheduler_runs \
         SET status = 'succeeded', completed_at = NOW(), work_items = $1, batches = $2 \
         WHERE id = $3 AND status = 'running'",
    )
    .bind(work_items)
    .bind(batches)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a run as `failed` with an error message.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `queued` or
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_scheduler_run(
    pool: &PgPool,
    id: i64,
    error_message: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE scheduler_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE id = $2 AND status IN ('queued', 'running')",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "queued or running",
        });
    }

    Ok(())
}

/// Marks a run as `skipped` — used when a schedule already exists for the
/// target date and the run exits without planning.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `queued`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn skip_scheduler_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE scheduler_runs \
         SET status = 'skipped', completed_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Returns the most recent `limit` runs, ordered by `created_at DESC`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_scheduler_runs(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<SchedulerRunRow>, DbError> {
    let rows = sqlx::query_as::<_, SchedulerRunRow>(
        "SELECT id, public_id, schedule_date, trigger_source, status, \
                work_items, batches, error_message, started_at, completed_at, created_at \
         FROM scheduler_runs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
