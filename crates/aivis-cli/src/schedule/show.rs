//! Read-only report of a persisted schedule and recent generation runs.

use chrono::NaiveDate;
use sqlx::PgPool;

const RECENT_RUN_LIMIT: i64 = 10;

/// Print the batches persisted for `date` plus the most recent scheduler
/// runs.
///
/// # Errors
///
/// Returns an error if either query fails.
pub(crate) async fn run_show(pool: &PgPool, date: NaiveDate) -> anyhow::Result<()> {
    let batches = aivis_db::list_batches_for_date(pool, date).await?;

    if batches.is_empty() {
        println!("no schedule exists for {date}");
    } else {
        println!("## Schedule for {date}");
        println!();
        println!("| # | Time (UTC) | Account | Brand | Prompts | Status |");
        println!("|---|------------|---------|-------|---------|--------|");
        for batch in &batches {
            println!(
                "| {} | {} | {} | {} | {} | {} |",
                batch.batch_number,
                batch.execution_at.format("%H:%M"),
                batch.account_id,
                batch.brand_id,
                batch.batch_size,
                batch.status
            );
        }
        let total: i64 = batches.iter().map(|b| i64::from(b.batch_size)).sum();
        println!();
        println!("{} batches, {total} prompts", batches.len());
    }

    let runs = aivis_db::list_scheduler_runs(pool, RECENT_RUN_LIMIT).await?;
    if !runs.is_empty() {
        println!();
        println!("## Recent runs");
        println!();
        for run in &runs {
            let error = run.error_message.as_deref().unwrap_or("");
            println!(
                "- {} [{}] {}: {} items, {} batches {}",
                run.created_at.format("%Y-%m-%d %H:%M"),
                run.trigger_source,
                run.status,
                run.work_items,
                run.batches,
                error
            );
        }
    }

    Ok(())
}
