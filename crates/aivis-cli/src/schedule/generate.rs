//! The nightly generation pass: discovery → routing → packing → slots →
//! persistence, with a `scheduler_runs` audit row bracketing the attempt.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use aivis_core::AppConfig;
use aivis_db::NewScheduleBatch;
use aivis_scheduler::{AccountInfo, ExecutionRecord, SchedulePlan, WorkItem};

use super::fail_run_best_effort;

/// How a generation request resolves once we know whether the date is
/// already scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GenerateDisposition {
    /// Nothing persisted for the date yet; plan and persist.
    Proceed,
    /// Schedule exists and this is a dry run; report, write nothing.
    SkipSilently,
    /// Schedule exists; record a `skipped` audit row and exit cleanly.
    SkipWithAudit,
}

/// Resolve the idempotency decision for a generation request. Generation
/// never overwrites an existing schedule; dry runs additionally never touch
/// the audit trail.
pub(crate) fn disposition(already_scheduled: bool, dry_run: bool) -> GenerateDisposition {
    match (already_scheduled, dry_run) {
        (false, _) => GenerateDisposition::Proceed,
        (true, true) => GenerateDisposition::SkipSilently,
        (true, false) => GenerateDisposition::SkipWithAudit,
    }
}

/// Plan and persist the batch schedule for `date`.
///
/// Idempotent per date: if batches already exist the run records a `skipped`
/// audit row and exits cleanly with zero writes. With `dry_run` the plan is
/// built and summarized but neither batches nor audit rows are written.
///
/// # Errors
///
/// Returns an error if discovery fails, the account pool is empty, the
/// batches cannot fit the execution window, or persistence fails. Failures
/// after the audit row exists are best-effort recorded on it.
pub(crate) async fn run_generate(
    pool: &PgPool,
    config: &AppConfig,
    date: NaiveDate,
    dry_run: bool,
    trigger_source: &'static str,
) -> anyhow::Result<()> {
    let now = Utc::now();

    let already_scheduled = aivis_db::schedule_exists_for_date(pool, date).await?;
    match disposition(already_scheduled, dry_run) {
        GenerateDisposition::Proceed => {}
        GenerateDisposition::SkipSilently => {
            println!("dry-run: schedule for {date} already exists; nothing to do");
            return Ok(());
        }
        GenerateDisposition::SkipWithAudit => {
            let run = aivis_db::create_scheduler_run(pool, date, trigger_source).await?;
            aivis_db::skip_scheduler_run(pool, run.id).await?;
            tracing::info!(%date, "schedule already exists; skipping generation");
            println!("schedule for {date} already exists; skipping");
            return Ok(());
        }
    }

    if dry_run {
        let plan = plan_for_date(pool, config, date, now).await?;
        println!("dry-run: no batches were persisted");
        print_summary(&plan, config);
        return Ok(());
    }

    let run = aivis_db::create_scheduler_run(pool, date, trigger_source).await?;
    if let Err(e) = aivis_db::start_scheduler_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
        return Err(e.into());
    }

    let plan = match plan_for_date(pool, config, date, now).await {
        Ok(plan) => plan,
        Err(e) => {
            fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
            return Err(e);
        }
    };

    let work_items = i32::try_from(plan.work_items).unwrap_or(i32::MAX);
    let batch_count = i32::try_from(plan.batches.len()).unwrap_or(i32::MAX);

    if plan.batches.is_empty() {
        aivis_db::complete_scheduler_run(pool, run.id, 0, 0).await?;
        println!("no eligible work items for {date}; nothing to schedule");
        return Ok(());
    }

    let rows = batch_rows(&plan);
    if let Err(e) = aivis_db::insert_schedule_batches(pool, &rows).await {
        fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
        return Err(e.into());
    }

    if let Err(e) = aivis_db::complete_scheduler_run(pool, run.id, work_items, batch_count).await {
        fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
        return Err(e.into());
    }

    print_summary(&plan, config);
    Ok(())
}

/// Build the in-memory plan for a date from current database state.
async fn plan_for_date(
    pool: &PgPool,
    config: &AppConfig,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> anyhow::Result<SchedulePlan> {
    let work_items = discover_work_items(pool, config).await?;
    tracing::info!(%date, count = work_items.len(), "discovered work items");

    let accounts: Vec<AccountInfo> = aivis_db::list_routable_accounts(pool)
        .await?
        .into_iter()
        .map(|row| AccountInfo {
            id: row.id,
            email: row.email,
            last_used_at: row.last_used_at,
        })
        .collect();
    tracing::info!(count = accounts.len(), "loaded routable accounts");

    let history = load_history(pool, config, now).await?;

    let mut rng = rand::rng();
    let plan = aivis_scheduler::build_plan(
        date,
        work_items,
        &accounts,
        &history,
        &config.schedule,
        now,
        &mut rng,
    )?;
    Ok(plan)
}

/// Flatten schedulable brands and their active prompts into work items.
/// Brands with zero active prompts are logged and skipped, not errored.
async fn discover_work_items(pool: &PgPool, config: &AppConfig) -> anyhow::Result<Vec<WorkItem>> {
    let brands = aivis_db::list_schedulable_brands(pool).await?;
    let mut work_items = Vec::new();

    for brand in &brands {
        let prompts =
            aivis_db::list_active_prompts(pool, brand.id, config.schedule.max_prompts_per_brand)
                .await?;
        if prompts.is_empty() {
            tracing::warn!(slug = %brand.slug, "skipping brand — no active prompts");
            continue;
        }
        for prompt in prompts {
            work_items.push(WorkItem {
                owner_id: brand.owner_id,
                brand_id: brand.id,
                brand_name: brand.name.clone(),
                prompt_id: prompt.id,
                prompt_text: prompt.text,
            });
        }
    }

    Ok(work_items)
}

/// Load the trailing execution-history window. A read failure degrades to
/// an empty history when `history_fail_open` is set — stale routing beats
/// producing no schedule at all — and aborts the run otherwise.
async fn load_history(
    pool: &PgPool,
    config: &AppConfig,
    now: DateTime<Utc>,
) -> anyhow::Result<Vec<ExecutionRecord>> {
    match aivis_db::list_recent_executions(pool, now, config.schedule.history_window_days).await {
        Ok(rows) => Ok(rows
            .into_iter()
            .map(|row| ExecutionRecord {
                account_id: row.account_id,
                prompt_id: row.prompt_id,
                brand_id: row.brand_id,
                executed_at: row.executed_at,
            })
            .collect()),
        Err(e) if config.history_fail_open => {
            tracing::warn!(
                error = %e,
                "execution history unavailable; routing with empty history"
            );
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

fn batch_rows(plan: &SchedulePlan) -> Vec<NewScheduleBatch> {
    plan.batches
        .iter()
        .map(|batch| NewScheduleBatch {
            schedule_date: plan.schedule_date,
            owner_id: batch.owner_id,
            brand_id: batch.brand_id,
            account_id: batch.account_id,
            batch_number: batch.batch_number,
            execution_at: batch.execution_at,
            prompt_ids: batch.prompt_ids.clone(),
        })
        .collect()
}

fn print_summary(plan: &SchedulePlan, config: &AppConfig) {
    println!("schedule for {}", plan.schedule_date);
    println!("  work items: {}", plan.work_items);
    println!("  batches:    {}", plan.batches.len());
    println!(
        "  batch size: {}-{} (avg {:.1})",
        plan.min_batch_size(),
        plan.max_batch_size(),
        plan.average_batch_size()
    );
    println!(
        "  window:     {:02}:00-{:02}:00 UTC, {} min spacing",
        config.schedule.min_hour, config.schedule.max_hour, config.schedule.min_gap_minutes
    );
    if plan.fallback_routes > 0 {
        println!(
            "  note:       {} items routed via least-recently-used fallback",
            plan.fallback_routes
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_date_proceeds_regardless_of_dry_run() {
        assert_eq!(disposition(false, false), GenerateDisposition::Proceed);
        assert_eq!(disposition(false, true), GenerateDisposition::Proceed);
    }

    #[test]
    fn existing_schedule_skips_with_an_audit_row() {
        assert_eq!(disposition(true, false), GenerateDisposition::SkipWithAudit);
    }

    #[test]
    fn existing_schedule_dry_run_writes_nothing() {
        assert_eq!(disposition(true, true), GenerateDisposition::SkipSilently);
    }
}
