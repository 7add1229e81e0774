//! Schedule command handlers for the CLI.
//!
//! `generate` is the nightly batch-planning pass; `show` inspects a
//! persisted schedule; `daemon` keeps the process alive and triggers
//! `generate` on a cron expression.

mod daemon;
mod generate;
mod show;

use chrono::{NaiveDate, Utc};
use clap::Subcommand;

/// Sub-commands available under `schedule`.
#[derive(Debug, Subcommand)]
pub enum ScheduleCommands {
    /// Plan and persist the batch schedule for a date
    Generate {
        /// Target date (YYYY-MM-DD); defaults to today in UTC
        #[arg(long)]
        date: Option<String>,

        /// Plan and print the summary without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the persisted batches and recent runs for a date
    Show {
        /// Target date (YYYY-MM-DD); defaults to today in UTC
        #[arg(long)]
        date: Option<String>,
    },
    /// Run the nightly trigger in the foreground until interrupted
    Daemon,
}

pub(crate) async fn run(
    pool: &sqlx::PgPool,
    config: &aivis_core::AppConfig,
    command: ScheduleCommands,
) -> anyhow::Result<()> {
    match command {
        ScheduleCommands::Generate { date, dry_run } => {
            let date = parse_target_date(date.as_deref())?;
            generate::run_generate(pool, config, date, dry_run, "cli").await
        }
        ScheduleCommands::Show { date } => {
            let date = parse_target_date(date.as_deref())?;
            show::run_show(pool, date).await
        }
        ScheduleCommands::Daemon => daemon::run_daemon(pool.clone(), config.clone()).await,
    }
}

/// Resolve the target schedule date: explicit override or today in UTC.
pub(crate) fn parse_target_date(raw: Option<&str>) -> anyhow::Result<NaiveDate> {
    match raw {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| anyhow::anyhow!("invalid --date '{s}' (expected YYYY-MM-DD): {e}")),
        None => Ok(Utc::now().date_naive()),
    }
}

/// Attempt to mark a scheduler run as failed, logging any secondary error.
pub(crate) async fn fail_run_best_effort(pool: &sqlx::PgPool, run_id: i64, message: String) {
    if let Err(mark_err) = aivis_db::fail_scheduler_run(pool, run_id, &message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark scheduler run as failed"
        );
    }
}
