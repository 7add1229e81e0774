//! Foreground nightly trigger.
//!
//! Registers the generation job with a cron scheduler and blocks until the
//! process receives ctrl-c or SIGTERM. The job handle must stay alive for
//! the lifetime of the process — dropping it shuts down all jobs.

use std::sync::Arc;

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler};

use aivis_core::AppConfig;

pub(crate) async fn run_daemon(pool: PgPool, config: AppConfig) -> anyhow::Result<()> {
    let scheduler = JobScheduler::new().await?;

    let pool = Arc::new(pool);
    let config = Arc::new(config);
    let cron = config.generate_cron.clone();

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let config = Arc::clone(&config);

        Box::pin(async move {
            let date = chrono::Utc::now().date_naive();
            tracing::info!(%date, "daemon: starting nightly schedule generation");
            match super::generate::run_generate(&pool, &config, date, false, "cron").await {
                Ok(()) => tracing::info!(%date, "daemon: nightly generation complete"),
                Err(e) => tracing::error!(%date, error = %e, "daemon: nightly generation failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    tracing::info!(cron = %cron, "daemon: nightly trigger registered");

    shutdown_signal().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, stopping daemon");
}
