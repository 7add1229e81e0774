mod schedule;
#[cfg(test)]
mod tests;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "aivis")]
#[command(about = "aivis brand-visibility scheduling command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Plan, inspect, and trigger the nightly batch schedule
    Schedule {
        #[command(subcommand)]
        command: schedule::ScheduleCommands,
    },
    /// Database utilities
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Verify database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = aivis_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = aivis_db::PoolConfig::from_app_config(&config);
    let pool = aivis_db::connect_pool(&config.database_url, pool_config).await?;

    match cli.command {
        Commands::Schedule { command } => schedule::run(&pool, &config, command).await,
        Commands::Db { command } => match command {
            DbCommands::Ping => {
                aivis_db::ping(&pool).await?;
                println!("database reachable");
                Ok(())
            }
            DbCommands::Migrate => {
                let applied = aivis_db::run_migrations(&pool).await?;
                println!("applied {applied} migrations");
                Ok(())
            }
        },
    }
}
