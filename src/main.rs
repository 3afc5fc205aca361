mod classify;
mod config;
mod db;
mod enrich;
mod error;
mod fetchers;
mod models;
mod runner;
mod sources;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{Command, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jobfeed=info")),
        )
        .init();

    let config = Config::parse();

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;

    if config.run_migrations {
        tracing::info!("Running database migrations...");
        db::run_migrations(&pool).await?;
        tracing::info!("Migrations complete");
    }

    match config.command {
        Command::CreateTasks => {
            let execution_id = runner::create_tasks(&pool).await?;
            println!("execution {execution_id}");
        }
        Command::Run {
            concurrency,
            task_timeout,
        } => {
            let stats = runner::run(&pool, concurrency, task_timeout).await?;
            println!(
                "succeeded={} failed={} skipped={} jobs_written={}",
                stats.succeeded, stats.failed, stats.skipped, stats.jobs_written
            );
        }
        Command::Classify { limit } => {
            let scanned = enrich::run(&pool, limit).await?;
            println!("classified={scanned}");
        }
    }

    Ok(())
}
