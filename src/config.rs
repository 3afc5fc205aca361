use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "jobfeed", about = "Job posting ingestion and classification pipeline")]
pub struct Config {
    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Run database migrations on startup
    #[arg(long, env = "RUN_MIGRATIONS", default_value = "true")]
    pub run_migrations: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Create one pending fetch task per registered source
    CreateTasks,
    /// Drain all pending fetch tasks with bounded concurrency
    Run {
        /// Maximum number of tasks in flight at once
        #[arg(long, env = "CONCURRENCY", default_value = "5")]
        concurrency: usize,

        /// Per-task timeout in seconds
        #[arg(long, env = "TASK_TIMEOUT", default_value = "60")]
        task_timeout: u64,
    },
    /// Re-run the classification engine over all persisted jobs
    Classify {
        /// Stop after this many jobs (0 = no limit)
        #[arg(long, default_value = "0")]
        limit: i64,
    },
}
