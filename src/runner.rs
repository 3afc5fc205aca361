use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::AppError;
use crate::fetchers::{self, FetchOutcome};
use crate::models::job::JobRecord;
use crate::models::run::IngestRun;
use crate::models::task::FetchTask;
use crate::sources::{self, SourceDescriptor};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("jobfeed/", env!("CARGO_PKG_VERSION"));

/// Create one pending fetch task per registered source, plus the run
/// summary row they all share. One transaction, run row first, so the
/// tasks' foreign key onto the run can never dangle.
pub async fn create_tasks(pool: &PgPool) -> Result<Uuid, AppError> {
    let registry = sources::registry();
    let execution_id = Uuid::new_v4();

    let mut tx = pool.begin().await?;
    IngestRun::create(&mut tx, execution_id, registry.len() as i32).await?;
    let created = FetchTask::create_batch(&mut tx, &registry, execution_id).await?;
    tx.commit().await?;

    tracing::info!("Created {created} fetch tasks under execution {execution_id}");
    Ok(execution_id)
}

/// Aggregate counters for one drain of the task queue.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunStats {
    pub succeeded: i32,
    pub failed: i32,
    pub skipped: i32,
    pub jobs_written: i32,
}

#[derive(Debug)]
enum TaskOutcome {
    Succeeded { jobs_written: i32 },
    Failed,
    Skipped,
}

/// Drain all pending tasks with at most `concurrency` in flight and a
/// per-task timeout. Tasks are isolated bulkheads: a failure or timeout
/// in one records onto that task row and never aborts siblings. Ctrl-c
/// lets in-flight tasks finish but starts no new ones.
pub async fn run(pool: &PgPool, concurrency: usize, task_timeout: u64) -> Result<RunStats, AppError> {
    let tasks = FetchTask::pending(pool).await?;
    tracing::info!("Draining {} pending fetch tasks (concurrency {concurrency})", tasks.len());

    let client = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()?;

    let worker_pool = pool.clone();
    let outcomes = for_each_bounded(tasks, concurrency, tokio::signal::ctrl_c(), move |task| {
        let pool = worker_pool.clone();
        let client = client.clone();
        async move { process_task(&pool, &client, &task, task_timeout).await }
    })
    .await;

    let mut stats = RunStats::default();
    for outcome in outcomes {
        match outcome {
            TaskOutcome::Succeeded { jobs_written } => {
                stats.succeeded += 1;
                stats.jobs_written += jobs_written;
            }
            TaskOutcome::Failed => stats.failed += 1,
            TaskOutcome::Skipped => stats.skipped += 1,
        }
    }

    IngestRun::finish_latest(pool, stats.succeeded, stats.failed, stats.skipped, stats.jobs_written)
        .await?;
    tracing::info!(
        "Run finished: {} succeeded, {} failed, {} skipped, {} jobs written",
        stats.succeeded,
        stats.failed,
        stats.skipped,
        stats.jobs_written
    );
    Ok(stats)
}

/// Execute one task end to end. Every failure path lands on the task
/// row; nothing escapes to the caller.
async fn process_task(
    pool: &PgPool,
    client: &reqwest::Client,
    task: &FetchTask,
    task_timeout: u64,
) -> TaskOutcome {
    let span = tracing::info_span!(
        "fetch_task",
        provider = %task.provider,
        handle = %task.company_handle
    );
    process_task_inner(pool, client, task, task_timeout)
        .instrument(span)
        .await
}

async fn process_task_inner(
    pool: &PgPool,
    client: &reqwest::Client,
    task: &FetchTask,
    task_timeout: u64,
) -> TaskOutcome {
    let source = match task.source() {
        Ok(source) => source,
        Err(e) => {
            tracing::error!("Task {} failed: {e}", task.task_id);
            let _ = FetchTask::mark_failed(pool, task.task_id, &e.to_string()).await;
            return TaskOutcome::Failed;
        }
    };

    let work = fetch_and_write(pool, client, &source);
    match tokio::time::timeout(Duration::from_secs(task_timeout), work).await {
        Ok(Ok(Some((fetched, written)))) => {
            tracing::info!("Task {} completed: {fetched} fetched, {written} written", task.task_id);
            let _ = FetchTask::mark_completed(pool, task.task_id, fetched, written).await;
            TaskOutcome::Succeeded { jobs_written: written }
        }
        Ok(Ok(None)) => {
            tracing::info!("Task {} skipped (provider not fetched)", task.task_id);
            let _ = FetchTask::mark_completed(pool, task.task_id, 0, 0).await;
            TaskOutcome::Skipped
        }
        Ok(Err(e)) => {
            tracing::error!("Task {} failed: {e}", task.task_id);
            let _ = FetchTask::mark_failed(pool, task.task_id, &e.to_string()).await;
            TaskOutcome::Failed
        }
        Err(_) => {
            let e = AppError::TaskTimeout(task_timeout);
            tracing::error!("Task {} failed: {e}", task.task_id);
            let _ = FetchTask::mark_failed(pool, task.task_id, &e.to_string()).await;
            TaskOutcome::Failed
        }
    }
}

/// Fetch one source and upsert its jobs. Returns None when the provider
/// is deliberately skipped. A single bad job is logged and skipped
/// without aborting the rest of the write.
async fn fetch_and_write(
    pool: &PgPool,
    client: &reqwest::Client,
    source: &SourceDescriptor,
) -> Result<Option<(i32, i32)>, AppError> {
    let jobs = match fetchers::fetch_source(client, source).await? {
        FetchOutcome::Jobs(jobs) => jobs,
        FetchOutcome::Skipped => return Ok(None),
    };

    let fetched = jobs.len() as i32;
    let mut written = 0;
    for job in &jobs {
        match JobRecord::upsert(pool, job).await {
            Ok(_) => written += 1,
            Err(e) => {
                tracing::warn!("Skipping job '{}' ({}): {e}", job.title, job.doc_key());
            }
        }
    }
    Ok(Some((fetched, written)))
}

/// Run one future per item with at most `limit` in flight, collecting
/// outputs in completion order. Items not yet started when `shutdown`
/// resolves are dropped; in-flight work always runs to completion.
/// `run()` drives its tasks through here, so the concurrency bound and
/// bulkhead behavior are pinned by the tests below.
async fn for_each_bounded<T, Fut, S>(
    items: Vec<T>,
    limit: usize,
    shutdown: S,
    make: impl Fn(T) -> Fut,
) -> Vec<Fut::Output>
where
    T: Send + 'static,
    S: Future,
    Fut: Future + Send + 'static,
    Fut::Output: Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(limit));
    let mut set = JoinSet::new();
    let mut shutdown = std::pin::pin!(shutdown);

    for item in items {
        let permit = tokio::select! {
            biased;
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received, not starting remaining work");
                break;
            }
            permit = semaphore.clone().acquire_owned() => {
                match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                }
            }
        };

        let fut = make(item);
        set.spawn(async move {
            let _permit = permit;
            fut.await
        });
    }

    let mut outputs = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(output) => outputs.push(output),
            Err(e) => tracing::error!("Worker task panicked: {e}"),
        }
    }
    outputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::pending;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_bounded_executor_never_exceeds_limit() {
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let outputs = for_each_bounded((0..12).collect(), 5, pending::<()>(), |i: usize| {
            let current = current.clone();
            let peak = peak.clone();
            async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                current.fetch_sub(1, Ordering::SeqCst);
                i
            }
        })
        .await;

        assert_eq!(outputs.len(), 12);
        assert!(peak.load(Ordering::SeqCst) <= 5);
        // With 12 items and a bound of 5, the pool must actually fan out.
        assert!(peak.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn test_bulkhead_one_failure_leaves_siblings_unaffected() {
        let outputs = for_each_bounded((0..5).collect(), 5, pending::<()>(), |i: usize| async move {
            if i == 2 {
                Err(format!("task {i} blew up"))
            } else {
                Ok(i)
            }
        })
        .await;

        assert_eq!(outputs.len(), 5);
        assert_eq!(outputs.iter().filter(|r| r.is_ok()).count(), 4);
        let error = outputs.iter().find(|r| r.is_err()).unwrap();
        assert_eq!(error.as_ref().unwrap_err(), "task 2 blew up");
    }

    #[tokio::test]
    async fn test_bounded_executor_with_limit_one_is_sequential() {
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for_each_bounded(vec![(), (), ()], 1, pending::<()>(), |_| {
            let current = current.clone();
            let peak = peak.clone();
            async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                current.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .await;

        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resolved_shutdown_starts_no_work() {
        let outputs =
            for_each_bounded((0..8).collect(), 5, async {}, |i: usize| async move { i }).await;
        assert!(outputs.is_empty());
    }

    /// Exercises the create-tasks transaction against a real schema:
    /// the run summary row must commit with (and before) the task rows
    /// that reference it.
    #[tokio::test]
    #[ignore = "needs a live Postgres; set DATABASE_URL"]
    async fn test_create_tasks_commits_run_row_with_its_tasks() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::run_migrations(&pool).await.unwrap();

        let execution_id = create_tasks(&pool).await.unwrap();

        let (runs,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM ingest_runs WHERE execution_id = $1")
                .bind(execution_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(runs, 1);

        let (tasks,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM fetch_tasks WHERE execution_id = $1")
                .bind(execution_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(tasks as usize, sources::registry().len());
    }
}
