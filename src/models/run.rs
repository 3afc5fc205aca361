use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::AppError;

/// Run-summary record for one ingestion pass, keyed by execution id.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct IngestRun {
    pub execution_id: Uuid,
    pub tasks_created: i32,
    pub tasks_succeeded: i32,
    pub tasks_failed: i32,
    pub tasks_skipped: i32,
    pub jobs_written: i32,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl IngestRun {
    /// Insert the summary row on the caller's transaction. Must commit
    /// before (or together with) the fetch tasks that reference it.
    pub async fn create(
        conn: &mut PgConnection,
        execution_id: Uuid,
        tasks_created: i32,
    ) -> Result<IngestRun, AppError> {
        let run = sqlx::query_as::<_, IngestRun>(
            "INSERT INTO ingest_runs (execution_id, tasks_created) VALUES ($1, $2) RETURNING *",
        )
        .bind(execution_id)
        .bind(tasks_created)
        .fetch_one(&mut *conn)
        .await?;
        Ok(run)
    }

    /// Roll the runner's aggregate counters into the most recent open run.
    pub async fn finish_latest(
        pool: &PgPool,
        succeeded: i32,
        failed: i32,
        skipped: i32,
        jobs_written: i32,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE ingest_runs SET tasks_succeeded = $1, tasks_failed = $2, tasks_skipped = $3, jobs_written = $4, finished_at = NOW()
             WHERE execution_id = (
                 SELECT execution_id FROM ingest_runs WHERE finished_at IS NULL ORDER BY started_at DESC LIMIT 1
             )",
        )
        .bind(succeeded)
        .bind(failed)
        .bind(skipped)
        .bind(jobs_written)
        .execute(pool)
        .await?;
        Ok(())
    }
}
