use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::AppError;
use crate::sources::SourceDescriptor;

/// One unit of fetch work against a single source, tracked through a
/// terminal status. Rows are never deleted; the table doubles as the
/// audit trail for past runs.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct FetchTask {
    pub task_id: Uuid,
    pub provider: String,
    pub company_handle: String,
    pub provider_extra: serde_json::Value,
    pub status: String,
    pub retry_count: i32,
    pub max_retries: i32,
    pub execution_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub jobs_fetched: i32,
    pub jobs_written: i32,
}

impl FetchTask {
    /// Insert one pending task per source, all tagged with the shared
    /// execution id. Runs on the caller's transaction so the run row
    /// the tasks reference commits atomically with them.
    pub async fn create_batch(
        conn: &mut PgConnection,
        sources: &[SourceDescriptor],
        execution_id: Uuid,
    ) -> Result<usize, AppError> {
        for source in sources {
            sqlx::query(
                "INSERT INTO fetch_tasks (task_id, provider, company_handle, provider_extra, execution_id)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(Uuid::new_v4())
            .bind(source.provider.as_str())
            .bind(&source.company_handle)
            .bind(serde_json::to_value(&source.extra).unwrap_or_default())
            .bind(execution_id)
            .execute(&mut *conn)
            .await?;
        }
        Ok(sources.len())
    }

    pub async fn pending(pool: &PgPool) -> Result<Vec<FetchTask>, AppError> {
        let tasks = sqlx::query_as::<_, FetchTask>(
            "SELECT * FROM fetch_tasks WHERE status = 'pending' ORDER BY created_at",
        )
        .fetch_all(pool)
        .await?;
        Ok(tasks)
    }

    /// Terminal success transition. Zero jobs fetched is still a success.
    pub async fn mark_completed(
        pool: &PgPool,
        task_id: Uuid,
        jobs_fetched: i32,
        jobs_written: i32,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE fetch_tasks SET status = 'completed', jobs_fetched = $2, jobs_written = $3, completed_at = NOW() WHERE task_id = $1",
        )
        .bind(task_id)
        .bind(jobs_fetched)
        .bind(jobs_written)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Terminal failure transition with the captured error message.
    pub async fn mark_failed(pool: &PgPool, task_id: Uuid, error: &str) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE fetch_tasks SET status = 'failed', error = $2, completed_at = NOW() WHERE task_id = $1",
        )
        .bind(task_id)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Rebuild the source descriptor this task was created from.
    pub fn source(&self) -> Result<SourceDescriptor, AppError> {
        let provider = self
            .provider
            .parse()
            .map_err(AppError::Provider)?;
        Ok(SourceDescriptor {
            provider,
            company_handle: self.company_handle.clone(),
            extra: serde_json::from_value(self.provider_extra.clone()).unwrap_or_default(),
        })
    }
}
