use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use crate::classify::Tags;
use crate::error::AppError;
use crate::sources::Provider;

/// Provider-agnostic normalized posting, produced by a fetcher and
/// consumed by the upsert layer. Never persisted as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawJob {
    pub title: String,
    pub company_display_name: String,
    pub location: String,
    pub description: String,
    pub skills: Vec<String>,
    pub apply_url: String,
    pub provider: Provider,
    pub external_id: String,
    pub posted_at: DateTime<Utc>,
}

impl RawJob {
    /// Stable document identity: `{provider}_{sanitized external id}`,
    /// falling back to a content hash when the source supplies no id.
    /// Re-fetches of the same posting always collapse onto the same key.
    pub fn doc_key(&self) -> String {
        if self.external_id.is_empty() {
            format!("{}_h{}", self.provider, fallback_hash(self))
        } else {
            format!("{}_{}", self.provider, sanitize_id(&self.external_id))
        }
    }
}

/// Replace path-separator characters that are illegal in a document key.
fn sanitize_id(id: &str) -> String {
    id.replace(['/', '\\'], "-")
}

/// SHA-256 over the identifying fields, truncated to 16 hex chars.
/// Collisions are treated as "same job", so the hash is kept wide enough
/// to make that vanishingly unlikely.
fn fallback_hash(job: &RawJob) -> String {
    let mut hasher = Sha256::new();
    hasher.update(job.title.as_bytes());
    hasher.update(b"|");
    hasher.update(job.company_display_name.as_bytes());
    hasher.update(b"|");
    hasher.update(job.apply_url.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}

/// Persisted posting: fetch fields plus classification outputs.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct JobRecord {
    pub doc_key: String,
    pub title: String,
    pub company_display_name: String,
    pub location: String,
    pub description: String,
    pub skills: Vec<String>,
    pub apply_url: String,
    pub ats_provider: String,
    pub external_id: String,
    pub posted_at: DateTime<Utc>,
    pub employment_types: Vec<String>,
    pub work_locations: Vec<String>,
    pub experience_levels: Vec<String>,
    pub industries: Vec<String>,
    pub technologies: Vec<String>,
    pub tagged_skills: Vec<String>,
    pub job_type: Option<String>,
    pub remote: Option<String>,
    pub seniority: Option<String>,
    pub enriched_at: Option<DateTime<Utc>>,
    pub enriched_version: Option<String>,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Keyset cursor for paging through jobs in `(first_seen_at, doc_key)`
/// order. Stable under concurrent writes because new rows only ever
/// append with a later `first_seen_at`.
#[derive(Debug, Clone)]
pub struct JobCursor {
    pub first_seen_at: DateTime<Utc>,
    pub doc_key: String,
}

impl JobRecord {
    /// Insert-or-merge by document identity. Fetch fields overwrite,
    /// classification fields are preserved. Returns whether the row was
    /// newly inserted.
    pub async fn upsert(pool: &PgPool, job: &RawJob) -> Result<bool, AppError> {
        let row: (bool,) = sqlx::query_as(
            "INSERT INTO jobs (doc_key, title, company_display_name, location, description, skills, apply_url, ats_provider, external_id, posted_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             ON CONFLICT (doc_key) DO UPDATE SET
                 title = EXCLUDED.title,
                 company_display_name = EXCLUDED.company_display_name,
                 location = EXCLUDED.location,
                 description = EXCLUDED.description,
                 skills = EXCLUDED.skills,
                 apply_url = EXCLUDED.apply_url,
                 posted_at = EXCLUDED.posted_at,
                 last_seen_at = NOW()
             RETURNING (xmax = 0)",
        )
        .bind(job.doc_key())
        .bind(&job.title)
        .bind(&job.company_display_name)
        .bind(&job.location)
        .bind(&job.description)
        .bind(&job.skills)
        .bind(&job.apply_url)
        .bind(job.provider.as_str())
        .bind(&job.external_id)
        .bind(job.posted_at)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Fetch the next page after `cursor` (or the first page when None).
    pub async fn page(
        pool: &PgPool,
        cursor: Option<&JobCursor>,
        page_size: i64,
    ) -> Result<Vec<JobRecord>, AppError> {
        let jobs = sqlx::query_as::<_, JobRecord>(
            "SELECT * FROM jobs
             WHERE ($1::timestamptz IS NULL OR (first_seen_at, doc_key) > ($1, $2))
             ORDER BY first_seen_at, doc_key
             LIMIT $3",
        )
        .bind(cursor.map(|c| c.first_seen_at))
        .bind(cursor.map_or("", |c| c.doc_key.as_str()))
        .bind(page_size)
        .fetch_all(pool)
        .await?;
        Ok(jobs)
    }

    /// Overwrite only the classification columns, stamping the engine
    /// version so repeated passes are distinguishable and idempotent.
    pub async fn update_tags(
        pool: &PgPool,
        doc_key: &str,
        tags: &Tags,
        version: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE jobs SET
                 employment_types = $2,
                 work_locations = $3,
                 experience_levels = $4,
                 industries = $5,
                 technologies = $6,
                 tagged_skills = $7,
                 job_type = $8,
                 remote = $9,
                 seniority = $10,
                 enriched_at = NOW(),
                 enriched_version = $11
             WHERE doc_key = $1",
        )
        .bind(doc_key)
        .bind(&tags.employment_types)
        .bind(&tags.work_locations)
        .bind(&tags.experience_levels)
        .bind(&tags.industries)
        .bind(&tags.technologies)
        .bind(&tags.skills)
        .bind(tags.employment_types.first().map(String::as_str))
        .bind(tags.work_locations.first().map(String::as_str))
        .bind(tags.experience_levels.first().map(String::as_str))
        .bind(version)
        .execute(pool)
        .await?;
        Ok(())
    }

    #[allow(dead_code)]
    pub async fn get(pool: &PgPool, doc_key: &str) -> Result<JobRecord, AppError> {
        sqlx::query_as::<_, JobRecord>("SELECT * FROM jobs WHERE doc_key = $1")
            .bind(doc_key)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {doc_key} not found")))
    }
}
