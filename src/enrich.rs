use sqlx::PgPool;

use crate::classify::{self, Hints, JobText, Tags};
use crate::error::AppError;
use crate::models::job::{JobCursor, JobRecord};

const PAGE_SIZE: i64 = 200;

/// Re-run the classification engine over every persisted job, rewriting
/// only the tag columns. Pages with a keyset cursor so the scan stays
/// stable while fetch tasks write concurrently. Idempotent for a fixed
/// engine version.
pub async fn run(pool: &PgPool, limit: i64) -> Result<i64, AppError> {
    let mut cursor: Option<JobCursor> = None;
    let mut scanned: i64 = 0;

    loop {
        let page = JobRecord::page(pool, cursor.as_ref(), PAGE_SIZE).await?;
        if page.is_empty() {
            break;
        }

        for record in &page {
            let tags = classify_record(record);
            JobRecord::update_tags(pool, &record.doc_key, &tags, classify::ENRICHED_VERSION)
                .await?;

            scanned += 1;
            if limit > 0 && scanned >= limit {
                tracing::info!("Re-classified {scanned} jobs (limit reached)");
                return Ok(scanned);
            }
        }

        tracing::info!("Re-classified {scanned} jobs so far");
        cursor = page.last().map(|r| JobCursor {
            first_seen_at: r.first_seen_at,
            doc_key: r.doc_key.clone(),
        });

        if (page.len() as i64) < PAGE_SIZE {
            break;
        }
    }

    tracing::info!(
        "Re-classification finished: {scanned} jobs stamped with version {}",
        classify::ENRICHED_VERSION
    );
    Ok(scanned)
}

/// Classify one persisted record from its stored text alone. The
/// record's previous tag output is never replayed as a hint: a stale
/// label from an older engine version must not outrank fresh text
/// evidence, or a version bump could never correct a past mislabel.
fn classify_record(record: &JobRecord) -> Tags {
    let body = format!(
        "{} {} {}",
        record.location,
        record.description,
        record.skills.join(" ")
    );
    let text = JobText {
        title: &record.title,
        body: &body,
        company: &record.company_display_name,
        location: &record.location,
    };
    classify::classify(&text, &Hints::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(title: &str, description: &str, seniority: Option<&str>) -> JobRecord {
        JobRecord {
            doc_key: "greenhouse_101".to_string(),
            title: title.to_string(),
            company_display_name: "Acme".to_string(),
            location: "Berlin".to_string(),
            description: description.to_string(),
            skills: vec![],
            apply_url: String::new(),
            ats_provider: "greenhouse".to_string(),
            external_id: "101".to_string(),
            posted_at: Utc::now(),
            employment_types: vec![],
            work_locations: vec![],
            experience_levels: seniority.iter().map(|s| s.to_string()).collect(),
            industries: vec![],
            technologies: vec![],
            tagged_skills: vec![],
            job_type: None,
            remote: None,
            seniority: seniority.map(String::from),
            enriched_at: None,
            enriched_version: Some("1".to_string()),
            first_seen_at: Utc::now(),
            last_seen_at: Utc::now(),
        }
    }

    #[test]
    fn test_stale_seniority_label_cannot_override_fresh_text() {
        // A record mislabeled "senior" by an older engine version must
        // come out the same as a fresh classification of its text.
        let text = "internship for university students";
        let stale = record("growth associate", text, Some("senior"));
        let fresh = record("growth associate", text, None);

        let retagged = classify_record(&stale);
        assert_eq!(retagged, classify_record(&fresh));
        assert_eq!(retagged.experience_levels, vec!["entry".to_string()]);
    }

    #[test]
    fn test_reclassification_is_stable_across_passes() {
        let first = classify_record(&record(
            "senior rust engineer",
            "remote, kubernetes and postgres",
            None,
        ));
        let again = classify_record(&record(
            "senior rust engineer",
            "remote, kubernetes and postgres",
            Some(first.experience_levels[0].as_str()),
        ));
        assert_eq!(first, again);
        assert_eq!(first.experience_levels, vec!["senior".to_string()]);
    }
}
