use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppError;
use crate::fetchers::{AtsFetcher, display_name_from_handle, get_json, str_field, timestamp_field};
use crate::models::job::RawJob;
use crate::sources::{Provider, SourceDescriptor};

const BASE_URL: &str = "https://boards-api.greenhouse.io";

pub struct Greenhouse;

#[async_trait]
impl AtsFetcher for Greenhouse {
    async fn fetch(
        &self,
        client: &reqwest::Client,
        source: &SourceDescriptor,
    ) -> Result<Vec<RawJob>, AppError> {
        let handle = &source.company_handle;
        let url = format!("{BASE_URL}/v1/boards/{handle}/jobs?content=true");
        let Some(body) = get_json(client, &url).await? else {
            return Ok(vec![]);
        };
        Ok(parse_jobs(&body, handle))
    }
}

fn parse_jobs(body: &Value, handle: &str) -> Vec<RawJob> {
    let Some(jobs) = body.get("jobs").and_then(|v| v.as_array()) else {
        return vec![];
    };

    jobs.iter()
        .map(|raw| RawJob {
            title: str_field(raw, "title"),
            company_display_name: display_name_from_handle(handle),
            location: raw
                .pointer("/location/name")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            description: str_field(raw, "content"),
            skills: vec![],
            apply_url: str_field(raw, "absolute_url"),
            provider: Provider::Greenhouse,
            // Greenhouse job ids are numeric; keyed as their string form.
            external_id: raw
                .get("id")
                .and_then(|v| v.as_i64())
                .map(|id| id.to_string())
                .unwrap_or_default(),
            posted_at: timestamp_field(raw, "updated_at"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_maps_numeric_id_and_handle_name() {
        let body = json!({
            "jobs": [{
                "id": 101,
                "title": "Backend Engineer",
                "location": {"name": "Berlin"},
                "content": "<p>Build things</p>",
                "absolute_url": "https://boards.greenhouse.io/acme/jobs/101",
                "updated_at": "2024-05-02T09:30:00Z"
            }]
        });
        let jobs = parse_jobs(&body, "acme");
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].external_id, "101");
        assert_eq!(jobs[0].company_display_name, "Acme");
        assert_eq!(jobs[0].location, "Berlin");
        assert_eq!(jobs[0].doc_key(), "greenhouse_101");
    }

    #[test]
    fn test_parse_tolerates_missing_fields() {
        let body = json!({"jobs": [{"id": 7}]});
        let jobs = parse_jobs(&body, "acme");
        assert_eq!(jobs[0].title, "");
        assert_eq!(jobs[0].location, "");
        assert_eq!(jobs[0].apply_url, "");
    }

    #[test]
    fn test_parse_empty_on_unexpected_shape() {
        assert!(parse_jobs(&json!({"error": "not found"}), "acme").is_empty());
        assert!(parse_jobs(&json!({"jobs": "nope"}), "acme").is_empty());
    }
}
