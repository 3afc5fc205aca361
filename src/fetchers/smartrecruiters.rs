use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppError;
use crate::fetchers::{AtsFetcher, display_name_from_handle, get_json, str_field, timestamp_field};
use crate::models::job::RawJob;
use crate::sources::{Provider, SourceDescriptor};

const BASE_URL: &str = "https://api.smartrecruiters.com";

pub struct SmartRecruiters;

#[async_trait]
impl AtsFetcher for SmartRecruiters {
    async fn fetch(
        &self,
        client: &reqwest::Client,
        source: &SourceDescriptor,
    ) -> Result<Vec<RawJob>, AppError> {
        let url = postings_url(source);
        let Some(body) = get_json(client, &url).await? else {
            return Ok(vec![]);
        };
        Ok(parse_jobs(&body, &source.company_handle))
    }
}

/// Page size is tunable per source via the `limit` extra.
fn postings_url(source: &SourceDescriptor) -> String {
    let handle = &source.company_handle;
    match source.extra.get("limit") {
        Some(limit) => format!("{BASE_URL}/v1/companies/{handle}/postings?limit={limit}"),
        None => format!("{BASE_URL}/v1/companies/{handle}/postings"),
    }
}

fn parse_jobs(body: &Value, handle: &str) -> Vec<RawJob> {
    let Some(postings) = body.get("content").and_then(|v| v.as_array()) else {
        return vec![];
    };

    postings
        .iter()
        .map(|raw| RawJob {
            title: str_field(raw, "name"),
            company_display_name: raw
                .pointer("/company/name")
                .and_then(|v| v.as_str())
                .map(String::from)
                .unwrap_or_else(|| display_name_from_handle(handle)),
            location: location(raw),
            description: description(raw),
            skills: vec![],
            apply_url: str_field(raw, "applyUrl"),
            provider: Provider::SmartRecruiters,
            external_id: str_field(raw, "id"),
            posted_at: timestamp_field(raw, "releasedDate"),
        })
        .collect()
}

/// The description lives deep under `jobAd.sections.jobDescription.text`;
/// any missing intermediate key degrades to ''.
fn description(raw: &Value) -> String {
    raw.pointer("/jobAd/sections/jobDescription/text")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn location(raw: &Value) -> String {
    let city = raw
        .pointer("/location/city")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let country = raw
        .pointer("/location/country")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    match (city.is_empty(), country.is_empty()) {
        (false, false) => format!("{city}, {country}"),
        (false, true) => city.to_string(),
        (true, false) => country.to_string(),
        (true, true) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_content_wrapper_and_nested_description() {
        let body = json!({
            "content": [{
                "id": "744000012",
                "name": "Embedded Engineer",
                "company": {"name": "Bosch Group"},
                "location": {"city": "Stuttgart", "country": "de"},
                "releasedDate": "2024-04-11T08:00:00Z",
                "applyUrl": "https://jobs.smartrecruiters.com/Bosch/744000012",
                "jobAd": {"sections": {"jobDescription": {"text": "Firmware for brakes"}}}
            }]
        });
        let jobs = parse_jobs(&body, "bosch");
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].company_display_name, "Bosch Group");
        assert_eq!(jobs[0].description, "Firmware for brakes");
        assert_eq!(jobs[0].location, "Stuttgart, de");
    }

    #[test]
    fn test_missing_intermediate_keys_default_to_empty() {
        let body = json!({"content": [{"id": "1", "name": "QA", "jobAd": {}}]});
        let jobs = parse_jobs(&body, "bosch");
        assert_eq!(jobs[0].description, "");
        assert_eq!(jobs[0].company_display_name, "Bosch");
        assert_eq!(jobs[0].location, "");
    }

    #[test]
    fn test_missing_content_treated_as_empty() {
        assert!(parse_jobs(&json!({"totalFound": 0}), "bosch").is_empty());
    }

    #[test]
    fn test_postings_url_honors_limit_extra() {
        let plain = SourceDescriptor::new(Provider::SmartRecruiters, "bosch");
        assert_eq!(
            postings_url(&plain),
            "https://api.smartrecruiters.com/v1/companies/bosch/postings"
        );

        let limited = plain.clone().with_extra("limit", "100");
        assert_eq!(
            postings_url(&limited),
            "https://api.smartrecruiters.com/v1/companies/bosch/postings?limit=100"
        );
    }
}
