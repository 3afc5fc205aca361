use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppError;
use crate::fetchers::{AtsFetcher, display_name_from_handle, get_json, str_field, timestamp_field};
use crate::models::job::RawJob;
use crate::sources::{Provider, SourceDescriptor};

const BASE_URL: &str = "https://api.ashbyhq.com";

pub struct Ashby;

#[async_trait]
impl AtsFetcher for Ashby {
    async fn fetch(
        &self,
        client: &reqwest::Client,
        source: &SourceDescriptor,
    ) -> Result<Vec<RawJob>, AppError> {
        let handle = &source.company_handle;
        let url = format!("{BASE_URL}/posting-api/job-board/{handle}");
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
            location: str_field(raw, "location"),
            description: description(raw),
            skills: vec![],
            apply_url: str_field(raw, "applyUrl"),
            provider: Provider::Ashby,
            external_id: str_field(raw, "id"),
            posted_at: timestamp_field(raw, "publishedAt"),
        })
        .collect()
}

/// Prefer the HTML body; some boards only publish the plain one.
fn description(raw: &Value) -> String {
    let html = str_field(raw, "descriptionHtml");
    if !html.is_empty() {
        return html;
    }
    str_field(raw, "description")
}
