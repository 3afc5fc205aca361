use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::AppError;
use crate::fetchers::{AtsFetcher, display_name_from_handle, get_json, str_field};
use crate::models::job::RawJob;
use crate::sources::{Provider, SourceDescriptor};

const BASE_URL: &str = "https://api.lever.co";

pub struct Lever;

#[async_trait]
impl AtsFetcher for Lever {
    async fn fetch(
        &self,
        client: &reqwest::Client,
        source: &SourceDescriptor,
    ) -> Result<Vec<RawJob>, AppError> {
        let handle = &source.company_handle;
        let url = format!("{BASE_URL}/v0/postings/{handle}?mode=json");
        let Some(body) = get_json(client, &url).await? else {
            return Ok(vec![]);
        };
        Ok(parse_jobs(&body, handle))
    }
}

fn parse_jobs(body: &Value, handle: &str) -> Vec<RawJob> {
    // The postings endpoint returns a bare array; anything else (e.g. an
    // error object) is treated as no jobs.
    let Some(postings) = body.as_array() else {
        return vec![];
    };

    postings
        .iter()
        .map(|raw| RawJob {
            title: str_field(raw, "text"),
            company_display_name: display_name_from_handle(handle),
            location: location(raw),
            description: first_non_empty(raw, &["descriptionPlain", "description"]),
            skills: vec![],
            apply_url: first_non_empty(raw, &["hostedUrl", "applyUrl"]),
            provider: Provider::Lever,
            external_id: str_field(raw, "id"),
            posted_at: created_at(raw),
        })
        .collect()
}

/// First non-empty of `categories.location` or the top-level `location`.
fn location(raw: &Value) -> String {
    let nested = raw
        .pointer("/categories/location")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    if !nested.is_empty() {
        return nested.to_string();
    }
    str_field(raw, "location")
}

fn first_non_empty(raw: &Value, keys: &[&str]) -> String {
    keys.iter()
        .map(|k| str_field(raw, k))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

/// Lever timestamps are epoch milliseconds.
fn created_at(raw: &Value) -> DateTime<Utc> {
    raw.get("createdAt")
        .and_then(|v| v.as_i64())
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_else(Utc::now)
}
