//! Hacker News job posts (YC companies) via the Algolia search API.
//!
//! Posts only carry a free-text title, so company and seniority are inferred from it.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::http::{date_part, get_json};
use super::{JobSource, SourceError};
use crate::models::{JobListing, ListingDraft};

const API_URL: &str = "https://hn.algolia.com/api/v1/search";
const ITEM_URL: &str = "https://news.ycombinator.com/item?id=";
const YC_LOGO: &str = "https://upload.wikimedia.org/wikipedia/commons/b/b2/Y_Combinator_logo.svg";
const NAME: &str = "HackerNews";
const MAX_RESULTS: usize = 10;
const TIMEOUT: Duration = Duration::from_secs(10);
const FALLBACK_COMPANY: &str = "YC Startup";

#[derive(Debug, Deserialize)]
struct AlgoliaResponse {
    #[serde(default)]
    hits: Vec<AlgoliaHit>,
}

#[derive(Debug, Deserialize)]
struct AlgoliaHit {
    title: Option<String>,
    url: Option<String>,
    #[serde(rename = "objectID")]
    object_id: Option<String>,
    created_at: Option<String>,
}

pub struct HackerNewsSource {
    client: reqwest::Client,
}

impl HackerNewsSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobSource for HackerNewsSource {
    fn name(&self) -> &str {
        NAME
    }

    fn timeout(&self) -> Duration {
        TIMEOUT
    }

    fn max_results(&self) -> usize {
        MAX_RESULTS
    }

    async fn fetch(&self, query: &str, _location: &str) -> Result<Vec<JobListing>, SourceError> {
        let response: AlgoliaResponse = get_json(
            &self.client,
            API_URL,
            &[("query", query), ("tags", "job")],
            TIMEOUT,
        )
        .await?;
        Ok(map_hits(response))
    }
}

fn map_hits(response: AlgoliaResponse) -> Vec<JobListing> {
    response
        .hits
        .into_iter()
        .take(MAX_RESULTS)
        .filter_map(|hit| {
            let title = hit.title.filter(|t| !t.trim().is_empty())?;
            let link = hit
                .url
                .filter(|u| !u.trim().is_empty())
                .or_else(|| hit.object_id.map(|id| format!("{ITEM_URL}{id}")));

            ListingDraft {
                company: Some(company_from_title(&title)),
                seniority: seniority_from_title(&title).map(str::to_string),
                title: Some(title),
                location: Some("Remote (Global) / YC".to_string()),
                salary: None,
                date_posted: hit.created_at.as_deref().map(date_part),
                employment_type: Some("Full Time".to_string()),
                logo_url: Some(YC_LOGO.to_string()),
                apply_link: link,
            }
            .into_listing(NAME)
        })
        .collect()
}

/// Pulls the company name out of titles such as `"Acme (YC S21) is hiring a Rust engineer"`,
/// `"Backend Engineer at Acme"` or `"Acme: Backend Engineer"`.
fn company_from_title(title: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `title`.
    let lower = title.to_ascii_lowercase();

    let company = if let Some(idx) = lower.find(" is hiring") {
        strip_batch(&title[..idx])
    } else if let Some(idx) = lower.find(" hiring ") {
        strip_batch(&title[..idx])
    } else if let Some(idx) = lower.rfind(" at ") {
        title[idx + 4..].trim()
    } else if let Some(idx) = title.find(':') {
        title[..idx].trim()
    } else {
        ""
    };

    if company.is_empty() {
        FALLBACK_COMPANY.to_string()
    } else {
        company.to_string()
    }
}

/// Drops a trailing batch marker such as `(YC S21)`.
fn strip_batch(company_part: &str) -> &str {
    company_part
        .split('(')
        .next()
        .unwrap_or(company_part)
        .trim()
}

fn seniority_from_title(title: &str) -> Option<&'static str> {
    let lower = title.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let has = |w: &str| words.contains(&w);

    if has("senior") || has("sr") {
        Some("Senior")
    } else if has("junior") || has("jr") {
        Some("Junior")
    } else if has("staff") || has("principal") {
        Some("Staff")
    } else if has("lead") {
        Some("Lead")
    } else if has("intern") || has("internship") {
        Some("Intern")
    } else {
        None
    }
}
