//! Arbeitnow: mostly European listings with a `remote` flag and no location filter.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;

use super::http::get_json;
use super::location::location_compatible;
use super::{JobSource, SourceError};
use crate::models::{JobListing, ListingDraft};

const API_URL: &str = "https://www.arbeitnow.com/api/job-board-api";
const NAME: &str = "Arbeitnow";
const MAX_RESULTS: usize = 15;
const TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ArbeitnowResponse {
    #[serde(default)]
    data: Option<Vec<ArbeitnowJob>>,
}

#[derive(Debug, Deserialize)]
struct ArbeitnowJob {
    title: Option<String>,
    company_name: Option<String>,
    location: Option<String>,
    // Both arrive as `null` on some records.
    #[serde(default)]
    remote: Option<bool>,
    #[serde(default)]
    job_types: Option<Vec<String>>,
    /// Unix seconds.
    created_at: Option<i64>,
    url: Option<String>,
    logo: Option<String>,
}

pub struct ArbeitnowSource {
    client: reqwest::Client,
}

impl ArbeitnowSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobSource for ArbeitnowSource {
    fn name(&self) -> &str {
        NAME
    }

    fn timeout(&self) -> Duration {
        TIMEOUT
    }

    fn max_results(&self) -> usize {
        MAX_RESULTS
    }

    async fn fetch(&self, query: &str, location: &str) -> Result<Vec<JobListing>, SourceError> {
        let response: ArbeitnowResponse =
            get_json(&self.client, API_URL, &[("search", query)], TIMEOUT).await?;
        Ok(map_jobs(response, location))
    }
}

fn map_jobs(response: ArbeitnowResponse, requested_location: &str) -> Vec<JobListing> {
    response
        .data
        .unwrap_or_default()
        .into_iter()
        .take(MAX_RESULTS)
        .filter_map(|job| {
            let remote = job.remote.unwrap_or(false);
            let base_location = job
                .location
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| "Remote".to_string());

            if !location_compatible(requested_location, &base_location, remote) {
                return None;
            }

            let location = if remote && !base_location.to_lowercase().contains("remote") {
                format!("{base_location} (Remote)")
            } else {
                base_location
            };

            let employment_type = job
                .job_types
                .filter(|types| !types.is_empty())
                .map(|types| types.join(", "));

            ListingDraft {
                title: job.title,
                company: job.company_name,
                location: Some(location),
                salary: None,
                date_posted: job.created_at.and_then(format_unix_date),
                seniority: None,
                employment_type,
                logo_url: job.logo,
                apply_link: job.url,
            }
            .into_listing(NAME)
        })
        .collect()
}

fn format_unix_date(seconds: i64) -> Option<String> {
    DateTime::from_timestamp(seconds, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}
