//! Remotive: keyword search only, so location is filtered client-side.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::http::{date_part, get_json};
use super::location::location_compatible;
use super::{JobSource, SourceError};
use crate::models::{JobListing, ListingDraft};

const API_URL: &str = "https://remotive.com/api/remote-jobs";
const NAME: &str = "Remotive";
const MAX_RESULTS: usize = 15;
const TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct RemotiveResponse {
    #[serde(default)]
    jobs: Vec<RemotiveJob>,
}

#[derive(Debug, Deserialize)]
struct RemotiveJob {
    title: Option<String>,
    company_name: Option<String>,
    candidate_required_location: Option<String>,
    salary: Option<String>,
    job_type: Option<String>,
    publication_date: Option<String>,
    url: Option<String>,
    company_logo: Option<String>,
}

pub struct RemotiveSource {
    client: reqwest::Client,
}

impl RemotiveSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobSource for RemotiveSource {
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
        let response: RemotiveResponse =
            get_json(&self.client, API_URL, &[("search", query)], TIMEOUT).await?;
        Ok(map_jobs(response, location))
    }
}

fn map_jobs(response: RemotiveResponse, requested_location: &str) -> Vec<JobListing> {
    // Capped before filtering so the same search always inspects the same window.
    response
        .jobs
        .into_iter()
        .take(MAX_RESULTS)
        .filter_map(|job| {
            let job_location = job
                .candidate_required_location
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| "Remote".to_string());

            if !location_compatible(requested_location, &job_location, false) {
                return None;
            }

            ListingDraft {
                title: job.title,
                company: job.company_name,
                location: Some(job_location),
                salary: job.salary,
                date_posted: job.publication_date.as_deref().map(date_part),
                seniority: None,
                employment_type: job.job_type.as_deref().map(humanize_job_type),
                logo_url: job.company_logo,
                apply_link: job.url,
            }
            .into_listing(NAME)
        })
        .collect()
}

/// `full_time` → `Full Time`.
fn humanize_job_type(raw: &str) -> String {
    raw.split(['_', '-'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
