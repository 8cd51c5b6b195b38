//! Jobicy: remote-only board with a native `geo` filter.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::http::{date_part, get_json, value_text};
use super::{JobSource, SourceError};
use crate::models::{JobListing, ListingDraft};

const API_URL: &str = "https://jobicy.com/api/v2/remote-jobs";
const NAME: &str = "Jobicy";
const MAX_RESULTS: usize = 20;
const TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct JobicyResponse {
    #[serde(default)]
    jobs: Vec<JobicyJob>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobicyJob {
    job_title: Option<String>,
    company_name: Option<String>,
    job_geo: Option<String>,
    annual_salary_min: Option<Value>,
    annual_salary_max: Option<Value>,
    salary_currency: Option<String>,
    job_level: Option<String>,
    /// A string or a list of strings depending on the API revision.
    job_type: Option<Value>,
    pub_date: Option<String>,
    url: Option<String>,
    company_logo: Option<String>,
}

pub struct JobicySource {
    client: reqwest::Client,
}

impl JobicySource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobSource for JobicySource {
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
        let count = MAX_RESULTS.to_string();
        let geo = geo_param(location);
        let response: JobicyResponse = get_json(
            &self.client,
            API_URL,
            &[("count", count.as_str()), ("tag", query), ("geo", geo)],
            TIMEOUT,
        )
        .await?;

        Ok(map_jobs(response))
    }
}

/// Jobicy treats an empty `geo` as "anywhere".
fn geo_param(location: &str) -> &str {
    let trimmed = location.trim();
    if trimmed.eq_ignore_ascii_case("remote") {
        ""
    } else {
        trimmed
    }
}

fn map_jobs(response: JobicyResponse) -> Vec<JobListing> {
    response
        .jobs
        .into_iter()
        .take(MAX_RESULTS)
        .filter_map(|job| {
            let geo = job.job_geo.unwrap_or_else(|| "Anywhere".to_string());
            ListingDraft {
                title: job.job_title,
                company: job.company_name,
                location: Some(format!("{geo} (Remote)")),
                salary: salary_text(
                    job.annual_salary_min.as_ref(),
                    job.annual_salary_max.as_ref(),
                    job.salary_currency.as_deref(),
                ),
                date_posted: job.pub_date.as_deref().map(date_part),
                seniority: job.job_level,
                employment_type: job.job_type.as_ref().and_then(value_text),
                logo_url: job.company_logo,
                apply_link: job.url,
            }
            .into_listing(NAME)
        })
        .collect()
}

fn salary_text(min: Option<&Value>, max: Option<&Value>, currency: Option<&str>) -> Option<String> {
    let min = min.and_then(value_text);
    let max = max.and_then(value_text);
    let amount = match (min, max) {
        (Some(min), Some(max)) if min != max => format!("{min} - {max}"),
        (Some(min), _) => min,
        (None, Some(max)) => format!("up to {max}"),
        (None, None) => return None,
    };

    Some(match currency.map(str::trim).filter(|c| !c.is_empty()) {
        Some(currency) => format!("{currency} {amount}"),
        None => amount,
    })
}
