//! Source Adapters: one per external job board.
//!
//! Each adapter turns a `(query, location)` pair into a provider request and maps the
//! response into canonical [`JobListing`]s. Adapters are built once at startup and shared
//! read-only by every run as `Arc<dyn JobSource>`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::JobListing;

pub mod arbeitnow;
pub mod hackernews;
pub mod http;
pub mod jobicy;
pub mod location;
pub mod remotive;

/// Adapter-local failure. The fetch coordinator reports it and carries on without the adapter.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}")]
    Status { status: u16 },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("adapter task aborted: {0}")]
    Aborted(String),
}

/// A job board the pipeline can search.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Display name, stamped into every listing's `source` field.
    fn name(&self) -> &str;

    /// Upper bound for one `fetch` call, enforced by the coordinator.
    fn timeout(&self) -> Duration;

    /// Maximum number of listings a single `fetch` may return.
    fn max_results(&self) -> usize;

    async fn fetch(&self, query: &str, location: &str) -> Result<Vec<JobListing>, SourceError>;
}

pub type SourceSet = Arc<[Arc<dyn JobSource>]>;

pub const DEFAULT_SOURCES: &[&str] = &["jobicy", "remotive", "arbeitnow", "hackernews"];

/// Builds the adapters named in `names`, in that order. Unknown names are rejected.
pub fn build_sources(names: &[String], client: reqwest::Client) -> anyhow::Result<SourceSet> {
    let mut sources: Vec<Arc<dyn JobSource>> = Vec::with_capacity(names.len());

    for name in names {
        let source: Arc<dyn JobSource> = match name.to_ascii_lowercase().as_str() {
            "jobicy" => Arc::new(jobicy::JobicySource::new(client.clone())),
            "remotive" => Arc::new(remotive::RemotiveSource::new(client.clone())),
            "arbeitnow" => Arc::new(arbeitnow::ArbeitnowSource::new(client.clone())),
            "hackernews" | "hn" => Arc::new(hackernews::HackerNewsSource::new(client.clone())),
            other => anyhow::bail!(
                "Unknown job source '{other}'. Known sources: {}",
                DEFAULT_SOURCES.join(", ")
            ),
        };
        sources.push(source);
    }

    if sources.is_empty() {
        anyhow::bail!("At least one job source must be enabled");
    }

    Ok(sources.into())
}
