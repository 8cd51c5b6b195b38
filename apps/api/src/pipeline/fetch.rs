//! Fetch coordination: every adapter runs concurrently under its own timeout, and a failing
//! adapter is reported and skipped instead of failing the run.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tracing::{info, warn};

use super::channel::StepSink;
use crate::models::JobListing;
use crate::sources::{JobSource, SourceError};

/// Which adapters answered during a fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceCoverage {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
    /// Listings returned across all adapters, before de-duplication.
    pub listings_fetched: usize,
}

impl SourceCoverage {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn all_failed(&self) -> bool {
        self.total() > 0 && self.succeeded.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Adapter registration order, each adapter's own order preserved within its block.
    pub listings: Vec<JobListing>,
    pub coverage: SourceCoverage,
}

pub async fn fetch_all(
    sources: &[Arc<dyn JobSource>],
    query: &str,
    location: &str,
    steps: &StepSink,
) -> FetchOutcome {
    steps
        .step(format!(
            "Searching {} job sources for '{query}' in '{location}'",
            sources.len()
        ))
        .await;

    let attempts = sources
        .iter()
        .map(|source| fetch_one(Arc::clone(source), query, location, steps));
    let results = join_all(attempts).await;

    let mut outcome = FetchOutcome::default();
    for (source, result) in sources.iter().zip(results) {
        match result {
            Ok(mut listings) => {
                listings.truncate(source.max_results());
                outcome.coverage.succeeded.push(source.name().to_string());
                outcome.listings.extend(listings);
            }
            Err(_) => outcome.coverage.failed.push(source.name().to_string()),
        }
    }
    outcome.coverage.listings_fetched = outcome.listings.len();

    steps
        .step(format!(
            "Collected {} listings from {} of {} sources",
            outcome.coverage.listings_fetched,
            outcome.coverage.succeeded.len(),
            outcome.coverage.total()
        ))
        .await;

    outcome
}

/// Runs one adapter in its own task so a panic inside it stays local to that adapter.
async fn fetch_one(
    source: Arc<dyn JobSource>,
    query: &str,
    location: &str,
    steps: &StepSink,
) -> Result<Vec<JobListing>, SourceError> {
    let name = source.name().to_string();
    let limit = source.timeout();
    let started = Instant::now();

    steps.step(format!("Querying {name}")).await;

    let task = {
        let source = Arc::clone(&source);
        let (query, location) = (query.to_string(), location.to_string());
        tokio::spawn(async move {
            tokio::time::timeout(limit, source.fetch(&query, &location))
                .await
                .unwrap_or(Err(SourceError::Timeout(limit)))
        })
    };

    let result = match task.await {
        Ok(result) => result,
        Err(join_err) => Err(SourceError::Aborted(join_err.to_string())),
    };

    match &result {
        Ok(listings) => {
            info!(
                source = %name,
                listings = listings.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Source fetch succeeded"
            );
            steps
                .step(format!("{name}: found {} listings", listings.len()))
                .await;
        }
        Err(err) => {
            warn!(source = %name, error = %err, "Source fetch failed");
            steps
                .step(format!("{name} unavailable ({err}); continuing without it"))
                .await;
        }
    }

    result
}
