//! Fakes shared by pipeline, matching and handler tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::channel::ProgressReceiver;
use super::events::ProgressEvent;
use super::run::{PipelineContext, PipelineSettings};
use crate::matching::fit_scoring::{MatchScorer, ScoredBatch, ScorerOutput, ScoringError};
use crate::models::{CandidateProfile, JobListing, ListingDraft, NOT_SPECIFIED};
use crate::sources::{JobSource, SourceError};

pub fn sample_profile() -> CandidateProfile {
    CandidateProfile {
        experience: "6 years building backend services".to_string(),
        skills: "Rust, Python, PostgreSQL".to_string(),
        goals: "Remote backend role".to_string(),
    }
}

/// `count` distinct listings stamped with `source`.
pub fn sample_listings(source: &str, count: usize) -> Vec<JobListing> {
    let slug = source.to_lowercase();
    (0..count)
        .map(|i| {
            ListingDraft {
                title: Some(format!("Rust Engineer {source} {i}")),
                company: Some(format!("{source} Corp")),
                location: Some("Remote".to_string()),
                apply_link: Some(format!("https://{slug}.example.com/jobs/{i}")),
                ..Default::default()
            }
            .into_listing(source)
            .expect("sample listing is valid")
        })
        .collect()
}

pub fn context(sources: Vec<Arc<dyn JobSource>>, scorer: Arc<dyn MatchScorer>) -> PipelineContext {
    PipelineContext {
        sources: sources.into(),
        scorer,
        settings: PipelineSettings {
            event_buffer: 16,
            send_grace: Duration::from_millis(200),
            scoring_timeout: Duration::from_secs(5),
        },
    }
}

pub async fn collect_events(mut rx: ProgressReceiver) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

pub async fn drain_steps(rx: ProgressReceiver) -> Vec<String> {
    collect_events(rx)
        .await
        .into_iter()
        .filter_map(|e| match e {
            ProgressEvent::Step(s) => Some(s),
            _ => None,
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Sources
// ────────────────────────────────────────────────────────────────────────────

pub struct StaticSource {
    name: String,
    listings: Vec<JobListing>,
    max_results: usize,
}

impl StaticSource {
    pub fn new(name: &str, listings: Vec<JobListing>) -> Self {
        Self {
            name: name.to_string(),
            listings,
            max_results: 50,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

#[async_trait]
impl JobSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }

    fn max_results(&self) -> usize {
        self.max_results
    }

    async fn fetch(&self, _query: &str, _location: &str) -> Result<Vec<JobListing>, SourceError> {
        Ok(self.listings.clone())
    }
}

pub struct FailingSource {
    name: String,
}

impl FailingSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl JobSource for FailingSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }

    fn max_results(&self) -> usize {
        10
    }

    async fn fetch(&self, _query: &str, _location: &str) -> Result<Vec<JobListing>, SourceError> {
        Err(SourceError::Status { status: 503 })
    }
}

/// Never answers; only the coordinator's timeout ends the fetch.
pub struct HangingSource {
    name: String,
    timeout: Duration,
}

impl HangingSource {
    pub fn new(name: &str, timeout: Duration) -> Self {
        Self {
            name: name.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl JobSource for HangingSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn max_results(&self) -> usize {
        10
    }

    async fn fetch(&self, _query: &str, _location: &str) -> Result<Vec<JobListing>, SourceError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }
}

pub struct PanickingSource {
    name: String,
}

impl PanickingSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl JobSource for PanickingSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }

    fn max_results(&self) -> usize {
        10
    }

    async fn fetch(&self, _query: &str, _location: &str) -> Result<Vec<JobListing>, SourceError> {
        panic!("adapter bug");
    }
}

/// Emits a listing that bypassed `ListingDraft` validation.
pub struct InvalidSource {
    name: String,
}

impl InvalidSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl JobSource for InvalidSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }

    fn max_results(&self) -> usize {
        10
    }

    async fn fetch(&self, _query: &str, _location: &str) -> Result<Vec<JobListing>, SourceError> {
        Ok(vec![JobListing {
            title: "Rust Engineer".to_string(),
            company: String::new(),
            location: NOT_SPECIFIED.to_string(),
            salary: NOT_SPECIFIED.to_string(),
            date_posted: NOT_SPECIFIED.to_string(),
            seniority: NOT_SPECIFIED.to_string(),
            employment_type: NOT_SPECIFIED.to_string(),
            logo_url: None,
            apply_link: "https://rogue.example.com/1".to_string(),
            source: self.name.clone(),
        }])
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scorers
// ────────────────────────────────────────────────────────────────────────────

enum Script {
    Output(ScorerOutput),
    Hang,
}

pub struct ScriptedScorer {
    script: Script,
}

impl ScriptedScorer {
    pub fn structured(batch: ScoredBatch) -> Self {
        Self {
            script: Script::Output(ScorerOutput::Structured(batch)),
        }
    }

    pub fn text(reply: &str) -> Self {
        Self {
            script: Script::Output(ScorerOutput::Unstructured(reply.to_string())),
        }
    }

    pub fn hanging() -> Self {
        Self {
            script: Script::Hang,
        }
    }
}

#[async_trait]
impl MatchScorer for ScriptedScorer {
    fn backend(&self) -> &'static str {
        "scripted"
    }

    async fn score(
        &self,
        _profile: &CandidateProfile,
        _listings: &[JobListing],
    ) -> Result<ScorerOutput, ScoringError> {
        match &self.script {
            Script::Output(output) => Ok(output.clone()),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(ScoringError::Unavailable("unreachable".to_string()))
            }
        }
    }
}

/// Counts invocations and scores nothing.
#[derive(Default)]
pub struct CountingScorer {
    pub calls: AtomicUsize,
}

#[async_trait]
impl MatchScorer for CountingScorer {
    fn backend(&self) -> &'static str {
        "counting"
    }

    async fn score(
        &self,
        _profile: &CandidateProfile,
        _listings: &[JobListing],
    ) -> Result<ScorerOutput, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ScorerOutput::Structured(ScoredBatch {
            scores: Vec::new(),
            commentary: None,
        }))
    }
}

pub struct PanickingScorer;

#[async_trait]
impl MatchScorer for PanickingScorer {
    fn backend(&self) -> &'static str {
        "panicking"
    }

    async fn score(
        &self,
        _profile: &CandidateProfile,
        _listings: &[JobListing],
    ) -> Result<ScorerOutput, ScoringError> {
        panic!("scorer bug");
    }
}
