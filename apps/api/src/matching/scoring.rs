//! Pipeline side of the scorer contract: bounded invocation, one recovery attempt for
//! unstructured output, and re-attaching scores to the canonical listings.

use std::time::Duration;

use tracing::{debug, warn};

use super::extract::extract_scored_batch;
use super::fit_scoring::{ListingScore, MatchScorer, ScorerOutput, ScoringError};
use crate::models::{CandidateProfile, JobListing, MatchedJob};

const MISSING_REASON: &str = "No rationale provided.";

#[derive(Debug)]
pub struct ScoringOutcome {
    /// Scored listings in input order.
    pub jobs: Vec<MatchedJob>,
    pub commentary: Option<String>,
    /// True when the scores came from the fallback extraction.
    pub recovered: bool,
}

pub async fn score_listings(
    scorer: &dyn MatchScorer,
    profile: &CandidateProfile,
    listings: &[JobListing],
    limit: Duration,
) -> Result<ScoringOutcome, ScoringError> {
    let output = tokio::time::timeout(limit, scorer.score(profile, listings))
        .await
        .map_err(|_| ScoringError::TimedOut(limit))??;

    let (batch, recovered) = match output {
        ScorerOutput::Structured(batch) => (batch, false),
        ScorerOutput::Unstructured(text) => {
            warn!(
                backend = scorer.backend(),
                "Scorer returned unstructured output, attempting extraction"
            );
            (extract_scored_batch(&text)?, true)
        }
    };

    Ok(ScoringOutcome {
        jobs: attach_scores(listings, batch.scores),
        commentary: batch
            .commentary
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
        recovered,
    })
}

/// Joins scores back onto listings by index. Unknown and repeated indices are ignored, scores
/// are rounded and clamped into 1..=100, and listings without a score are dropped.
pub fn attach_scores(listings: &[JobListing], scores: Vec<ListingScore>) -> Vec<MatchedJob> {
    let mut slots: Vec<Option<(u8, String)>> = vec![None; listings.len()];

    for score in scores {
        let Some(slot) = slots.get_mut(score.index) else {
            debug!(index = score.index, "Ignoring score for unknown listing index");
            continue;
        };
        if slot.is_some() {
            debug!(index = score.index, "Ignoring repeated score");
            continue;
        }
        if !score.match_score.is_finite() {
            continue;
        }

        let value = score.match_score.round().clamp(1.0, 100.0) as u8;
        let reason = score.match_reason.trim();
        let reason = if reason.is_empty() {
            MISSING_REASON.to_string()
        } else {
            reason.to_string()
        };
        *slot = Some((value, reason));
    }

    listings
        .iter()
        .zip(slots)
        .filter_map(|(listing, slot)| {
            slot.map(|(match_score, match_reason)| MatchedJob {
                listing: listing.clone(),
                match_score,
                match_reason,
            })
        })
        .collect()
}
