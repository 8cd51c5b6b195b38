//! Best-effort recovery of a [`ScoredBatch`] from scorer text that failed the strict parse.

use super::fit_scoring::{ListingScore, ScoredBatch, ScoringError};
use crate::llm_client::strip_json_fences;

/// Strips code fences, then tries the text as-is and finally the outermost JSON object or
/// array inside it. Accepts either a `{"scores": [...]}` object or a bare array of scores.
pub fn extract_scored_batch(text: &str) -> Result<ScoredBatch, ScoringError> {
    let stripped = strip_json_fences(text);
    if let Some(batch) = parse_batch(stripped) {
        return Ok(batch);
    }

    let candidate = outermost_json(stripped)
        .ok_or_else(|| ScoringError::Malformed("no JSON object or array in reply".to_string()))?;
    parse_batch(candidate).ok_or_else(|| {
        ScoringError::Malformed(format!(
            "embedded JSON does not match the score schema: {}",
            preview(candidate)
        ))
    })
}

fn parse_batch(text: &str) -> Option<ScoredBatch> {
    serde_json::from_str::<ScoredBatch>(text)
        .ok()
        .or_else(|| {
            serde_json::from_str::<Vec<ListingScore>>(text)
                .ok()
                .map(|scores| ScoredBatch {
                    scores,
                    commentary: None,
                })
        })
}

/// Slice from the first `{` or `[` to the last matching closer.
fn outermost_json(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let closer = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(closer)?;
    (end > start).then(|| &text[start..=end])
}

fn preview(text: &str) -> String {
    text.chars().take(120).collect()
}
