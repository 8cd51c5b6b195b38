//! Match scoring: pluggable, trait-based scorer that rates normalized listings against the
//! candidate profile.
//!
//! Default without an API key: `KeywordMatchScorer` (deterministic, no network).
//! With a key: `LlmMatchScorer` (semantic, via Claude).
//!
//! `AppState` holds an `Arc<dyn MatchScorer>`, picked at startup via config.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::prompts::{scoring_system, LOCATION_RULE, SCORING_PROMPT_TEMPLATE};
use crate::llm_client::LlmClient;
use crate::models::{CandidateProfile, JobListing, NOT_SPECIFIED};

// ────────────────────────────────────────────────────────────────────────────
// Output data models (shared across all scorer backends)
// ────────────────────────────────────────────────────────────────────────────

/// Score for one listing, identified by its position in the scorer's input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingScore {
    pub index: usize,
    /// Raw score as produced by the backend; the pipeline clamps it into 1..=100.
    #[serde(alias = "score")]
    pub match_score: f64,
    #[serde(default, alias = "reason")]
    pub match_reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredBatch {
    pub scores: Vec<ListingScore>,
    /// Optional free-text remark on the batch as a whole.
    #[serde(default, alias = "summary")]
    pub commentary: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScorerOutput {
    Structured(ScoredBatch),
    /// Reply that did not parse as a [`ScoredBatch`]; the pipeline attempts one recovery.
    Unstructured(String),
}

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("scorer unavailable: {0}")]
    Unavailable(String),

    #[error("scorer output could not be interpreted: {0}")]
    Malformed(String),

    #[error("scorer timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Carried in `AppState` as `Arc<dyn MatchScorer>`. Implementations must not invent listings;
/// every score refers back to an input index.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    /// Short backend name for logs: `"keyword"` or `"llm"`.
    fn backend(&self) -> &'static str;

    async fn score(
        &self,
        profile: &CandidateProfile,
        listings: &[JobListing],
    ) -> Result<ScorerOutput, ScoringError>;
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordMatchScorer
// ────────────────────────────────────────────────────────────────────────────

/// Keyword overlap between the profile and each listing's role text.
///
/// strength = 0.6 × skill coverage + 0.25 × goal coverage + 0.15 × seniority alignment,
/// where coverage saturates at two hits. Listings with neither a skill nor a goal hit are
/// left unscored.
pub struct KeywordMatchScorer;

#[async_trait]
impl MatchScorer for KeywordMatchScorer {
    fn backend(&self) -> &'static str {
        "keyword"
    }

    async fn score(
        &self,
        profile: &CandidateProfile,
        listings: &[JobListing],
    ) -> Result<ScorerOutput, ScoringError> {
        Ok(ScorerOutput::Structured(compute_keyword_matches(
            profile, listings,
        )))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmMatchScorer
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmMatchScorer(pub LlmClient);

#[async_trait]
impl MatchScorer for LlmMatchScorer {
    fn backend(&self) -> &'static str {
        "llm"
    }

    async fn score(
        &self,
        profile: &CandidateProfile,
        listings: &[JobListing],
    ) -> Result<ScorerOutput, ScoringError> {
        let prompt = build_scoring_prompt(profile, listings)?;
        let reply = self
            .0
            .call_text(&prompt, &scoring_system())
            .await
            .map_err(|e| ScoringError::Unavailable(e.to_string()))?;
        Ok(parse_reply(reply))
    }
}

#[derive(Serialize)]
struct PromptListing<'a> {
    index: usize,
    title: &'a str,
    company: &'a str,
    location: &'a str,
    salary: &'a str,
    seniority: &'a str,
    employment_type: &'a str,
    date_posted: &'a str,
}

fn build_scoring_prompt(
    profile: &CandidateProfile,
    listings: &[JobListing],
) -> Result<String, ScoringError> {
    let entries: Vec<PromptListing<'_>> = listings
        .iter()
        .enumerate()
        .map(|(index, l)| PromptListing {
            index,
            title: &l.title,
            company: &l.company,
            location: &l.location,
            salary: &l.salary,
            seniority: &l.seniority,
            employment_type: &l.employment_type,
            date_posted: &l.date_posted,
        })
        .collect();
    let listings_json = serde_json::to_string_pretty(&entries)
        .map_err(|e| ScoringError::Unavailable(format!("could not encode listings: {e}")))?;

    Ok(SCORING_PROMPT_TEMPLATE
        .replace("{profile}", &profile.prompt_text())
        .replace("{listings_json}", &listings_json)
        .replace("{location_rule}", LOCATION_RULE))
}

/// Strict parse only. Anything else goes back to the pipeline untouched.
fn parse_reply(reply: String) -> ScorerOutput {
    match serde_json::from_str::<ScoredBatch>(reply.trim()) {
        Ok(batch) => ScorerOutput::Structured(batch),
        Err(e) => {
            debug!("Scorer reply is not strict JSON ({e})");
            ScorerOutput::Unstructured(reply)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core keyword algorithm
// ────────────────────────────────────────────────────────────────────────────

const SKILL_WEIGHT: f64 = 0.6;
const GOAL_WEIGHT: f64 = 0.25;
const SENIORITY_WEIGHT: f64 = 0.15;

/// Words too generic to count as a goal hit.
const GOAL_STOP_WORDS: &[&str] = &[
    "about", "also", "company", "environment", "from", "have", "into", "job", "like", "looking",
    "more", "opportunity", "position", "role", "roles", "some", "team", "that", "their", "there",
    "this", "want", "where", "which", "with", "work", "working", "would",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Level {
    Entry,
    Mid,
    Senior,
    Staff,
}

fn compute_keyword_matches(profile: &CandidateProfile, listings: &[JobListing]) -> ScoredBatch {
    let skills = profile.skill_phrases();
    let goals = goal_keywords(&profile.goals);
    let candidate_level = profile.stated_years().map(level_for_years);

    let scores = listings
        .iter()
        .enumerate()
        .filter_map(|(index, listing)| {
            let role_text = format!(
                "{} {} {}",
                listing.title, listing.seniority, listing.employment_type
            );
            let role_words = tokens(&role_text);
            let mut goal_words = role_words.clone();
            goal_words.extend(tokens(&listing.location));

            let skill_hits: Vec<&str> = skills
                .iter()
                .map(String::as_str)
                .filter(|s| contains_phrase(&role_words, s))
                .collect();
            let goal_hits: Vec<&str> = goals
                .iter()
                .map(String::as_str)
                .filter(|g| contains_phrase(&goal_words, g))
                .collect();

            if skill_hits.is_empty() && goal_hits.is_empty() {
                return None;
            }

            let listing_level = level_for_listing(listing);
            let strength = SKILL_WEIGHT * saturating_coverage(skill_hits.len())
                + GOAL_WEIGHT * saturating_coverage(goal_hits.len())
                + SENIORITY_WEIGHT * seniority_alignment(candidate_level, listing_level);

            Some(ListingScore {
                index,
                match_score: (strength * 100.0).round().clamp(1.0, 100.0),
                match_reason: keyword_reason(&skill_hits, &goal_hits, candidate_level, listing_level),
            })
        })
        .collect();

    ScoredBatch {
        scores,
        commentary: None,
    }
}

fn saturating_coverage(hits: usize) -> f64 {
    (hits as f64 / 2.0).min(1.0)
}

/// Lowercased words; `+` and `#` count as word characters so `c++` and `c#` survive.
fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn contains_phrase(words: &[String], phrase: &str) -> bool {
    let needle = tokens(phrase);
    !needle.is_empty()
        && words.len() >= needle.len()
        && words.windows(needle.len()).any(|w| w == needle.as_slice())
}

fn goal_keywords(goals: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for word in tokens(goals) {
        if word.chars().count() >= 4
            && !GOAL_STOP_WORDS.contains(&word.as_str())
            && !keywords.contains(&word)
        {
            keywords.push(word);
        }
    }
    keywords
}

fn level_for_years(years: u32) -> Level {
    match years {
        0..=1 => Level::Entry,
        2..=4 => Level::Mid,
        5..=7 => Level::Senior,
        _ => Level::Staff,
    }
}

fn level_for_listing(listing: &JobListing) -> Option<Level> {
    let mut words = tokens(&listing.title);
    if listing.seniority != NOT_SPECIFIED {
        words.extend(tokens(&listing.seniority));
    }
    let has = |candidates: &[&str]| words.iter().any(|w| candidates.contains(&w.as_str()));

    if has(&["staff", "principal", "lead", "head", "director"]) {
        Some(Level::Staff)
    } else if has(&["senior", "sr"]) {
        Some(Level::Senior)
    } else if has(&["mid", "intermediate", "midweight"]) {
        Some(Level::Mid)
    } else if has(&["junior", "jr", "entry", "intern", "internship", "graduate"]) {
        Some(Level::Entry)
    } else {
        None
    }
}

/// 1.0 for the same level, 0.5 one level apart or when either side is unknown, else 0.0.
fn seniority_alignment(candidate: Option<Level>, listing: Option<Level>) -> f64 {
    match (candidate, listing) {
        (Some(c), Some(l)) => match (c as i32 - l as i32).abs() {
            0 => 1.0,
            1 => 0.5,
            _ => 0.0,
        },
        _ => 0.5,
    }
}

fn keyword_reason(
    skill_hits: &[&str],
    goal_hits: &[&str],
    candidate: Option<Level>,
    listing: Option<Level>,
) -> String {
    let mut parts = Vec::new();
    if !skill_hits.is_empty() {
        parts.push(format!("Role mentions your skills: {}", skill_hits.join(", ")));
    }
    if !goal_hits.is_empty() {
        parts.push(format!("in line with your goals ({})", goal_hits.join(", ")));
    }
    if let (Some(c), Some(l)) = (candidate, listing) {
        parts.push(if c == l {
            "seniority matches your experience".to_string()
        } else if (c as i32 - l as i32).abs() == 1 {
            "seniority is close to your experience".to_string()
        } else {
            "seniority differs from your experience".to_string()
        });
    }

    let mut reason = parts.join("; ");
    if let Some(first) = reason.get(..1) {
        let upper = first.to_uppercase();
        reason.replace_range(..1, &upper);
    }
    reason.push('.');
    reason
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::tests::listing;

    fn profile() -> CandidateProfile {
        CandidateProfile {
            experience: "6 years building backend services".to_string(),
            skills: "Rust, Python, PostgreSQL".to_string(),
            goals: "Remote backend role with a product team".to_string(),
        }
    }

    fn titled(title: &str, idx: usize) -> JobListing {
        listing(title, "Acme", &format!("https://acme.dev/jobs/{idx}"), "Jobicy")
    }

    fn batch(output: ScorerOutput) -> ScoredBatch {
        match output {
            ScorerOutput::Structured(batch) => batch,
            ScorerOutput::Unstructured(text) => panic!("unexpected unstructured output: {text}"),
        }
    }

    #[tokio::test]
    async fn test_keyword_scorer_full_match_scores_100() {
        let listings = vec![titled("Senior Rust Python Backend Engineer", 0)];
        let result = batch(KeywordMatchScorer.score(&profile(), &listings).await.unwrap());

        assert_eq!(result.scores.len(), 1);
        assert_eq!(result.scores[0].index, 0);
        assert_eq!(result.scores[0].match_score, 100.0);
        assert!(result.scores[0].match_reason.starts_with("Role mentions your skills: rust, python"));
    }

    #[tokio::test]
    async fn test_keyword_scorer_skips_unrelated_listings() {
        let mut unrelated = titled("Account Executive", 1);
        unrelated.location = "Berlin".to_string();
        let listings = vec![titled("Rust Engineer", 0), unrelated];

        let result = batch(KeywordMatchScorer.score(&profile(), &listings).await.unwrap());
        let indices: Vec<usize> = result.scores.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0]);
    }

    #[tokio::test]
    async fn test_keyword_scorer_prefers_better_matches() {
        let listings = vec![
            titled("Junior Python Developer", 0),
            titled("Senior Rust Backend Engineer", 1),
        ];
        let result = batch(KeywordMatchScorer.score(&profile(), &listings).await.unwrap());

        assert_eq!(result.scores.len(), 2);
        assert!(result.scores[1].match_score > result.scores[0].match_score);
        for score in &result.scores {
            assert!((1.0..=100.0).contains(&score.match_score));
        }
    }

    #[test]
    fn test_contains_phrase_respects_word_boundaries() {
        let words = tokens("Senior Golang Engineer (Node.js)");
        assert!(!contains_phrase(&words, "go"));
        assert!(contains_phrase(&words, "golang"));
        assert!(contains_phrase(&words, "node.js"));
        assert!(contains_phrase(&tokens("C++ Developer"), "c++"));
    }

    #[test]
    fn test_goal_keywords_drop_filler() {
        assert_eq!(
            goal_keywords("Looking for a remote role with a product team, remote first"),
            vec!["remote", "product", "first"]
        );
    }

    #[test]
    fn test_seniority_alignment() {
        assert_eq!(seniority_alignment(Some(Level::Senior), Some(Level::Senior)), 1.0);
        assert_eq!(seniority_alignment(Some(Level::Mid), Some(Level::Senior)), 0.5);
        assert_eq!(seniority_alignment(Some(Level::Entry), Some(Level::Staff)), 0.0);
        assert_eq!(seniority_alignment(None, Some(Level::Staff)), 0.5);
        assert_eq!(level_for_years(6), Level::Senior);
    }

    #[test]
    fn test_parse_reply_strict_json_is_structured() {
        let reply = r#"{"scores":[{"index":1,"match_score":72,"match_reason":"Good fit"}]}"#;
        let out = batch(parse_reply(reply.to_string()));
        assert_eq!(out.scores[0].index, 1);
        assert_eq!(out.scores[0].match_score, 72.0);
        assert_eq!(out.commentary, None);
    }

    #[test]
    fn test_parse_reply_prose_is_unstructured() {
        let reply = "Here are the matches:\n```json\n{\"scores\": []}\n```".to_string();
        assert_eq!(parse_reply(reply.clone()), ScorerOutput::Unstructured(reply));
    }

    #[test]
    fn test_scoring_prompt_includes_profile_listings_and_location_rule() {
        let listings = vec![titled("Rust Engineer", 0)];
        let prompt = build_scoring_prompt(&profile(), &listings).unwrap();

        assert!(prompt.contains("- **Skills**: Rust, Python, PostgreSQL"));
        assert!(prompt.contains("\"index\": 0"));
        assert!(prompt.contains("\"title\": \"Rust Engineer\""));
        assert!(prompt.contains("CRITICAL LOCATION RULE"));
        assert!(!prompt.contains("{listings_json}"));
    }
}
