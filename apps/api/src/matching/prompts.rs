// LLM prompt constants for match scoring.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// Role half of the scoring system prompt; the JSON-only rules are appended by
/// [`scoring_system`].
pub const SCORER_ROLE: &str = "You are a specialist in talent acquisition and resume matching. \
    You compare job postings with a candidate's skills, experience and goals, \
    and rate how well each posting fits.";

pub fn scoring_system() -> String {
    format!("{SCORER_ROLE} {JSON_ONLY_SYSTEM}")
}

pub const LOCATION_RULE: &str = "CRITICAL LOCATION RULE: If a job is marked as 'Remote' or \
    'Remote (Global)', it is a VALID match regardless of the candidate's specific location \
    preference (e.g. USA), unless the job explicitly excludes that region. Do NOT reject remote \
    jobs just because the company is based in another country (e.g. Germany).";

/// Scoring prompt template. Replace `{profile}`, `{listings_json}` and `{location_rule}` before
/// sending.
pub const SCORING_PROMPT_TEMPLATE: &str = r#"Compare the job postings below with this candidate.

{profile}

Job postings (JSON array; "index" identifies each posting):
{listings_json}

Identify the postings where the candidate's skills and experience are a real match.
Leave out postings that are not a match at all.

{location_rule}

Return a JSON object with this EXACT schema (no extra fields):
{
  "scores": [
    {"index": 0, "match_score": 87, "match_reason": "Five years of Python backend work lines up with the role's Django and PostgreSQL stack."}
  ],
  "commentary": "One or two sentences on the overall quality of the matches."
}

Rules:
- "index" MUST be one of the indices given above. Score each posting at most once.
- "match_score" is an integer from 1 (barely relevant) to 100 (ideal fit).
- "match_reason" is one or two sentences grounded in the candidate's profile and the posting.
- Do NOT invent postings and do NOT repeat posting details; only the index is needed."#;
