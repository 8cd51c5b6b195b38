//! Report Builder: orders matched jobs and writes the run summary.

use crate::models::{MatchedJob, ScoutReport};
use crate::pipeline::fetch::SourceCoverage;

/// Scores at or above this count as strong matches in the summary.
pub const STRONG_MATCH_SCORE: u8 = 80;

/// Sorts by descending score (stable, so ties keep scorer input order) and summarizes the run.
pub fn build_report(
    mut jobs: Vec<MatchedJob>,
    commentary: Option<String>,
    coverage: &SourceCoverage,
) -> ScoutReport {
    jobs.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    let summary = summarize(&jobs, commentary.as_deref(), coverage);
    ScoutReport { summary, jobs }
}

fn summarize(jobs: &[MatchedJob], commentary: Option<&str>, coverage: &SourceCoverage) -> String {
    let answered = coverage.succeeded.len();
    let total = coverage.total();

    let mut summary = if coverage.all_failed() {
        format!(
            "Found 0 matching jobs: none of the {total} job sources responded ({}). Please try again later.",
            coverage.failed.join(", ")
        )
    } else if let Some(top) = jobs.first() {
        let strong = jobs
            .iter()
            .filter(|j| j.match_score >= STRONG_MATCH_SCORE)
            .count();
        format!(
            "Found {} matching job{} from {answered} of {total} sources. Top match: {} at {} ({}/100). {} strong match{} (score {STRONG_MATCH_SCORE}+).",
            jobs.len(),
            plural(jobs.len(), "", "s"),
            top.listing.title,
            top.listing.company,
            top.match_score,
            strong,
            plural(strong, "", "es"),
        )
    } else if coverage.listings_fetched == 0 {
        format!(
            "Found 0 matching jobs: {answered} of {total} sources responded but returned no listings for this search."
        )
    } else {
        format!(
            "Found 0 matching jobs among {} listings from {answered} of {total} sources.",
            coverage.listings_fetched
        )
    };

    if !coverage.all_failed() && !coverage.failed.is_empty() {
        summary.push_str(&format!(
            " Partial results: {} did not respond.",
            coverage.failed.join(", ")
        ));
    }
    if let Some(remark) = commentary {
        summary.push(' ');
        summary.push_str(remark);
    }
    summary
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}
