use std::fmt::Write;

use crate::models::{ScoutReport, NOT_SPECIFIED};

/// Markdown rendering of a finished report, for clients that want a document instead of JSON.
pub fn render_markdown(report: &ScoutReport, query: &str, location: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Job Matches: {query} ({location})");
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", report.summary);

    for (rank, job) in report.jobs.iter().enumerate() {
        let l = &job.listing;
        let _ = writeln!(out);
        let _ = writeln!(out, "## {}. {} at {}", rank + 1, l.title, l.company);
        let _ = writeln!(out);
        let _ = writeln!(out, "- **Match score**: {}/100", job.match_score);
        for (label, value) in [
            ("Location", &l.location),
            ("Salary", &l.salary),
            ("Seniority", &l.seniority),
            ("Employment type", &l.employment_type),
            ("Posted", &l.date_posted),
        ] {
            if value != NOT_SPECIFIED {
                let _ = writeln!(out, "- **{label}**: {value}");
            }
        }
        let _ = writeln!(out, "- **Source**: {}", l.source);
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", job.match_reason);
        let _ = writeln!(out);
        let _ = writeln!(out, "[Apply]({})", l.apply_link);
    }

    out
}
