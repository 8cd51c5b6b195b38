use serde::{Deserialize, Serialize};
use url::Url;

/// Placeholder for any listing field the provider did not supply.
pub const NOT_SPECIFIED: &str = "Not specified";

/// A job posting in the pipeline's unified schema, independent of the provider it came from.
///
/// `title`, `company`, `link` and `source` are never empty. Every other text field holds
/// [`NOT_SPECIFIED`] instead of being absent. Build one through [`ListingDraft`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub date_posted: String,
    pub seniority: String,
    pub employment_type: String,
    #[serde(rename = "logo", default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(rename = "link")]
    pub apply_link: String,
    pub source: String,
}

impl JobListing {
    /// Number of optional fields carrying real data. Used to pick the richer of two duplicates.
    pub fn populated_fields(&self) -> usize {
        let text_fields = [
            &self.location,
            &self.salary,
            &self.date_posted,
            &self.seniority,
            &self.employment_type,
        ];
        text_fields.iter().filter(|f| f.as_str() != NOT_SPECIFIED).count()
            + usize::from(self.logo_url.is_some())
    }

    /// Returns the name of the first required field that is empty, if any.
    pub fn missing_required_field(&self) -> Option<&'static str> {
        [
            ("title", &self.title),
            ("company", &self.company),
            ("link", &self.apply_link),
            ("source", &self.source),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

/// Loosely-typed listing as an adapter pulls it out of a provider payload.
#[derive(Debug, Clone, Default)]
pub struct ListingDraft {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub date_posted: Option<String>,
    pub seniority: Option<String>,
    pub employment_type: Option<String>,
    pub logo_url: Option<String>,
    pub apply_link: Option<String>,
}

impl ListingDraft {
    /// Converts the draft into a canonical listing.
    ///
    /// Returns `None` when the title, company or link is missing, or when the link is not an
    /// absolute http(s) URL. Blank optional fields become [`NOT_SPECIFIED`].
    pub fn into_listing(self, source: &str) -> Option<JobListing> {
        let title = required(self.title)?;
        let company = required(self.company)?;
        let apply_link = required(self.apply_link)?;

        let parsed = Url::parse(&apply_link).ok()?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return None;
        }

        Some(JobListing {
            title,
            company,
            location: or_not_specified(self.location),
            salary: or_not_specified(self.salary),
            date_posted: or_not_specified(self.date_posted),
            seniority: or_not_specified(self.seniority),
            employment_type: or_not_specified(self.employment_type),
            logo_url: required(self.logo_url),
            apply_link,
            source: source.to_string(),
        })
    }
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn or_not_specified(value: Option<String>) -> String {
    required(value).unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

/// A listing the scorer rated against the candidate profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedJob {
    #[serde(flatten)]
    pub listing: JobListing,
    /// Always within 1..=100.
    pub match_score: u8,
    pub match_reason: String,
}

/// The single consolidated result of a run. `jobs` is ordered by descending score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoutReport {
    pub summary: String,
    pub jobs: Vec<MatchedJob>,
}

pub const GENERATION_FAILED_SUMMARY: &str = "Report generation failed. Please try again.";

impl ScoutReport {
    /// Empty report returned when the scorer could not produce usable output.
    pub fn generation_failed() -> Self {
        Self {
            summary: GENERATION_FAILED_SUMMARY.to_string(),
            jobs: Vec::new(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn listing(title: &str, company: &str, link: &str, source: &str) -> JobListing {
        ListingDraft {
            title: Some(title.to_string()),
            company: Some(company.to_string()),
            location: Some("Remote".to_string()),
            apply_link: Some(link.to_string()),
            ..Default::default()
        }
        .into_listing(source)
        .unwrap()
    }

    #[test]
    fn test_draft_fills_missing_fields_with_sentinel() {
        let listing = ListingDraft {
            title: Some("Backend Engineer".to_string()),
            company: Some("Acme".to_string()),
            salary: Some("   ".to_string()),
            apply_link: Some("https://acme.dev/jobs/1".to_string()),
            ..Default::default()
        }
        .into_listing("Remotive")
        .unwrap();

        assert_eq!(listing.location, NOT_SPECIFIED);
        assert_eq!(listing.salary, NOT_SPECIFIED);
        assert_eq!(listing.seniority, NOT_SPECIFIED);
        assert_eq!(listing.logo_url, None);
        assert_eq!(listing.source, "Remotive");
        assert_eq!(listing.populated_fields(), 0);
    }

    #[test]
    fn test_draft_without_title_is_rejected() {
        let draft = ListingDraft {
            company: Some("Acme".to_string()),
            apply_link: Some("https://acme.dev/jobs/1".to_string()),
            ..Default::default()
        };
        assert!(draft.into_listing("Jobicy").is_none());
    }

    #[test]
    fn test_draft_with_unresolvable_link_is_rejected() {
        for link in ["not a url", "/jobs/1", "mailto:jobs@acme.dev", "ftp://acme.dev/x"] {
            let draft = ListingDraft {
                title: Some("Engineer".to_string()),
                company: Some("Acme".to_string()),
                apply_link: Some(link.to_string()),
                ..Default::default()
            };
            assert!(draft.into_listing("Jobicy").is_none(), "accepted {link}");
        }
    }

    #[test]
    fn test_populated_fields_counts_logo() {
        let mut listing = listing("Engineer", "Acme", "https://acme.dev/1", "Jobicy");
        assert_eq!(listing.populated_fields(), 1);
        listing.logo_url = Some("https://acme.dev/logo.png".to_string());
        listing.salary = "$100k".to_string();
        assert_eq!(listing.populated_fields(), 3);
    }

    #[test]
    fn test_matched_job_serializes_flat_snake_case() {
        let job = MatchedJob {
            listing: listing("Engineer", "Acme", "https://acme.dev/1", "Jobicy"),
            match_score: 87,
            match_reason: "Strong Rust overlap".to_string(),
        };
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["title"], "Engineer");
        assert_eq!(value["link"], "https://acme.dev/1");
        assert_eq!(value["match_score"], 87);
        assert_eq!(value["date_posted"], NOT_SPECIFIED);
        assert!(value.get("logo").is_none());
    }

    #[test]
    fn test_missing_required_field_reports_first_blank() {
        let mut listing = listing("Engineer", "Acme", "https://acme.dev/1", "Jobicy");
        assert_eq!(listing.missing_required_field(), None);
        listing.company = " ".to_string();
        assert_eq!(listing.missing_required_field(), Some("company"));
    }
}
