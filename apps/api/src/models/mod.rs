pub mod job;
pub mod profile;

pub use job::{JobListing, ListingDraft, MatchedJob, ScoutReport, NOT_SPECIFIED};
pub use profile::CandidateProfile;
