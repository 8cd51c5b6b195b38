//! Normalizer: validates the canonical schema and collapses duplicate postings.
//!
//! Two listings are the same posting when their apply links point at the same resource, or,
//! failing that, when title and company match case-insensitively and their locations overlap.
//! The surviving record is the one with more populated fields; it keeps the slot of the first
//! occurrence so output order follows the fetch order.

use std::collections::HashMap;

use tracing::debug;
use url::Url;

use super::PipelineFault;
use crate::models::JobListing;
use crate::sources::location::locations_overlap;

pub fn normalize(listings: Vec<JobListing>) -> Result<Vec<JobListing>, PipelineFault> {
    let mut kept: Vec<JobListing> = Vec::with_capacity(listings.len());
    let mut slot_by_link: HashMap<String, usize> = HashMap::new();

    for listing in listings {
        if let Some(field) = listing.missing_required_field() {
            return Err(PipelineFault::InvalidListing {
                source_name: listing.source.clone(),
                field,
            });
        }

        let key = link_key(&listing.apply_link);
        let existing = slot_by_link
            .get(&key)
            .copied()
            .or_else(|| kept.iter().position(|k| same_posting(k, &listing)));

        match existing {
            Some(slot) => {
                slot_by_link.entry(key).or_insert(slot);
                let current = &kept[slot];
                debug!(
                    title = %listing.title,
                    kept_source = %current.source,
                    duplicate_source = %listing.source,
                    "Duplicate posting"
                );
                if listing.populated_fields() > current.populated_fields() {
                    kept[slot] = listing;
                }
            }
            None => {
                slot_by_link.insert(key, kept.len());
                kept.push(listing);
            }
        }
    }

    Ok(kept)
}

/// Scheme-insensitive identity of an apply link: lowercase host, port, path without a trailing
/// slash, and the query string. Fragments are ignored.
fn link_key(link: &str) -> String {
    let link = link.trim();
    match Url::parse(link) {
        Ok(url) => {
            let mut key = url.host_str().unwrap_or_default().to_ascii_lowercase();
            if let Some(port) = url.port() {
                key.push_str(&format!(":{port}"));
            }
            key.push_str(url.path().trim_end_matches('/'));
            if let Some(query) = url.query().filter(|q| !q.is_empty()) {
                key.push('?');
                key.push_str(query);
            }
            key
        }
        Err(_) => link.trim_end_matches('/').to_lowercase(),
    }
}

fn same_posting(a: &JobListing, b: &JobListing) -> bool {
    fold(&a.title) == fold(&b.title)
        && fold(&a.company) == fold(&b.company)
        && locations_overlap(&a.location, &b.location)
}

fn fold(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
