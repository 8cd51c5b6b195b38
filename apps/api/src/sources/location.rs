//! Location compatibility between a requested location and a listing's location text.
//!
//! Remote listings match any request unless they explicitly restrict themselves to a region
//! the caller did not ask for ("Remote - EU only"). On-site listings must mention the
//! requested location.

use crate::models::NOT_SPECIFIED;

const REMOTE_MARKERS: &[&str] = &["remote", "anywhere", "worldwide", "global"];

/// Groups of names that refer to the same region.
const REGION_ALIASES: &[&[&str]] = &[
    &["us", "usa", "united states", "america", "north america"],
    &["uk", "united kingdom", "england", "great britain"],
    &["eu", "europe", "emea", "european union"],
    &["germany", "deutschland"],
    &["canada"],
    &["latam", "latin america", "south america"],
    &["apac", "asia", "asia pacific"],
];

/// Words that may sit between "only" and the region ("only in Germany").
const FILLER_WORDS: &[&str] = &["in", "from", "within", "the", "based"];

/// Decides whether a listing is acceptable for the requested location.
pub fn location_compatible(requested: &str, listing_location: &str, remote_flag: bool) -> bool {
    let requested = requested.trim().to_lowercase();
    if requested.is_empty() || requested == "remote" {
        return true;
    }

    let location = listing_location.to_lowercase();
    if location.contains(&requested) {
        return true;
    }

    if is_remote(&location, remote_flag) {
        return match restricted_region(&location) {
            Some(region) => region_matches(&requested, &region),
            None => true,
        };
    }

    false
}

/// Looser test used for duplicate detection: two location strings could describe the same
/// posting when either is remote or unspecified, or one contains the other.
pub fn locations_overlap(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    let unspecified = NOT_SPECIFIED.to_lowercase();

    if a.is_empty() || b.is_empty() || a == unspecified || b == unspecified {
        return true;
    }
    if is_remote(&a, false) || is_remote(&b, false) {
        return true;
    }
    a.contains(&b) || b.contains(&a)
}

fn is_remote(location_lower: &str, remote_flag: bool) -> bool {
    remote_flag || REMOTE_MARKERS.iter().any(|m| location_lower.contains(m))
}

fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

/// The region named next to "only", e.g. `"remote (us only)"` → `"us"`,
/// `"remote, only in united states"` → `"united states"`.
fn restricted_region(location_lower: &str) -> Option<String> {
    let words = words(location_lower);
    let only = words.iter().position(|w| *w == "only")?;

    let before = &words[..only];
    let after: Vec<&str> = words[only + 1..]
        .iter()
        .copied()
        .skip_while(|w| FILLER_WORDS.contains(w))
        .collect();

    let candidate_before = (only > 0)
        .then(|| pick_region(before.iter().rev().copied().collect::<Vec<_>>(), true))
        .flatten();

    candidate_before.or_else(|| pick_region(after, false))
}

/// Takes one or two words next to "only", preferring a known two-word alias.
/// `reversed` is set when the words were collected walking backwards from "only".
fn pick_region(nearest_first: Vec<&str>, reversed: bool) -> Option<String> {
    let first = *nearest_first.first()?;
    if REMOTE_MARKERS.contains(&first) {
        return None;
    }

    if let Some(second) = nearest_first.get(1) {
        let pair = if reversed {
            format!("{second} {first}")
        } else {
            format!("{first} {second}")
        };
        if REGION_ALIASES.iter().any(|group| group.contains(&pair.as_str())) {
            return Some(pair);
        }
    }

    Some(first.to_string())
}

fn mentions(text: &str, phrase: &str) -> bool {
    let text_words = words(text);
    let phrase_words = words(phrase);
    !phrase_words.is_empty()
        && text_words
            .windows(phrase_words.len())
            .any(|window| window == phrase_words.as_slice())
}

fn region_matches(requested_lower: &str, region: &str) -> bool {
    if mentions(requested_lower, region) || mentions(region, requested_lower) {
        return true;
    }

    REGION_ALIASES.iter().any(|group| {
        group.iter().any(|alias| mentions(requested_lower, alias))
            && group.iter().any(|alias| mentions(region, alias))
    })
}
