//! # Title Search
//!
//! Word-level title matching for event and project listings. A document
//! matches when any query word equals any title word, compared without case.
//! No ranking: matches keep the listing order.

use std::collections::BTreeSet;

/// Lowercased alphanumeric words of `text`.
#[must_use]
pub fn terms(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Whether `title` contains any word of `query`. A blank query matches everything.
#[must_use]
pub fn title_matches(title: &str, query: &str) -> bool {
    let wanted = terms(query);
    if wanted.is_empty() {
        return true;
    }
    let words = terms(title);
    wanted.iter().any(|w| words.contains(w))
}
