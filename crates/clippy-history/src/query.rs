use crate::entry::Entry;

/// Lowercase whitespace-separated search terms. Empty for a blank query.
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|term| term.to_lowercase())
        .collect()
}

/// Entries whose lowercase text contains every query term, in store order.
pub fn filter_entries<'a>(entries: &'a [Entry], query: &str) -> Vec<&'a Entry> {
    let terms = query_terms(query);
    if terms.is_empty() {
        return entries.iter().collect();
    }
    entries
        .iter()
        .filter(|entry| terms.iter().all(|term| entry.lower.contains(term.as_str())))
        .collect()
}

pub fn filter_favorites<'a>(entries: &'a [Entry], query: &str) -> Vec<&'a Entry> {
    filter_entries(entries, query)
        .into_iter()
        .filter(|entry| entry.is_favorite)
        .collect()
}

/// Filters first, then keeps the `limit` most recent matches.
pub fn top_matches<'a>(
    entries: &'a [Entry],
    query: &str,
    favorites_only: bool,
    limit: usize,
) -> Vec<&'a Entry> {
    let mut matches = if favorites_only {
        filter_favorites(entries, query)
    } else {
        filter_entries(entries, query)
    };
    matches.truncate(limit);
    matches
}
