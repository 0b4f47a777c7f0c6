//! Query filtering over a catalog snapshot.
//!
//! Two variants exist, mirroring the two search UIs this backend serves:
//! plain case-insensitive substring matching in catalog order, and a
//! fuzzy variant that scores by bounded edit distance and returns best
//! matches first. Both are pure functions over an immutable snapshot and
//! both cap their output at [`MAX_RESULTS`].

use aureole_core::catalog::{Catalog, CatalogItem};

/// Maximum number of items any filter call returns.
pub const MAX_RESULTS: usize = 50;

/// Edit-distance budget for the fuzzy variant. Candidates whose best
/// window distance exceeds this are dropped.
const FUZZY_MAX_DISTANCE: usize = 2;

/// Case-insensitive substring filter.
///
/// An empty or whitespace-only query returns the first [`MAX_RESULTS`]
/// items in catalog order. Otherwise returns up to [`MAX_RESULTS`] items
/// whose `label` contains the query, still in catalog order (ties are not
/// re-ranked). A query matching nothing yields an empty vector.
pub fn filter(catalog: &Catalog, query: &str) -> Vec<CatalogItem> {
    let query = query.trim();
    if query.is_empty() {
        return catalog.items.iter().take(MAX_RESULTS).cloned().collect();
    }

    let needle = query.to_lowercase();
    catalog
        .items
        .iter()
        .filter(|item| item.label.to_lowercase().contains(&needle))
        .take(MAX_RESULTS)
        .cloned()
        .collect()
}

/// Fuzzy filter: scores each item by the best edit distance between the
/// query and any same-length window of the label, and returns up to
/// [`MAX_RESULTS`] matches ordered by ascending distance (best first).
///
/// Exact substring hits score 0, so they always sort ahead of approximate
/// matches. The sort is stable: equal scores keep catalog order.
pub fn fuzzy_filter(catalog: &Catalog, query: &str) -> Vec<CatalogItem> {
    let query = query.trim();
    if query.is_empty() {
        return catalog.items.iter().take(MAX_RESULTS).cloned().collect();
    }

    let needle: Vec<char> = query.to_lowercase().chars().collect();

    let mut scored: Vec<(usize, &CatalogItem)> = catalog
        .items
        .iter()
        .filter_map(|item| {
            let haystack: Vec<char> = item.label.to_lowercase().chars().collect();
            let distance = best_window_distance(&needle, &haystack);
            (distance <= FUZZY_MAX_DISTANCE).then_some((distance, item))
        })
        .collect();

    scored.sort_by_key(|(distance, _)| *distance);
    scored
        .into_iter()
        .take(MAX_RESULTS)
        .map(|(_, item)| item.clone())
        .collect()
}

/// Minimum Levenshtein distance between `needle` and any window of
/// `haystack` with the same length as `needle`.
///
/// This approximates substring-aware fuzzy matching: a needle buried in a
/// long label still scores by its local similarity, not by the length
/// difference of the whole strings.
fn best_window_distance(needle: &[char], haystack: &[char]) -> usize {
    if needle.is_empty() {
        return 0;
    }
    if haystack.len() < needle.len() {
        return levenshtein(needle, haystack);
    }

    let mut best = usize::MAX;
    for start in 0..=(haystack.len() - needle.len()) {
        let window = &haystack[start..start + needle.len()];
        let d = levenshtein(needle, window);
        if d < best {
            best = d;
            if best == 0 {
                break;
            }
        }
    }
    best
}

/// Classic two-row Levenshtein distance.
fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
