use std::cmp::Ordering;

use crate::string_pool::StringPool;

/// Prefix matching over two sorted pools: launch history first, then
/// search-path candidates. Queries are pure; the owner swaps pools in
/// when the environment changes.
pub struct MatchEngine {
    history: StringPool,
    candidates: StringPool,
}

impl MatchEngine {
    pub fn new(history: StringPool, candidates: StringPool) -> Self {
        Self {
            history,
            candidates,
        }
    }

    pub fn history_mut(&mut self) -> &mut StringPool {
        &mut self.history
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn replace_candidates(&mut self, candidates: StringPool) {
        self.candidates = candidates;
    }

    /// All entries starting with `text`, history entries first, each
    /// source's domain in ascending order, duplicates across sources
    /// suppressed (first source wins). Empty text matches nothing.
    /// `None` means no limit.
    pub fn find_matches(&self, text: &str, limit: Option<usize>) -> Vec<String> {
        let mut matches = Vec::new();
        if text.is_empty() || limit == Some(0) {
            return matches;
        }

        collect_prefix_matches(&self.history, text, limit, &mut matches);
        collect_prefix_matches(&self.candidates, text, limit, &mut matches);
        matches
    }

    pub fn get_first_match(&self, text: &str) -> Option<String> {
        self.find_matches(text, Some(1)).into_iter().next()
    }
}

/// Compares an entry against a prefix, looking only at the prefix's
/// length. An entry shorter than the prefix orders `Less`, never
/// `Equal`, so it can never count as a match.
fn prefix_compare(entry: &str, prefix: &str) -> Ordering {
    let entry = entry.as_bytes();
    let prefix = prefix.as_bytes();
    if entry.len() < prefix.len() {
        match entry.cmp(&prefix[..entry.len()]) {
            Ordering::Equal => Ordering::Less,
            other => other,
        }
    } else {
        entry[..prefix.len()].cmp(prefix)
    }
}

/// Binary-searches the sorted pool for any entry inside the prefix
/// domain, then expands left and right across the contiguous run.
/// O(log n + k) for a domain of k entries.
fn collect_prefix_matches(
    pool: &StringPool,
    text: &str,
    limit: Option<usize>,
    out: &mut Vec<String>,
) {
    let Ok(probe) = pool.search(|entry| prefix_compare(entry, text)) else {
        return;
    };

    let mut start = probe;
    while start > 0 && prefix_compare(pool.get(start - 1), text) == Ordering::Equal {
        start -= 1;
    }
    let mut end = probe + 1;
    while end < pool.len() && prefix_compare(pool.get(end), text) == Ordering::Equal {
        end += 1;
    }

    for position in start..end {
        if limit.is_some_and(|max| out.len() >= max) {
            return;
        }
        let entry = pool.get(position);
        if out.iter().any(|existing| existing == entry) {
            continue;
        }
        out.push(entry.to_string());
    }
}
