//! Fuzzy filtering for the entry list and the citation picker.
//!
//! An exact (case-insensitive) substring hit scores 100; anything else is
//! scored by a normalized longest-common-subsequence ratio and kept only
//! above a per-use threshold. Results come back sorted by score, ties in
//! their original order.

use crate::models::{BibEntry, Entry};

/// Entry names need a close match before they are worth showing.
const ENTRY_THRESHOLD: f64 = 70.0;
/// Citekeys are short and cryptic; cast a wider net.
const CITEKEY_THRESHOLD: f64 = 30.0;

/// Similarity of two strings in 0..=100: `2 * lcs / (len_a + len_b) * 100`.
fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    // Two-row LCS table.
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for &ca in &a {
        for (j, &cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(cur[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    let lcs = prev[b.len()];
    200.0 * lcs as f64 / (a.len() + b.len()) as f64
}

fn scored_filter<T, K>(items: &[T], query: &str, key: K, threshold: f64) -> Vec<T>
where
    T: Clone,
    K: Fn(&T) -> &str,
{
    if query.is_empty() {
        return items.to_vec();
    }
    let q = query.to_lowercase();
    let mut scored: Vec<(f64, &T)> = Vec::new();
    for item in items {
        let hay = key(item).to_lowercase();
        if hay.contains(&q) {
            scored.push((100.0, item));
        } else {
            let ratio = similarity(&q, &hay);
            if ratio > threshold {
                scored.push((ratio, item));
            }
        }
    }
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().map(|(_, item)| item.clone()).collect()
}

pub fn fuzzy_filter_entries(entries: &[Entry], query: &str) -> Vec<Entry> {
    scored_filter(entries, query, |e| e.name.as_str(), ENTRY_THRESHOLD)
}

pub fn fuzzy_filter_citekeys(entries: &[BibEntry], query: &str) -> Vec<BibEntry> {
    scored_filter(entries, query, |e| e.citekey.as_str(), CITEKEY_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use std::path::PathBuf;

    fn entry(name: &str) -> Entry {
        Entry {
            path: PathBuf::from(format!("/vault/{name}.md")),
            name: name.to_string(),
            modified: Local::now(),
        }
    }

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn empty_query_preserves_input_order() {
        let entries = vec![entry("zeta"), entry("alpha"), entry("midway")];
        assert_eq!(
            names(&fuzzy_filter_entries(&entries, "")),
            vec!["zeta", "alpha", "midway"]
        );
    }

    #[test]
    fn substring_matches_rank_first() {
        let entries = vec![entry("weekly review"), entry("reviews 2026"), entry("notes")];
        let out = fuzzy_filter_entries(&entries, "review");
        assert_eq!(names(&out), vec!["weekly review", "reviews 2026"]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let entries = vec![entry("Thesis Draft")];
        assert_eq!(fuzzy_filter_entries(&entries, "THESIS").len(), 1);
    }

    #[test]
    fn close_subsequence_passes_the_entry_threshold() {
        // lcs("jrnl", "journal") = 4 => 2*4/11*100 ≈ 72.7.
        let entries = vec![entry("journal"), entry("unrelated")];
        assert_eq!(names(&fuzzy_filter_entries(&entries, "jrnl")), vec!["journal"]);
    }

    #[test]
    fn unrelated_names_are_filtered_out() {
        let entries = vec![entry("groceries")];
        assert!(fuzzy_filter_entries(&entries, "xyzzy").is_empty());
    }

    #[test]
    fn ties_keep_their_original_order() {
        let entries = vec![entry("plan a"), entry("plan b"), entry("plan c")];
        let out = fuzzy_filter_entries(&entries, "plan");
        assert_eq!(names(&out), vec!["plan a", "plan b", "plan c"]);
    }

    #[test]
    fn citekeys_use_a_looser_threshold() {
        let bibs = vec![
            BibEntry { citekey: "smith2020".to_string() },
            BibEntry { citekey: "qqqq".to_string() },
        ];
        // lcs("smth", "smith2020") = 4 => 2*4/13*100 ≈ 61.5: kept for
        // citekeys, which accept anything above 30.
        let out = fuzzy_filter_citekeys(&bibs, "smth");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].citekey, "smith2020");
    }
}
