// src/dedup.rs
//! Deduplication of candidate records against the identities already stored.
//!
//! `filter_new` is pure: identical inputs always yield identical output, which
//! is what the property tests lean on.

use std::collections::HashSet;

use crate::scrape::types::{EventRecord, IdentityKey};

/// Snapshot of the `(normalized name, source)` pairs already persisted.
/// Loaded once at cycle start and read-only for the duration of one cycle, so
/// a cycle's own appends are never visible to its own dedup step.
#[derive(Debug, Clone, Default)]
pub struct IdentitySet {
    keys: HashSet<IdentityKey>,
}

impl IdentitySet {
    pub fn from_records(records: &[EventRecord]) -> Self {
        Self {
            keys: records.iter().map(|r| r.identity_key()).collect(),
        }
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Keep the candidates whose identity is absent from `known`, first-wins.
///
/// Input order is preserved. Two candidates sharing an identity within the
/// same batch collapse to the first occurrence, so duplicates across sources
/// in one cycle cannot both land in the store.
pub fn filter_new(candidates: Vec<EventRecord>, known: &IdentitySet) -> Vec<EventRecord> {
    let mut seen_this_cycle: HashSet<IdentityKey> = HashSet::new();
    let mut kept = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let key = candidate.identity_key();
        if known.contains(&key) {
            continue;
        }
        if !seen_this_cycle.insert(key) {
            continue;
        }
        kept.push(candidate);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::types::Platform;
    use chrono::{TimeZone, Utc};

    fn rec(name: &str, source: Platform) -> EventRecord {
        EventRecord {
            name: name.to_string(),
            source,
            link: format!("https://example.test/{name}"),
            start_window: "soon".into(),
            tags: vec![],
            discovered_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn known_identities_are_dropped_case_insensitively() {
        let known = IdentitySet::from_records(&[rec("Alpha", Platform::Devpost)]);
        let out = filter_new(vec![rec("alpha", Platform::Devpost)], &known);
        assert!(out.is_empty());
    }

    #[test]
    fn same_name_on_another_platform_survives() {
        let known = IdentitySet::from_records(&[rec("Alpha", Platform::Devpost)]);
        let out = filter_new(vec![rec("Alpha", Platform::Mlh)], &known);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn first_occurrence_wins_within_a_batch() {
        let known = IdentitySet::default();
        let mut a = rec("Alpha", Platform::Devpost);
        a.link = "https://first.test".into();
        let mut b = rec("ALPHA ", Platform::Devpost);
        b.link = "https://second.test".into();

        let out = filter_new(vec![a, b], &known);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].link, "https://first.test");
    }

    #[test]
    fn kept_elements_preserve_relative_order() {
        let known = IdentitySet::from_records(&[rec("B", Platform::Mlh)]);
        let input = vec![
            rec("A", Platform::Devpost),
            rec("B", Platform::Mlh),
            rec("C", Platform::Unstop),
            rec("D", Platform::Devpost),
        ];
        let out = filter_new(input, &known);
        let names: Vec<_> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C", "D"]);
    }

    #[test]
    fn refiltering_own_output_yields_nothing_new() {
        // filter(filter(C, K), K ∪ filter(C, K)) == [] — reapplying dedup after
        // the kept records are persisted yields nothing.
        let known = IdentitySet::from_records(&[rec("B", Platform::Mlh)]);
        let input = vec![
            rec("A", Platform::Devpost),
            rec("B", Platform::Mlh),
            rec("a", Platform::Devpost),
        ];
        let first = filter_new(input, &known);
        let after_persist = IdentitySet::from_records(&first);
        let second = filter_new(first.clone(), &after_persist);
        assert!(second.is_empty());

        // And against the original known set the output is already stable.
        let again = filter_new(first.clone(), &known);
        assert_eq!(again, first);
    }
}
