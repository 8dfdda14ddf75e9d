//! Canonical list merge and per-host deltas.
//!
//! Entries have no usable key (the `hash_key` is usually the sentinel), so
//! both operations compare whole records and run in quadratic time. Lists
//! on an appliance are small enough for this to be fine.

use super::HostList;
use crate::model::Entry;

/// Union of every host's entries with duplicates removed.
///
/// Order is first-seen: hosts in the given order, then entries in each
/// host's order.
#[must_use]
pub fn merge(lists: &[HostList]) -> Vec<Entry> {
    let mut canonical: Vec<Entry> = Vec::new();
    for entry in lists.iter().flat_map(|list| &list.entries) {
        if !canonical.contains(entry) {
            canonical.push(entry.clone());
        }
    }
    canonical
}

/// Canonical entries missing from `host_entries`, without duplicates, in
/// canonical order.
#[must_use]
pub fn delta(canonical: &[Entry], host_entries: &[Entry]) -> Vec<Entry> {
    let mut missing: Vec<Entry> = Vec::new();
    for entry in canonical {
        if !host_entries.contains(entry) && !missing.contains(entry) {
            missing.push(entry.clone());
        }
    }
    missing
}
