//! Comment filter stage.

use std::borrow::Cow;

use tracing::debug;

use super::HostList;

/// Keep only entries whose comment contains `substring`, ignoring case.
///
/// An empty `substring` disables filtering and borrows the input as-is.
/// Entries without a comment, or with a `null` comment, never match. Hosts
/// left with no entries stay in the result with an empty list.
#[must_use]
pub fn filter_by_comment<'a>(lists: &'a [HostList], substring: &str) -> Cow<'a, [HostList]> {
    if substring.is_empty() {
        return Cow::Borrowed(lists);
    }

    let needle = substring.to_lowercase();
    let filtered = lists
        .iter()
        .map(|list| {
            let entries: Vec<_> = list
                .entries
                .iter()
                .filter(|entry| {
                    entry
                        .comment()
                        .is_some_and(|comment| comment.to_lowercase().contains(&needle))
                })
                .cloned()
                .collect();
            debug!(host = %list.host, remaining = entries.len(), "Entries remaining after filtering");
            HostList::new(list.host.clone(), entries)
        })
        .collect();

    Cow::Owned(filtered)
}
