//! Safelist reconciliation.
//!
//! One pass brings every host up to the union of the source hosts' lists:
//!
//! 1. **Fetch** each source and recipient list
//! 2. **Filter** both sets by comment substring (optional)
//! 3. **Merge** the filtered source lists into a canonical list
//! 4. **Diff** the canonical list against every host
//! 5. **Push** each host's missing entries (skipped in dry-run mode)
//! 6. **Cache** the raw fetched lists to disk
//!
//! Entries are compared by whole-record equality. Nothing is ever removed
//! from a host, and an entry edited on one host after creation is treated
//! as a new entry alongside the original.
//!
//! # Example
//!
//! ```ignore
//! use safelist::sync::Syncer;
//! use safelist::transport::HttpTransport;
//!
//! let mut syncer = Syncer::new(config, HttpTransport::new());
//! let report = syncer.run_pass().await;
//! ```

mod driver;
mod filter;
mod merge;

pub use driver::{HostOutcome, PassReport, PushOutcome, Role, SyncState, Syncer};
pub use filter::filter_by_comment;
pub use merge::{delta, merge};

use crate::model::Entry;

/// A host together with the list it reported.
#[derive(Debug, Clone, PartialEq)]
pub struct HostList {
    pub host: String,
    pub entries: Vec<Entry>,
}

impl HostList {
    #[must_use]
    pub fn new(host: impl Into<String>, entries: Vec<Entry>) -> Self {
        Self {
            host: host.into(),
            entries,
        }
    }
}
