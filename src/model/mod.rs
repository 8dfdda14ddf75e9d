//! Data models for safelist-sync.
//!
//! - [`Entry`] - one safelist rule, kept as an open JSON record
//! - [`EntryType`] - the discriminator vocabulary the migration tool understands

pub mod entry;

pub use entry::{Entry, EntryType, HASH_KEY_FIELD, SENTINEL_HASH_KEY};
