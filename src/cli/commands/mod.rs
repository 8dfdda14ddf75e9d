//! Command implementations.

pub mod cache;
pub mod completions;
pub mod migrate;
pub mod sync;
pub mod version;
