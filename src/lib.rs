//! safelist-sync - reconcile safelists across appliances
//!
//! This crate provides the core functionality for the `safelist-sync` tool.
//!
//! # Architecture
//!
//! - [`model`] - Safelist entries and the discriminator vocabulary
//! - [`migrate`] - `hash_key` back-fill for exported safelists
//! - [`transport`] - Appliance export/import API client
//! - [`cache`] - Per-host snapshot files
//! - [`sync`] - Filter, merge, delta and the sync driver
//! - [`config`] - Driver configuration and cache location
//! - [`cli`] - Command-line interface using clap
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod migrate;
pub mod model;
pub mod sync;
pub mod transport;

pub use error::{Error, Result};
