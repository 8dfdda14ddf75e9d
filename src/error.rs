//! Error types for safelist-sync.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=usage, 3=unknown type, 4=schema, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers
//!
//! Per-host network failures and cache write failures are not errors at
//! this level: the sync driver logs them and carries on with the pass.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for safelist-sync operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Usage (exit 2)
    NoSources,
    NotEnoughSystems,

    // Discriminator (exit 3)
    UnrecognizedType,

    // Schema (exit 4)
    LegacySchema,
    MissingType,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NoSources => "NO_SOURCES",
            Self::NotEnoughSystems => "NOT_ENOUGH_SYSTEMS",
            Self::UnrecognizedType => "UNRECOGNIZED_TYPE",
            Self::LegacySchema => "LEGACY_SCHEMA",
            Self::MissingType => "MISSING_TYPE",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
        }
    }

    /// Category-based exit code (2-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::NoSources | Self::NotEnoughSystems => 2,
            Self::UnrecognizedType => 3,
            Self::LegacySchema | Self::MissingType => 4,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Usage errors are only reported on the diagnostic channel.
    ///
    /// Everything else is printed whenever the process is not `--quiet`.
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(self, Self::NoSources | Self::NotEnoughSystems)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in safelist-sync operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("No sources specified")]
    NoSources,

    #[error("Not enough systems to sync: {count} configured, at least 2 required")]
    NotEnoughSystems { count: usize },

    #[error("Unrecognized type field {value} in entry {index}")]
    UnrecognizedType { index: usize, value: String },

    #[error("Entry {index} uses the previous safelist format (\"Type\" field)")]
    LegacySchema { index: usize },

    #[error("Entry {index} has neither \"type\" nor \"Type\"")]
    MissingType { index: usize },

    #[error("Expected a JSON array of safelist entries, found {found}")]
    NotAnArray { found: &'static str },

    #[error("Entry {index} is not a JSON object")]
    NotAnObject { index: usize },

    #[error("No cached snapshot for {host} under {}", root.display())]
    SnapshotNotFound { host: String, root: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NoSources => ErrorCode::NoSources,
            Self::NotEnoughSystems { .. } => ErrorCode::NotEnoughSystems,
            Self::UnrecognizedType { .. } => ErrorCode::UnrecognizedType,
            Self::LegacySchema { .. } => ErrorCode::LegacySchema,
            Self::MissingType { .. } => ErrorCode::MissingType,
            Self::Config(_) | Self::SnapshotNotFound { .. } => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) | Self::NotAnArray { .. } | Self::NotAnObject { .. } => {
                ErrorCode::JsonError
            }
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NoSources => Some(
                "Pass at least one source: safelist-sync sync -s host:port".to_string(),
            ),
            Self::NotEnoughSystems { .. } => Some(
                "Add another source (-s) or a recipient (-r); syncing needs two systems."
                    .to_string(),
            ),
            Self::UnrecognizedType { .. } => Some(format!(
                "Known types: {}. Newer appliances may have added types this tool does not understand.",
                crate::model::EntryType::ALL
                    .iter()
                    .map(crate::model::EntryType::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            Self::LegacySchema { .. } => Some(
                "Export the safelist again from an up-to-date appliance, or rerun without --strict."
                    .to_string(),
            ),
            Self::SnapshotNotFound { .. } => {
                Some("Run `safelist-sync cache` to see which hosts have snapshots.".to_string())
            }
            Self::MissingType { .. }
            | Self::NotAnArray { .. }
            | Self::NotAnObject { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::Config(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
