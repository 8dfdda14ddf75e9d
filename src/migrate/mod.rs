//! `hash_key` back-fill for safelist exports.
//!
//! Newer appliances identify entries by a `hash_key` field. Exports taken
//! from older appliances lack it; [`add_hash_keys`] adds one to every entry
//! that is missing it and leaves every other entry exactly as it was, so
//! running it again over its own output changes nothing.
//!
//! Each entry is first classified by its discriminator (see [`SchemaKind`]).
//! The caller picks how strict to be about the previous export format and
//! which [`HashScheme`] produces the key. Any rejection aborts the whole
//! batch: no partial output is ever produced.

mod content;

pub use content::{content_hash, Fnv64a};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{Entry, EntryType, SENTINEL_HASH_KEY};

/// Schema version stamped on entries keyed by content.
pub const CONTENT_SCHEMA_VERSION: i64 = 5;

/// How the discriminator of an entry was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaKind<'a> {
    /// `type` holds a recognized value.
    Current(EntryType),
    /// Only `Type` is present and it holds a recognized value.
    Legacy(EntryType),
    /// The discriminator holds a value outside the known vocabulary.
    UnknownDiscriminator(&'a Value),
    /// Neither `type` nor `Type` is present.
    Untyped,
}

/// Classify an entry by its discriminator, preferring `type` over `Type`.
#[must_use]
pub fn classify(entry: &Entry) -> SchemaKind<'_> {
    let (raw, legacy) = match (entry.type_value(), entry.legacy_type_value()) {
        (Some(raw), _) => (raw, false),
        (None, Some(raw)) => (raw, true),
        (None, None) => return SchemaKind::Untyped,
    };

    match raw.as_str().and_then(EntryType::parse) {
        Some(kind) if legacy => SchemaKind::Legacy(kind),
        Some(kind) => SchemaKind::Current(kind),
        None => SchemaKind::UnknownDiscriminator(raw),
    }
}

/// Source of the `hash_key` value for entries that lack one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashScheme {
    /// Mark the entry with [`SENTINEL_HASH_KEY`].
    #[default]
    Sentinel,
    /// Derive the key from the entry's identifying fields, falling back to
    /// the sentinel for entries that cannot be hashed.
    Content,
}

/// Migration settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct MigrateOptions {
    /// Reject entries in the previous export format instead of reading `Type`.
    pub strict: bool,
    pub scheme: HashScheme,
}

/// Ensure every entry carries a `hash_key`.
///
/// # Errors
///
/// - [`Error::LegacySchema`] in strict mode when an entry has a `Type` field
/// - [`Error::UnrecognizedType`] when the discriminator is not one of
///   [`EntryType::ALL`]
/// - [`Error::MissingType`] when an entry has no discriminator at all
pub fn add_hash_keys(entries: Vec<Entry>, options: &MigrateOptions) -> Result<Vec<Entry>> {
    let mut migrated = Vec::with_capacity(entries.len());

    for (index, mut entry) in entries.into_iter().enumerate() {
        if entry.has_hash_key() {
            migrated.push(entry);
            continue;
        }

        if options.strict && entry.legacy_type_value().is_some() {
            return Err(Error::LegacySchema { index });
        }

        let kind = match classify(&entry) {
            SchemaKind::Current(kind) | SchemaKind::Legacy(kind) => kind,
            SchemaKind::UnknownDiscriminator(value) => {
                return Err(Error::UnrecognizedType {
                    index,
                    value: value.to_string(),
                });
            }
            SchemaKind::Untyped => return Err(Error::MissingType { index }),
        };

        let key = match options.scheme {
            HashScheme::Sentinel => SENTINEL_HASH_KEY,
            HashScheme::Content => {
                if entry.get("schema_version").is_none() {
                    entry.insert("schema_version", CONTENT_SCHEMA_VERSION);
                }
                content_hash(&entry, kind).unwrap_or_else(|| {
                    warn!(index, kind = %kind, "Missing information for content hash, using sentinel");
                    SENTINEL_HASH_KEY
                })
            }
        };

        debug!(index, kind = %kind, key, "Assigned hash_key");
        entry.set_hash_key(key);
        migrated.push(entry);
    }

    Ok(migrated)
}

/// Migrate a raw JSON document, which must be an array of objects.
///
/// # Errors
///
/// Returns [`Error::NotAnArray`] or [`Error::NotAnObject`] for malformed
/// documents, and any error of [`add_hash_keys`].
pub fn migrate_document(document: Value, options: &MigrateOptions) -> Result<Value> {
    let Value::Array(items) = document else {
        return Err(Error::NotAnArray {
            found: json_kind(&document),
        });
    };

    let entries = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| Entry::from_value(item).ok_or(Error::NotAnObject { index }))
        .collect::<Result<Vec<_>>>()?;

    let migrated = add_hash_keys(entries, options)?;
    Ok(Value::Array(migrated.into_iter().map(Value::from).collect()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
