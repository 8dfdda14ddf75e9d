//! Safelist entry model.
//!
//! Appliances export entries as schema-free JSON objects. Only a handful of
//! fields matter to this tool (`type`, `comment`, `hash_key`); everything
//! else is carried along untouched, so an entry is stored as an open record
//! rather than a closed struct. Two entries are the same entry exactly when
//! every field is equal.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the entry's identifier.
pub const HASH_KEY_FIELD: &str = "hash_key";

/// `hash_key` placeholder for entries whose key was not derived from content.
pub const SENTINEL_HASH_KEY: i64 = -99_999;

/// Discriminator field in the current export format.
pub const TYPE_FIELD: &str = "type";

/// Discriminator field in the previous export format.
pub const LEGACY_TYPE_FIELD: &str = "Type";

/// Free-text comment field, used by the comment filter.
pub const COMMENT_FIELD: &str = "comment";

/// A single safelist rule.
///
/// Equality is structural over all fields and ignores field order.
/// Serialization keeps the order the appliance sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry(Map<String, Value>);

impl Entry {
    /// Wrap an existing JSON object.
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Convert a JSON value into an entry, if it is an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Look up a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// All fields in their original order.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// The comment, when present and a string.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.0.get(COMMENT_FIELD).and_then(Value::as_str)
    }

    /// Whether the entry already carries a `hash_key`.
    #[must_use]
    pub fn has_hash_key(&self) -> bool {
        self.0.contains_key(HASH_KEY_FIELD)
    }

    /// The `hash_key`, when present and an integer.
    #[must_use]
    pub fn hash_key(&self) -> Option<i64> {
        self.0.get(HASH_KEY_FIELD).and_then(Value::as_i64)
    }

    pub fn set_hash_key(&mut self, key: i64) {
        self.insert(HASH_KEY_FIELD, key);
    }

    /// Raw `type` value (current format).
    #[must_use]
    pub fn type_value(&self) -> Option<&Value> {
        self.0.get(TYPE_FIELD)
    }

    /// Raw `Type` value (previous format).
    #[must_use]
    pub fn legacy_type_value(&self) -> Option<&Value> {
        self.0.get(LEGACY_TYPE_FIELD)
    }
}

impl From<Entry> for Value {
    fn from(entry: Entry) -> Self {
        Value::Object(entry.0)
    }
}

/// Indicator categories an entry can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    Asn,
    AsnOrg,
    Cidr,
    Domain,
    DomainLiteral,
    DomainPattern,
    Ip,
    Org,
    Pair,
    Ranges,
    Useragent,
}

impl EntryType {
    /// Every recognized discriminator, in export order.
    pub const ALL: [Self; 11] = [
        Self::Asn,
        Self::AsnOrg,
        Self::Cidr,
        Self::Domain,
        Self::DomainLiteral,
        Self::DomainPattern,
        Self::Ip,
        Self::Org,
        Self::Pair,
        Self::Ranges,
        Self::Useragent,
    ];

    /// Wire name of the discriminator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asn => "asn",
            Self::AsnOrg => "asn_org",
            Self::Cidr => "cidr",
            Self::Domain => "domain",
            Self::DomainLiteral => "domain_literal",
            Self::DomainPattern => "domain_pattern",
            Self::Ip => "ip",
            Self::Org => "org",
            Self::Pair => "pair",
            Self::Ranges => "ranges",
            Self::Useragent => "useragent",
        }
    }

    /// Parse a wire name. Matching is exact.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: Value) -> Entry {
        Entry::from_value(value).unwrap()
    }

    #[test]
    fn test_equality_ignores_field_order() {
        let a = entry(json!({"type": "ip", "comment": "x", "hash_key": -99999}));
        let b = entry(json!({"hash_key": -99999, "comment": "x", "type": "ip"}));
        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_covers_extra_fields() {
        let a = entry(json!({"type": "domain", "domain": "example.com"}));
        let b = entry(json!({"type": "domain", "domain": "example.com", "schema_version": 5}));
        assert_ne!(a, b);
    }

    #[test]
    fn test_serialization_keeps_field_order() {
        let e = entry(json!({"type": "ip", "name": "n", "comment": "c"}));
        assert_eq!(
            serde_json::to_string(&e).unwrap(),
            r#"{"type":"ip","name":"n","comment":"c"}"#
        );
    }

    #[test]
    fn test_comment_null_is_none() {
        let e = entry(json!({"type": "ip", "comment": null}));
        assert_eq!(e.comment(), None);
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Entry::from_value(json!([1, 2])).is_none());
        assert!(Entry::from_value(json!("ip")).is_none());
    }

    #[test]
    fn test_entry_type_vocabulary() {
        assert_eq!(EntryType::ALL.len(), 11);
        for t in EntryType::ALL {
            assert_eq!(EntryType::parse(t.as_str()), Some(t));
        }
        assert_eq!(EntryType::parse("IP"), None);
        assert_eq!(EntryType::parse("hostname"), None);
    }
}
