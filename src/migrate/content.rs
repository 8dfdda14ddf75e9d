//! Content-derived `hash_key` values.
//!
//! Mirrors the appliance's own key generator: a 64-bit FNV-1a hash over the
//! identifying fields of each entry type, reinterpreted as a signed integer.
//! Range lists are hashed order-independently by summing per-range hashes.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::model::{Entry, EntryType};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Incremental 64-bit FNV-1a hasher.
#[derive(Debug, Clone, Copy)]
pub struct Fnv64a(u64);

impl Fnv64a {
    #[must_use]
    pub const fn new() -> Self {
        Self(FNV_OFFSET_BASIS)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 ^= u64::from(*byte);
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
    }

    #[must_use]
    pub const fn finish(&self) -> u64 {
        self.0
    }
}

impl Default for Fnv64a {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the content hash for an entry of the given type.
///
/// Returns `None` when the type has no hashing rule or a required field is
/// missing or empty.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn content_hash(entry: &Entry, kind: EntryType) -> Option<i64> {
    let unsigned = match kind {
        EntryType::Ip => {
            let ip = entry.get("ip")?;
            let mut hasher = Fnv64a::new();
            hasher.write(non_empty_str(ip.get("ip"))?.as_bytes());
            hasher.write(&network_uuid(ip.get("network_uuid"))?);
            hasher.finish()
        }
        EntryType::Pair => {
            let pair = entry.get("pair")?;
            let mut hasher = Fnv64a::new();
            hasher.write(non_empty_str(pair.get("src"))?.as_bytes());
            hasher.write(&network_uuid(pair.get("src_network_uuid"))?);
            hasher.write(non_empty_str(pair.get("dst"))?.as_bytes());
            hasher.write(&network_uuid(pair.get("dst_network_uuid"))?);
            hasher.finish()
        }
        EntryType::Asn | EntryType::AsnOrg | EntryType::Cidr | EntryType::Ranges => {
            let ranges = entry.get("ranges")?;
            let sum = range_sum(ranges.get("ranges")?)?;
            let mut hasher = Fnv64a::new();
            hasher.write(&sum.to_be_bytes());
            hasher.write(&network_uuid(ranges.get("network_uuid"))?);
            hasher.finish()
        }
        EntryType::DomainLiteral | EntryType::DomainPattern => {
            string_hash(non_empty_str(entry.get("domain"))?)
        }
        EntryType::Useragent => string_hash(non_empty_str(entry.get("useragent"))?),
        EntryType::Domain | EntryType::Org => return None,
    };

    Some(unsigned as i64)
}

fn string_hash(s: &str) -> u64 {
    let mut hasher = Fnv64a::new();
    hasher.write(s.as_bytes());
    hasher.finish()
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Sum of per-range hashes over `[{"start": u32, "end": u32}, ...]`.
fn range_sum(ranges: &Value) -> Option<u64> {
    let mut sum = 0u64;
    for range in ranges.as_array()? {
        let start = u32::try_from(range.get("start")?.as_u64()?).ok()?;
        let end = u32::try_from(range.get("end")?.as_u64()?).ok()?;

        let mut buf = [0u8; 8];
        buf[..4].copy_from_slice(&start.to_be_bytes());
        buf[4..].copy_from_slice(&end.to_be_bytes());

        let mut hasher = Fnv64a::new();
        hasher.write(&buf);
        sum = sum.wrapping_add(hasher.finish());
    }
    Some(sum)
}

/// Raw bytes of a network UUID.
///
/// Accepts the BSON binary form `{"Kind": 4, "Data": "<base64>"}` as well
/// as a bare base64 string.
fn network_uuid(value: Option<&Value>) -> Option<Vec<u8>> {
    let data = match value? {
        Value::Object(binary) => {
            if binary.get("Kind").and_then(Value::as_u64).unwrap_or(0) == 0 {
                return None;
            }
            binary.get("Data")?.as_str()?
        }
        Value::String(data) => data.as_str(),
        _ => return None,
    };
    STANDARD.decode(data).ok().filter(|bytes| !bytes.is_empty())
}
