//! Deterministic, byte-stable JSON encoding.
//!
//! The specification does not name a canonical-JSON RFC — only that map
//! keys are sorted lexicographically, numbers carry no fractional part,
//! and the output is UTF-8 with no insignificant whitespace (§9). This
//! module implements exactly that, directly over `serde_json::Value`,
//! rather than pulling in a third-party canonical-JSON crate.
//!
//! Once bytes are produced here they must be treated as opaque and
//! transported verbatim — never re-serialized — since re-encoding a
//! `Value` is not guaranteed to reproduce the same bytes across library
//! versions.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, SorchaError};

/// Serialize `value` to its canonical byte form: sorted object keys, no
/// whitespace, integers only (fractional numbers are rejected).
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let v = serde_json::to_value(value)
        .map_err(|e| SorchaError::CanonicalEncoding(e.to_string()))?;
    reject_fractional(&v)?;
    let sorted = sort_keys(v);
    serde_json::to_vec(&sorted).map_err(|e| SorchaError::CanonicalEncoding(e.to_string()))
}

/// Recursively sort all object keys; arrays and scalars pass through
/// unchanged (serde_json preserves array order and emits no whitespace
/// with `to_vec`).
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = serde_json::Map::new();
            for (k, v) in entries {
                sorted.insert(k, v);
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Reject any fractional (non-integer) number, per the "fixed number
/// representation" rule — this canonicalization has no use for floats.
fn reject_fractional(value: &Value) -> Result<()> {
    match value {
        Value::Number(n) => {
            if n.is_f64() && !n.is_i64() && !n.is_u64() {
                return Err(SorchaError::CanonicalEncoding(format!(
                    "fractional numbers are not permitted in canonical encoding: {n}"
                )));
            }
            Ok(())
        }
        Value::Object(map) => map.values().try_for_each(reject_fractional),
        Value::Array(items) => items.iter().try_for_each(reject_fractional),
        _ => Ok(()),
    }
}

/// SHA-256 digest of `bytes`, used to hash canonical attestation templates
/// before signing (§4.3 step 2).
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorts_object_keys_recursively() {
        let v = json!({"b": 1, "a": {"z": 2, "y": 3}});
        let bytes = to_canonical_bytes(&v).unwrap();
        assert_eq!(bytes, br#"{"a":{"y":3,"z":2},"b":1}"#);
    }

    #[test]
    fn rejects_fractional_numbers() {
        let v = json!({"x": 1.5});
        assert!(to_canonical_bytes(&v).is_err());
    }

    #[test]
    fn no_insignificant_whitespace() {
        let v = json!({"a": [1, 2, 3]});
        let bytes = to_canonical_bytes(&v).unwrap();
        assert!(!bytes.contains(&b' '));
    }
}
