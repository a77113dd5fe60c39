//! Hashing - SHA-256 derived template GUIDs and fingerprints
//!
//! Template GUIDs are a pure function of the template's relative path so
//! rebuilding never changes an object's identity in the host.

use serde::Serialize;
use serde_json::{to_string, Value};
use sha2::{Digest, Sha256};

/// Length in hex characters of a host template GUID.
pub const GUID_LEN: usize = 32;

/// Compute SHA-256 hash of bytes, return lowercase hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// GUID for a template file, e.g. `tile/system/tile-3001.json`.
///
/// Backslashes are normalized so the GUID does not depend on the host OS.
pub fn template_guid(template_file: &str) -> String {
    let normalized = template_file.replace('\\', "/");
    let mut guid = sha256_hex(normalized.as_bytes());
    guid.truncate(GUID_LEN);
    guid.make_ascii_uppercase();
    guid
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v: Value = serde_json::to_value(value)?;
    to_string(&sort_value(&v))
}

fn sort_value(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            let sorted_map: serde_json::Map<String, Value> = sorted
                .into_iter()
                .map(|(k, v)| (k.clone(), sort_value(v)))
                .collect();
            Value::Object(sorted_map)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_value).collect()),
        _ => v.clone(),
    }
}

/// Stable content fingerprint, used in build reports
pub fn fingerprint<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(value)?;
    Ok(sha256_hex(canonical.as_bytes()))
}
