//! Serde helpers for fixed 32-byte values.
//!
//! Human-readable formats (JSON, TOML) get a lowercase hex string; binary
//! formats (CBOR) get the raw byte array.

use serde::{Deserialize, Deserializer, Serializer, de};

pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if serializer.is_human_readable() {
        serializer.serialize_str(&hex::encode(bytes))
    } else {
        serde::Serialize::serialize(bytes, serializer)
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
where
    D: Deserializer<'de>,
{
    if deserializer.is_human_readable() {
        let s = String::deserialize(deserializer)?;
        decode(&s).ok_or_else(|| de::Error::custom("expected 64 hex characters"))
    } else {
        <[u8; 32]>::deserialize(deserializer)
    }
}

/// Decode exactly 32 bytes of hex.
pub fn decode(s: &str) -> Option<[u8; 32]> {
    let bytes = hex::decode(s).ok()?;
    bytes.try_into().ok()
}
