//! Base64 framing for opaque byte values.
//!
//! Values may hold any bytes, including non-UTF-8 sequences, so they travel
//! through JSON as standard (padded) base64 text.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serializer};

use crate::error::TypeError;

/// Encode raw bytes as base64 text.
pub fn encode_value(value: &[u8]) -> String {
    BASE64.encode(value)
}

/// Decode base64 text into raw bytes.
pub fn decode_value(text: &str) -> Result<Bytes, TypeError> {
    BASE64
        .decode(text)
        .map(Bytes::from)
        .map_err(|e| TypeError::InvalidBase64(e.to_string()))
}

/// `#[serde(with = "...")]` adapter for [`Bytes`] values.
pub mod base64_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode_value(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let text = String::deserialize(deserializer)?;
        decode_value(&text).map_err(serde::de::Error::custom)
    }
}
