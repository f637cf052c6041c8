//! Result encoding: `{"records": ...}` bodies plus the diagnostic headers.

use std::time::Instant;

use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use zset_protocol::{headers, Records};
use zset_types::{ChangeSet, Field, FieldScore, FieldValueScore, Key, Presence};

/// The seven result shapes an endpoint can produce.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    ChangeSet(ChangeSet),
    FieldValueScore(FieldValueScore),
    FieldScore(FieldScore),
    Presence(Presence),
    Keys(Vec<Key>),
    Fields(Vec<Field>),
    Int64(i64),
}

/// Request parameters echoed back as `X-Key` / `X-Field`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params {
    pub key: Option<Key>,
    pub field: Option<Field>,
}

impl Params {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn key(key: Key) -> Self {
        Self {
            key: Some(key),
            field: None,
        }
    }

    pub fn key_field(key: Key, field: Field) -> Self {
        Self {
            key: Some(key),
            field: Some(field),
        }
    }
}

/// A successful reply.
#[derive(Debug)]
pub struct Reply {
    pub payload: Payload,
    pub params: Params,
    pub started: Instant,
}

impl Reply {
    pub fn new(payload: Payload, params: Params, started: Instant) -> Self {
        Self {
            payload,
            params,
            started,
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let mut header_map = HeaderMap::new();
        let elapsed = self.started.elapsed();
        let duration = format!("{:.3}ms", elapsed.as_secs_f64() * 1000.0);
        insert_header(&mut header_map, headers::DURATION, duration.as_bytes());
        if let Some(key) = &self.params.key {
            insert_header(&mut header_map, headers::KEY, key.as_bytes());
        }
        if let Some(field) = &self.params.field {
            insert_header(&mut header_map, headers::FIELD, field.as_bytes());
        }
        (StatusCode::OK, header_map, Json(Records::new(self.payload))).into_response()
    }
}

// Names that cannot be carried in a header value are left out.
fn insert_header(map: &mut HeaderMap, name: &'static str, value: &[u8]) {
    match HeaderValue::from_bytes(value) {
        Ok(value) => {
            map.insert(HeaderName::from_static(name), value);
        }
        Err(_) => tracing::debug!(header = name, "value not representable, header skipped"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn reply_sets_headers_and_wraps_records() {
        let reply = Reply::new(
            Payload::Int64(3),
            Params::key_field(Key::new("K1").unwrap(), Field::new("F").unwrap()),
            Instant::now(),
        );
        let response = reply.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let h = response.headers();
        assert_eq!(h["content-type"], "application/json");
        assert_eq!(h[headers::KEY], "K1");
        assert_eq!(h[headers::FIELD], "F");
        assert!(h[headers::DURATION].to_str().unwrap().ends_with("ms"));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"records":3}"#);
    }

    #[test]
    fn headers_omitted_without_params() {
        let response = Reply::new(Payload::Keys(vec![]), Params::none(), Instant::now())
            .into_response();
        assert!(response.headers().get(headers::KEY).is_none());
        assert!(response.headers().get(headers::FIELD).is_none());
        assert!(response.headers().get(headers::DURATION).is_some());
    }

    #[test]
    fn payload_shapes_serialize_untagged() {
        let json = serde_json::to_value(Payload::Presence(Presence::stored(5))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"present": true, "inserted": false, "score": 5})
        );
        let json = serde_json::to_value(Payload::Fields(vec![Field::new("a").unwrap()])).unwrap();
        assert_eq!(json, serde_json::json!(["a"]));
    }
}
