//! Input decoders for the request envelope.
//!
//! Every keyed endpoint decodes its query with one of two shapes, key only
//! or key plus field, under a [`Strictness`] setting.

use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use serde::Deserialize;
use zset_protocol::{params, ProtocolError, ProtocolResult, JSON_CONTENT_TYPE};
use zset_types::{Field, Key};

/// How much of the request envelope is checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strictness {
    /// The content type must be `application/json` and the named query
    /// parameters must be non-empty.
    Required,
    /// Only the query parameters are checked.
    Optional,
}

/// Raw query parameters as they arrive.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct QueryParams {
    pub key: Option<String>,
    pub field: Option<String>,
}

pub type QueryInput = Result<Query<QueryParams>, QueryRejection>;

pub fn decode_key(
    headers: &HeaderMap,
    query: &QueryInput,
    strictness: Strictness,
) -> ProtocolResult<Key> {
    check_content_type(headers, strictness)?;
    let query = parsed(query)?;
    required_key(query)
}

pub fn decode_key_field(
    headers: &HeaderMap,
    query: &QueryInput,
    strictness: Strictness,
) -> ProtocolResult<(Key, Field)> {
    check_content_type(headers, strictness)?;
    let query = parsed(query)?;
    let key = required_key(query)?;
    let field = non_empty(query.field.as_deref(), params::FIELD)?;
    let field = Field::new(field).map_err(|e| ProtocolError::InvalidParameter {
        name: params::FIELD,
        reason: e.to_string(),
    })?;
    Ok((key, field))
}

fn check_content_type(headers: &HeaderMap, strictness: Strictness) -> ProtocolResult<()> {
    if strictness == Strictness::Optional {
        return Ok(());
    }
    let declared = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let essence = declared.split(';').next().unwrap_or_default().trim();
    if essence.eq_ignore_ascii_case(JSON_CONTENT_TYPE) {
        Ok(())
    } else if declared.is_empty() {
        Err(ProtocolError::ContentType("missing, expected application/json".into()))
    } else {
        Err(ProtocolError::ContentType(format!(
            "{declared}, expected application/json"
        )))
    }
}

fn parsed(query: &QueryInput) -> ProtocolResult<&QueryParams> {
    query
        .as_ref()
        .map(|Query(params)| params)
        .map_err(|rejection| ProtocolError::InvalidParameter {
            name: "query",
            reason: rejection.body_text(),
        })
}

fn required_key(query: &QueryParams) -> ProtocolResult<Key> {
    let key = non_empty(query.key.as_deref(), params::KEY)?;
    Key::new(key).map_err(|e| ProtocolError::InvalidParameter {
        name: params::KEY,
        reason: e.to_string(),
    })
}

fn non_empty<'a>(value: Option<&'a str>, name: &'static str) -> ProtocolResult<&'a str> {
    value
        .filter(|value| !value.is_empty())
        .ok_or(ProtocolError::MissingParameter(name))
}
