use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use zset_protocol::decode_members;
use zset_store::KeyStore;
use zset_types::FieldValueScore;

use crate::error::ApiError;
use crate::middleware::RequestStart;
use crate::params::{decode_key, decode_key_field, QueryInput, Strictness};
use crate::response::{Params, Payload, Reply};

/// Shared handler state: the store every route forwards to.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KeyStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self { store }
    }
}

type HandlerResult = Result<Reply, ApiError>;

fn members_body(body: Result<Bytes, BytesRejection>) -> Result<Vec<FieldValueScore>, ApiError> {
    let body = body.map_err(|rejection| ApiError::invalid(rejection.body_text()))?;
    Ok(decode_members(&body)?)
}

pub async fn insert(
    RequestStart(started): RequestStart,
    State(state): State<AppState>,
    headers: HeaderMap,
    query: QueryInput,
    body: Result<Bytes, BytesRejection>,
) -> HandlerResult {
    let key = decode_key(&headers, &query, Strictness::Required)?;
    let members = members_body(body)?;
    let changes = state
        .store
        .insert(&key, members)
        .await
        .map_err(ApiError::store)?;
    Ok(Reply::new(Payload::ChangeSet(changes), Params::key(key), started))
}

pub async fn delete(
    RequestStart(started): RequestStart,
    State(state): State<AppState>,
    headers: HeaderMap,
    query: QueryInput,
    body: Result<Bytes, BytesRejection>,
) -> HandlerResult {
    let key = decode_key(&headers, &query, Strictness::Required)?;
    let members = members_body(body)?;
    let changes = state
        .store
        .delete(&key, members)
        .await
        .map_err(ApiError::store)?;
    Ok(Reply::new(Payload::ChangeSet(changes), Params::key(key), started))
}

pub async fn select(
    RequestStart(started): RequestStart,
    State(state): State<AppState>,
    headers: HeaderMap,
    query: QueryInput,
) -> HandlerResult {
    let (key, field) = decode_key_field(&headers, &query, Strictness::Optional)?;
    let record = state
        .store
        .select(&key, &field)
        .await
        .map_err(ApiError::lookup)?;
    Ok(Reply::new(
        Payload::FieldValueScore(record),
        Params::key_field(key, field),
        started,
    ))
}

pub async fn keys(
    RequestStart(started): RequestStart,
    State(state): State<AppState>,
) -> HandlerResult {
    let keys = state.store.keys().await.map_err(ApiError::store)?;
    Ok(Reply::new(Payload::Keys(keys), Params::none(), started))
}

pub async fn size(
    RequestStart(started): RequestStart,
    State(state): State<AppState>,
    headers: HeaderMap,
    query: QueryInput,
) -> HandlerResult {
    let key = decode_key(&headers, &query, Strictness::Optional)?;
    let size = state.store.size(&key).await.map_err(ApiError::store)?;
    Ok(Reply::new(Payload::Int64(size), Params::key(key), started))
}

pub async fn members(
    RequestStart(started): RequestStart,
    State(state): State<AppState>,
    headers: HeaderMap,
    query: QueryInput,
) -> HandlerResult {
    let key = decode_key(&headers, &query, Strictness::Optional)?;
    let fields = state.store.members(&key).await.map_err(ApiError::store)?;
    Ok(Reply::new(Payload::Fields(fields), Params::key(key), started))
}

pub async fn score(
    RequestStart(started): RequestStart,
    State(state): State<AppState>,
    headers: HeaderMap,
    query: QueryInput,
) -> HandlerResult {
    let (key, field) = decode_key_field(&headers, &query, Strictness::Optional)?;
    let presence = state
        .store
        .score(&key, &field)
        .await
        .map_err(ApiError::store)?;
    Ok(Reply::new(
        Payload::Presence(presence),
        Params::key_field(key, field),
        started,
    ))
}

/// Catch-all for unknown paths and wrong methods on known paths.
pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::not_found(format!("no route for {method} {}", uri.path()))
}
