use async_trait::async_trait;
use serde::de::DeserializeOwned;
use zset_protocol::{params, ErrorEnvelope, MembersRequest, Operation, Records};
use zset_store::{KeyStore, StoreError, StoreResult};
use zset_types::{ChangeSet, Field, FieldValueScore, Key, Presence};

use crate::config::TransportConfig;
use crate::hash::endpoint_hash;
use crate::traits::Transport;

/// Speaks the zset HTTP protocol to one server.
///
/// Each operation maps to its path under the configured prefix; `key` and
/// `field` travel as query parameters and member batches as the JSON body.
/// Any non-2xx reply fails with [`StoreError::Remote`], carrying the status
/// and the server's description.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    host: String,
    base_url: String,
    hash: u32,
}

impl HttpTransport {
    pub fn new(host: impl Into<String>, config: &TransportConfig) -> StoreResult<Self> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(StoreError::Invalid("empty transport host".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let origin = if host.contains("://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("http://{host}")
        };
        Ok(Self {
            client,
            base_url: format!("{origin}{}", config.normalized_prefix()),
            hash: endpoint_hash(&host),
            host,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<T: DeserializeOwned>(
        &self,
        op: Operation,
        query: &[(&str, &str)],
        members: Option<Vec<FieldValueScore>>,
    ) -> StoreResult<T> {
        let url = format!("{}{}", self.base_url, op.path());
        let request = if op.is_mutation() {
            self.client.post(&url)
        } else {
            self.client.get(&url)
        };
        let request = match members {
            Some(members) => request.query(query).json(&MembersRequest { members }),
            None => request.query(query),
        };

        tracing::debug!(%url, op = %op, "remote call");
        let response = request.send().await.map_err(|e| {
            tracing::warn!(%url, error = %e, "remote call failed");
            StoreError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .bytes()
                .await
                .map_err(|e| StoreError::Transport(e.to_string()))?;
            let description = match serde_json::from_slice::<ErrorEnvelope>(&body) {
                Ok(envelope) => envelope.description,
                Err(_) => String::from_utf8_lossy(&body).into_owned(),
            };
            tracing::warn!(%url, status = status.as_u16(), %description, "remote call rejected");
            return Err(StoreError::Remote {
                code: status.as_u16(),
                description,
            });
        }

        let records: Records<T> = response
            .json()
            .await
            .map_err(|e| StoreError::Transport(format!("undecodable reply: {e}")))?;
        Ok(records.into_inner())
    }
}

#[async_trait]
impl KeyStore for HttpTransport {
    async fn insert(&self, key: &Key, members: Vec<FieldValueScore>) -> StoreResult<ChangeSet> {
        self.call(Operation::Insert, &[(params::KEY, key.as_str())], Some(members))
            .await
    }

    async fn delete(&self, key: &Key, members: Vec<FieldValueScore>) -> StoreResult<ChangeSet> {
        self.call(Operation::Delete, &[(params::KEY, key.as_str())], Some(members))
            .await
    }

    async fn select(&self, key: &Key, field: &Field) -> StoreResult<FieldValueScore> {
        let query = [(params::KEY, key.as_str()), (params::FIELD, field.as_str())];
        self.call(Operation::Select, &query, None).await
    }

    async fn keys(&self) -> StoreResult<Vec<Key>> {
        self.call(Operation::Keys, &[], None).await
    }

    async fn size(&self, key: &Key) -> StoreResult<i64> {
        self.call(Operation::Size, &[(params::KEY, key.as_str())], None)
            .await
    }

    async fn members(&self, key: &Key) -> StoreResult<Vec<Field>> {
        self.call(Operation::Members, &[(params::KEY, key.as_str())], None)
            .await
    }

    async fn score(&self, key: &Key, field: &Field) -> StoreResult<Presence> {
        let query = [(params::KEY, key.as_str()), (params::FIELD, field.as_str())];
        self.call(Operation::Score, &query, None).await
    }
}

impl Transport for HttpTransport {
    fn hash(&self) -> u32 {
        self.hash
    }

    fn endpoint(&self) -> &str {
        &self.host
    }
}
