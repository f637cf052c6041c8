use std::sync::Arc;

use zset_store::{StoreError, StoreResult};

use crate::config::TransportConfig;
use crate::http::HttpTransport;
use crate::traits::Transport;

pub const HTTP_PROTOCOL: &str = "http";

/// Builds transports of one protocol.
pub trait TransportStrategy: Send + Sync {
    /// The tag this strategy is registered under.
    fn protocol(&self) -> &'static str;

    fn connect(&self, host: &str) -> StoreResult<Arc<dyn Transport>>;
}

#[derive(Clone, Debug, Default)]
pub struct HttpStrategy {
    config: TransportConfig,
}

impl HttpStrategy {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

impl TransportStrategy for HttpStrategy {
    fn protocol(&self) -> &'static str {
        HTTP_PROTOCOL
    }

    fn connect(&self, host: &str) -> StoreResult<Arc<dyn Transport>> {
        Ok(Arc::new(HttpTransport::new(host, &self.config)?))
    }
}

/// Pick a strategy by protocol tag. Tags are matched case-insensitively.
pub fn strategy_for(
    protocol: &str,
    config: TransportConfig,
) -> StoreResult<Box<dyn TransportStrategy>> {
    match protocol.trim().to_ascii_lowercase().as_str() {
        HTTP_PROTOCOL => Ok(Box::new(HttpStrategy::new(config))),
        other => Err(StoreError::Invalid(format!(
            "unknown transport protocol: {other:?}"
        ))),
    }
}
