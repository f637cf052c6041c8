use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Prefix the seven store routes are mounted under.
    pub path_prefix: String,
    /// Path serving the Prometheus text exposition.
    pub metrics_path: String,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 7070)),
            path_prefix: "/store".into(),
            metrics_path: "/metrics".into(),
            max_body_bytes: 4 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> ServerResult<()> {
        if !self.metrics_path.starts_with('/') {
            return Err(ServerError::Config(format!(
                "metrics_path must start with '/': {}",
                self.metrics_path
            )));
        }
        if self.max_body_bytes == 0 {
            return Err(ServerError::Config("max_body_bytes must be positive".into()));
        }
        Ok(())
    }

    /// The route prefix with a leading `/` and no trailing `/`; empty when
    /// routes are mounted at the root.
    pub fn normalized_prefix(&self) -> String {
        normalize_prefix(&self.path_prefix)
    }
}

pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
