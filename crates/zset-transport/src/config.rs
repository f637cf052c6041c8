use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Prefix the remote server mounts its routes under.
    pub path_prefix: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            path_prefix: "/store".into(),
        }
    }
}

impl TransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The prefix with a leading `/` and no trailing `/`, or empty.
    pub fn normalized_prefix(&self) -> String {
        let trimmed = self.path_prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }
}
