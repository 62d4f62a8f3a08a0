//! Client configuration
//!
//! Loaded from an optional JSON file; command line flags override it.
//!
//! ```text
//! {
//!   "serverUrl": "ws://localhost:3000",
//!   "base": "http://localhost:3000/",
//!   "heartbeatSecs": 30,
//!   "propagation": "changed-only"
//! }
//! ```

use crate::error::{Error, Result};
use crate::hmr::PropagationPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Subprotocol token negotiated on the update channel
pub const DEFAULT_PROTOCOL: &str = "vite-hmr";

/// Sentinel sent to keep idle proxies from dropping the connection
pub const DEFAULT_HEARTBEAT_MESSAGE: &str = "ping";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ClientConfig {
    /// WebSocket endpoint of the dev server
    pub server_url: String,
    pub protocol: String,
    /// Prefix for module fetch URLs
    pub base: String,
    pub heartbeat_secs: u64,
    pub heartbeat_message: String,
    pub propagation: PropagationPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://localhost:3000".to_string(),
            protocol: DEFAULT_PROTOCOL.to_string(),
            base: "http://localhost:3000/".to_string(),
            heartbeat_secs: 30,
            heartbeat_message: DEFAULT_HEARTBEAT_MESSAGE.to_string(),
            propagation: PropagationPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: ClientConfig = serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.heartbeat_secs == 0 {
            return Err(Error::Config("heartbeatSecs must be greater than 0".to_string()));
        }
        if self.protocol.is_empty() {
            return Err(Error::Config("protocol must not be empty".to_string()));
        }
        url::Url::parse(&self.server_url)?;
        url::Url::parse(&self.base)?;
        Ok(())
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs)
    }
}
