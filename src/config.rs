use crate::{KvStoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Node configuration as read from the JSON config file.
///
/// ```json
/// {
///     "host": "127.0.0.1",
///     "port": 8081,
///     "node_host": "127.0.0.1",
///     "node_port": 8080,
///     "request_timeout": 5
/// }
/// ```
///
/// `node_host` and `node_port` together make this node a replica of the node
/// at that address, exchanging data with it every `request_timeout` seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_port: Option<u16>,

    /// Interval between sync cycles, in seconds. Unused on a standalone node.
    #[serde(default)]
    pub request_timeout: u64,
}

/// The single upstream node a replica synchronises with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerConfig {
    pub host: String,
    pub port: u16,
    pub sync_interval: Duration,
}

impl PeerConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| KvStoreError::ConfigIo {
            source,
            path: path.to_path_buf(),
        })?;
        let config: Config =
            serde_json::from_str(&raw).map_err(|source| KvStoreError::ConfigParse {
                source,
                path: path.to_path_buf(),
            })?;
        // Surface a half-configured peer at load time rather than at startup.
        config.peer()?;
        Ok(config)
    }

    /// Address the HTTP listener binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The configured upstream peer, if any.
    pub fn peer(&self) -> Result<Option<PeerConfig>> {
        match (&self.node_host, self.node_port) {
            (None, None) => Ok(None),
            (Some(host), Some(port)) => {
                if self.request_timeout == 0 {
                    return Err(KvStoreError::InvalidConfig(
                        "request_timeout must be at least 1 second when a node is configured"
                            .to_string(),
                    ));
                }
                Ok(Some(PeerConfig {
                    host: host.clone(),
                    port,
                    sync_interval: Duration::from_secs(self.request_timeout),
                }))
            }
            _ => Err(KvStoreError::InvalidConfig(
                "node_host and node_port must be set together".to_string(),
            )),
        }
    }
}
