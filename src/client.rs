use crate::api::{GET_PATH, SET_PATH};
use crate::{KvStoreError, Result};
use reqwest::StatusCode;
use std::collections::HashMap;

/// Actions that can be performed by the client tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Fetch the value of a key.
    GetKey,

    /// Store a `key:value` pair.
    SetKey,
}

/// Split `key:value` on the first colon, so values may contain colons.
pub fn parse_pair(data: &str) -> Result<(String, String)> {
    match data.split_once(':') {
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(KvStoreError::InvalidRequest(format!(
            "expected data in the format key:value, got {data:?}"
        ))),
    }
}

/// Client for the public endpoints of a node.
#[derive(Debug, Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    base_url: String,
}

impl NodeClient {
    /// `addr` is either `host:port` or a full `http://host:port` URL.
    pub fn new(addr: &str) -> Self {
        let base_url = if addr.starts_with("http://") || addr.starts_with("https://") {
            addr.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", addr.trim_end_matches('/'))
        };
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub async fn set(&self, key: String, value: String) -> Result<()> {
        let url = format!("{}{}", self.base_url, SET_PATH);
        let response = self
            .http
            .post(&url)
            .json(&HashMap::from([(key, value)]))
            .send()
            .await
            .map_err(|source| KvStoreError::NodeRequest {
                source,
                url: url.clone(),
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(KvStoreError::NodeStatus { url, status }),
        }
    }

    pub async fn get(&self, key: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, GET_PATH);
        let response = self
            .http
            .get(&url)
            .query(&[("key", key)])
            .send()
            .await
            .map_err(|source| KvStoreError::NodeRequest {
                source,
                url: url.clone(),
            })?;

        if response.status() != StatusCode::OK {
            return Err(KvStoreError::NodeStatus {
                url,
                status: response.status(),
            });
        }
        let mut body: HashMap<String, String> = response
            .json()
            .await
            .map_err(|source| KvStoreError::NodeRequest { source, url })?;
        body.remove(key).ok_or_else(|| KvStoreError::KeyNotFound {
            key: key.to_string(),
        })
    }
}
