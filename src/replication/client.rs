use crate::api::{INTERNAL_GET_PATH, INTERNAL_SET_PATH};
use crate::store::Snapshot;
use crate::{KvStoreError, Result};
use reqwest::StatusCode;

/// Client for the internal endpoints of the upstream node.
#[derive(Debug, Clone)]
pub struct PeerClient {
    http: reqwest::Client,
    base_url: String,
}

impl PeerClient {
    /// `base_url` is the scheme and authority of the peer, e.g.
    /// `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the full snapshot held by the peer.
    ///
    /// A peer with nothing to return answers `204 No Content`, which is
    /// treated as an empty snapshot.
    ///
    /// `last_update_time=0` is always sent: older nodes reject a pull without
    /// it, and zero asks them for every record.
    pub async fn pull(&self) -> Result<Snapshot> {
        let url = format!("{}{}", self.base_url, INTERNAL_GET_PATH);
        let response = self
            .http
            .get(&url)
            .query(&[("last_update_time", "0")])
            .send()
            .await
            .map_err(|source| KvStoreError::PeerRequest {
                source,
                url: url.clone(),
            })?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(Snapshot::new()),
            StatusCode::OK => response
                .json::<Snapshot>()
                .await
                .map_err(|source| KvStoreError::PeerRequest { source, url }),
            status => Err(KvStoreError::PeerStatus { url, status }),
        }
    }

    /// Send a snapshot for the peer to merge into its own store.
    pub async fn push(&self, snapshot: &Snapshot) -> Result<()> {
        let url = format!("{}{}", self.base_url, INTERNAL_SET_PATH);
        let response = self
            .http
            .post(&url)
            .json(snapshot)
            .send()
            .await
            .map_err(|source| KvStoreError::PeerRequest {
                source,
                url: url.clone(),
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(KvStoreError::PeerStatus { url, status }),
        }
    }
}
