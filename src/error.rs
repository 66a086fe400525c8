use std::path::PathBuf;

/// Broad classification of a [`KvStoreError`], used by callers to decide how
/// an error is reported instead of matching on messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input from a caller. Rejected with no state change.
    Validation,

    /// Lookup of a key which is not in the store.
    NotFound,

    /// Communication with the upstream peer failed.
    Replication,

    /// Startup cannot proceed.
    Fatal,

    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum KvStoreError {
    #[error("key '{key}' not found")]
    KeyNotFound { key: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("I/O error on config file {path}: {source}")]
    ConfigIo {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("Unable to parse config file {path}: {source}")]
    ConfigParse {
        source: serde_json::Error,
        path: PathBuf,
    },

    #[error("Unable to bind listener on {addr}: {source}")]
    Bind {
        source: std::io::Error,
        addr: String,
    },

    #[error("Request to peer {url} failed: {source}")]
    PeerRequest { source: reqwest::Error, url: String },

    #[error("Peer {url} responded with status {status}")]
    PeerStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Request to node {url} failed: {source}")]
    NodeRequest { source: reqwest::Error, url: String },

    #[error("Node {url} responded with status {status}")]
    NodeStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Task {task} ended abnormally: {source}")]
    TaskFailed {
        source: tokio::task::JoinError,
        task: String,
    },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl KvStoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::KeyNotFound { .. } => ErrorKind::NotFound,
            Self::InvalidRequest(_) => ErrorKind::Validation,
            Self::PeerRequest { .. } | Self::PeerStatus { .. } => ErrorKind::Replication,
            Self::InvalidConfig(_)
            | Self::ConfigIo { .. }
            | Self::ConfigParse { .. }
            | Self::Bind { .. } => ErrorKind::Fatal,
            Self::NodeRequest { .. }
            | Self::NodeStatus { .. }
            | Self::TaskFailed { .. }
            | Self::IoError(_) => ErrorKind::Internal,
        }
    }
}

