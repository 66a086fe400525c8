//! An in-memory key-value store which can replicate a single upstream node.
//!
//! Conflicts between nodes are resolved with last-write-wins on the record
//! timestamp, see [`store::Record::supersedes`].

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
mod engine;
mod error;
pub mod replication;
mod server;
pub mod store;

pub use config::{Config, PeerConfig};
pub use engine::KvsEngine;
pub use error::{ErrorKind, KvStoreError};
pub use server::Server;
pub use store::{KvStore, Record, Snapshot};

pub type Result<T> = std::result::Result<T, KvStoreError>;

/// Config file used by the server when none is given.
pub const DEFAULT_CONFIG: &str = "./config.json";
