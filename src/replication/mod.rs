//! Replication is achieved through a simple replica/upstream model.
//!
//! A node configured with an upstream peer runs a [`SyncLoop`], which on every
//! tick pulls the peer's full snapshot, merges it into the local store using
//! last-write-wins, then pushes the local snapshot back. Both sides therefore
//! converge after a cycle with no concurrent writes. There is exactly one peer
//! per node; longer chains only converge through their own periodic cycles.

mod client;
mod sync;

pub use client::PeerClient;
pub use sync::{CycleReport, SyncLoop, SyncState};
