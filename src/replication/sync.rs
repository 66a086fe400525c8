use super::PeerClient;
use crate::config::PeerConfig;
use crate::engine::KvsEngine;
use crate::Result;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Waiting for the next tick.
    Idle,

    /// A pull/merge/push cycle is in flight.
    Exchanging,

    /// The loop observed the stop signal and returned.
    Terminated,
}

/// Outcome of a single successful sync cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Records received from the peer.
    pub pulled: usize,

    /// Pulled records which replaced or created a local record.
    pub applied: usize,

    /// Records sent back to the peer.
    pub pushed: usize,
}

/// Periodic full-state exchange with the single upstream peer.
pub struct SyncLoop<E> {
    store: E,
    peer: PeerClient,
    interval: Duration,
    state: watch::Sender<SyncState>,
}

impl<E: KvsEngine> SyncLoop<E> {
    pub fn new(store: E, peer: &PeerConfig) -> Self {
        Self::with_client(store, PeerClient::new(peer.base_url()), peer.sync_interval)
    }

    pub fn with_client(store: E, peer: PeerClient, interval: Duration) -> Self {
        let (state, _) = watch::channel(SyncState::Idle);
        Self {
            store,
            peer,
            interval,
            state,
        }
    }

    /// Observe state transitions of the loop.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    /// Pull the peer's snapshot, merge it, then push the local snapshot.
    ///
    /// A failed pull returns before anything is merged. A failed push leaves
    /// the pulled records merged, which is safe to repeat on the next cycle.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let incoming = self.peer.pull().await?;
        let pulled = incoming.len();
        let applied = self.store.merge(incoming);

        let outgoing = self.store.snapshot();
        self.peer.push(&outgoing).await?;

        Ok(CycleReport {
            pulled,
            applied,
            pushed: outgoing.len(),
        })
    }

    /// Run cycles on every tick until `shutdown` is cancelled.
    ///
    /// The token is only checked between cycles, a cycle which has started
    /// always runs to completion or failure. Failed cycles are logged and
    /// retried on the next regular tick.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            peer = self.peer.base_url(),
            interval = ?self.interval,
            "Starting sync loop"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            self.state.send_replace(SyncState::Exchanging);
            match self.run_cycle().await {
                Ok(report) => debug!(
                    pulled = report.pulled,
                    applied = report.applied,
                    pushed = report.pushed,
                    "Sync cycle complete"
                ),
                Err(e) => warn!(peer = self.peer.base_url(), "Sync cycle failed: {e}"),
            }
            self.state.send_replace(SyncState::Idle);
        }

        self.state.send_replace(SyncState::Terminated);
        info!(peer = self.peer.base_url(), "Sync loop stopped");
    }
}
