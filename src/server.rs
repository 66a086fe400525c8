use crate::api;
use crate::config::{Config, PeerConfig};
use crate::replication::SyncLoop;
use crate::store::KvStore;
use crate::KvsEngine;
use crate::{KvStoreError, Result};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// A node with its listener bound, ready to serve.
///
/// The node owns its store. The HTTP handlers and, on a replica, the sync
/// loop each receive a handle onto it when the node starts running.
pub struct Server<E> {
    store: E,
    listener: TcpListener,
    peer: Option<PeerConfig>,
}

impl Server<KvStore> {
    /// Bind a node backed by a fresh, empty [`KvStore`].
    pub async fn bind(config: &Config) -> Result<Self> {
        Self::bind_with(config, KvStore::new()).await
    }
}

impl<E: KvsEngine> Server<E> {
    /// Bind the listener for the configured address.
    ///
    /// Failing to bind is the one unrecoverable startup error, returned as
    /// [`KvStoreError::Bind`].
    pub async fn bind_with(config: &Config, store: E) -> Result<Self> {
        let peer = config.peer()?;
        let addr = config.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| KvStoreError::Bind {
                source,
                addr: addr.clone(),
            })?;
        info!("Listening on {}", listener.local_addr()?);
        Ok(Self {
            store,
            listener,
            peer,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn store(&self) -> &E {
        &self.store
    }

    /// Serve until Ctrl-C is received.
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            match tokio::signal::ctrl_c().await {
                Ok(_) => info!("Received shutdown signal"),
                Err(e) => error!("Error receiving Ctrl-C: {e}"),
            }
        })
        .await
    }

    /// Serve until `shutdown` resolves, then stop the listener and the sync
    /// loop and wait for both.
    ///
    /// The listener finishes the requests already in flight. The sync loop
    /// finishes a cycle already in flight.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let token = CancellationToken::new();

        let app = api::router(self.store.clone());
        let listener = self.listener;
        let http_token = token.clone();
        let mut http = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { http_token.cancelled().await })
                .await
        });

        let sync = match &self.peer {
            Some(peer) => {
                let sync = SyncLoop::new(self.store.clone(), peer);
                Some((peer.base_url(), tokio::spawn(sync.run(token.clone()))))
            }
            None => {
                info!("No node configured, running standalone");
                None
            }
        };

        tokio::pin!(shutdown);
        let served = tokio::select! {
            _ = &mut shutdown => {
                info!("Stopping listener and sync loop");
                token.cancel();
                (&mut http).await
            }
            served = &mut http => {
                error!("Listener stopped unexpectedly");
                token.cancel();
                served
            }
        };

        if let Some((peer, handle)) = sync {
            handle.await.map_err(|source| KvStoreError::TaskFailed {
                source,
                task: format!("sync with {peer}"),
            })?;
        }
        served.map_err(|source| KvStoreError::TaskFailed {
            source,
            task: "http listener".to_string(),
        })??;

        info!("Shutdown complete");
        Ok(())
    }
}
