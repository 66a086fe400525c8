use replikv::client::NodeClient;
use replikv::replication::PeerClient;
use replikv::{Config, ErrorKind, KvStore, KvStoreError, KvsEngine, Server};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;

struct RunningNode {
    addr: SocketAddr,
    store: KvStore,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<replikv::Result<()>>,
}

impl RunningNode {
    async fn start(config: Config) -> Self {
        let server = Server::bind(&config).await.unwrap();
        let addr = server.local_addr().unwrap();
        let store = server.store().clone();
        let (stop, stopped) = oneshot::channel();
        let handle = tokio::spawn(server.run_until(async move {
            let _ = stopped.await;
        }));
        RunningNode {
            addr,
            store,
            stop,
            handle,
        }
    }

    fn client(&self) -> NodeClient {
        NodeClient::new(&self.addr.to_string())
    }

    fn peer(&self) -> PeerClient {
        PeerClient::new(format!("http://{}", self.addr))
    }

    async fn shutdown(self) {
        self.stop.send(()).unwrap();
        self.handle.await.unwrap().unwrap();
    }
}

fn standalone() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        node_host: None,
        node_port: None,
        request_timeout: 0,
    }
}

fn replica_of(upstream: SocketAddr) -> Config {
    Config {
        node_host: Some(upstream.ip().to_string()),
        node_port: Some(upstream.port()),
        request_timeout: 1,
        ..standalone()
    }
}

async fn wait_for(store: &KvStore, key: &str, value: &str) {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if store.get(key).ok().as_deref() == Some(value) {
            return;
        }
        assert!(
            Instant::now() < deadline,
            "{key} never replicated with value {value}"
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test]
async fn standalone_set_and_get() {
    let node = RunningNode::start(standalone()).await;
    let client = node.client();

    client.set("a".to_string(), "1".to_string()).await.unwrap();
    assert_eq!(client.get("a").await.unwrap(), "1");

    let err = client.get("missing").await.unwrap_err();
    assert!(matches!(err, KvStoreError::NodeStatus { .. }));
    // Failures of the public client are not replication errors.
    assert_eq!(err.kind(), ErrorKind::Internal);

    node.shutdown().await;
}

#[tokio::test]
async fn replica_pulls_from_upstream() {
    let upstream = RunningNode::start(standalone()).await;
    let replica = RunningNode::start(replica_of(upstream.addr)).await;

    upstream
        .client()
        .set("k".to_string(), "v".to_string())
        .await
        .unwrap();
    wait_for(&replica.store, "k", "v").await;
    assert_eq!(replica.client().get("k").await.unwrap(), "v");

    assert_eq!(
        upstream.peer().pull().await.unwrap(),
        replica.peer().pull().await.unwrap()
    );

    replica.shutdown().await;
    upstream.shutdown().await;
}

#[tokio::test]
async fn replica_pushes_to_upstream() {
    let upstream = RunningNode::start(standalone()).await;
    let replica = RunningNode::start(replica_of(upstream.addr)).await;

    replica
        .client()
        .set("from-replica".to_string(), "1".to_string())
        .await
        .unwrap();
    wait_for(&upstream.store, "from-replica", "1").await;

    replica.shutdown().await;
    upstream.shutdown().await;
}

#[tokio::test]
async fn replica_survives_missing_upstream() {
    // Reserve a port and release it so the replica's upstream is unreachable.
    let unused = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream = unused.local_addr().unwrap();
    drop(unused);

    let replica = RunningNode::start(replica_of(upstream)).await;
    tokio::time::sleep(Duration::from_millis(1500)).await;

    let client = replica.client();
    client.set("a".to_string(), "1".to_string()).await.unwrap();
    assert_eq!(client.get("a").await.unwrap(), "1");

    replica.shutdown().await;
}

#[tokio::test]
async fn bind_failure_is_fatal() {
    let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let config = Config {
        port: taken.local_addr().unwrap().port(),
        ..standalone()
    };

    match Server::bind(&config).await {
        Err(err) => {
            assert!(matches!(err, KvStoreError::Bind { .. }));
            assert_eq!(err.kind(), ErrorKind::Fatal);
        }
        Ok(_) => panic!("bound an address which is already in use"),
    }
}
