use async_trait::async_trait;
use msgd::error::BrokerResult;
use msgd::tcp::BrokerClient;
use msgd::utils::{BrokerDuration, Timestamp};
use std::sync::Arc;
use std::time::Duration;
use streaming::{BackingStore, FileBackingStore};

#[path = "../src/binary/mod.rs"]
mod binary;
#[path = "../src/channels/mod.rs"]
mod channels;

async fn spawn_server() -> (String, tokio::sync::watch::Sender<bool>) {
    spawn_server_with_store(|store| store).await
}

async fn spawn_server_with_store(
    wrap: impl FnOnce(Arc<dyn BackingStore>) -> Arc<dyn BackingStore>,
) -> (String, tokio::sync::watch::Sender<bool>) {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn BackingStore> = Arc::new(FileBackingStore::open(dir.path()).await.unwrap());
    let store = wrap(store);
    let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);

    let (_handle, addr) = binary::listener::start("127.0.0.1:0", store.clone(), stop_rx.clone())
        .await
        .unwrap();
    channels::commands::retention::start(store, BrokerDuration::new(Duration::from_secs(3600)), stop_rx);

    // keep the tempdir alive for the test's duration by leaking it; each test
    // gets its own directory so this does not accumulate across the suite.
    std::mem::forget(dir);

    (addr.to_string(), stop_tx)
}

/// Wraps a `BackingStore` with a fixed artificial delay before every call, so
/// tests can exercise the per-request deadline (§5) deterministically without
/// relying on real contention.
struct SlowStore {
    inner: Arc<dyn BackingStore>,
    delay: Duration,
}

#[async_trait]
impl BackingStore for SlowStore {
    async fn store(&self, topic: &str, message: Vec<u8>) -> BrokerResult<u32> {
        tokio::time::sleep(self.delay).await;
        self.inner.store(topic, message).await
    }

    async fn poll(&self, topic: &str, read_from: u32) -> BrokerResult<(Vec<Vec<u8>>, u32)> {
        tokio::time::sleep(self.delay).await;
        self.inner.poll(topic, read_from).await
    }

    async fn remove_old_messages(&self, max_age: Timestamp) -> BrokerResult<usize> {
        tokio::time::sleep(self.delay).await;
        self.inner.remove_old_messages(max_age).await
    }

    async fn delete_contents(&self) -> BrokerResult<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.delete_contents().await
    }
}

#[tokio::test]
async fn produces_and_polls_across_a_tcp_connection() {
    let (addr, _stop) = spawn_server().await;
    let mut client = BrokerClient::connect(&addr).await.unwrap();

    let message_number = client.produce("orders", b"first".to_vec()).await.unwrap();
    assert_eq!(message_number, 1);
    let message_number = client.produce("orders", b"second".to_vec()).await.unwrap();
    assert_eq!(message_number, 2);

    let (payloads, new_read_from) = client.poll("orders", 1).await.unwrap();
    assert_eq!(payloads, vec![b"first".to_vec(), b"second".to_vec()]);
    assert_eq!(new_read_from, 3);

    let (payloads, new_read_from) = client.poll("orders", new_read_from).await.unwrap();
    assert!(payloads.is_empty());
    assert_eq!(new_read_from, 3);
}

#[tokio::test]
async fn polling_an_unknown_topic_is_an_error() {
    let (addr, _stop) = spawn_server().await;
    let mut client = BrokerClient::connect(&addr).await.unwrap();

    let result = client.poll("nonexistent", 1).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn numbering_is_independent_per_topic() {
    let (addr, _stop) = spawn_server().await;
    let mut client = BrokerClient::connect(&addr).await.unwrap();

    client.produce("A", b"a".to_vec()).await.unwrap();
    client.produce("A", b"b".to_vec()).await.unwrap();
    let first_b_number = client.produce("B", b"c".to_vec()).await.unwrap();
    assert_eq!(first_b_number, 1);
}

#[tokio::test]
async fn a_deadline_shorter_than_the_store_call_is_honored() {
    let (addr, _stop) = spawn_server_with_store(|inner| {
        Arc::new(SlowStore {
            inner,
            delay: Duration::from_millis(200),
        })
    })
    .await;
    let mut client = BrokerClient::connect(&addr).await.unwrap();

    let result = client
        .produce_with_deadline("orders", b"first".to_vec(), Duration::from_millis(20))
        .await;
    let error = result.unwrap_err();
    assert!(error.to_string().contains("deadline"));
}

#[tokio::test]
async fn a_deadline_longer_than_the_store_call_still_succeeds() {
    let (addr, _stop) = spawn_server_with_store(|inner| {
        Arc::new(SlowStore {
            inner,
            delay: Duration::from_millis(20),
        })
    })
    .await;
    let mut client = BrokerClient::connect(&addr).await.unwrap();

    let message_number = client
        .produce_with_deadline("orders", b"first".to_vec(), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(message_number, 1);
}
