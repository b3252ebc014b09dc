use async_trait::async_trait;
use msgd::error::BrokerResult;
use msgd::utils::Timestamp;

/// The contract every storage backend must satisfy. Both the in-memory
/// reference implementation and the durable file store honor identical
/// semantics so the conformance suite in `tests/` passes against either.
#[async_trait]
pub trait BackingStore: Send + Sync {
    /// Appends `message` to `topic`, creating the topic on demand, and
    /// returns the message number assigned to it (1 for a topic's first
    /// message). Durable-on-return for implementations that persist to disk.
    async fn store(&self, topic: &str, message: Vec<u8>) -> BrokerResult<u32>;

    /// Returns, in order, every message in `topic` whose message number is
    /// at or above `read_from`, plus the read-from cursor to use for the
    /// next call. Fails with `BrokerError::UnknownTopic` if `topic` has
    /// never been stored to.
    async fn poll(&self, topic: &str, read_from: u32) -> BrokerResult<(Vec<Vec<u8>>, u32)>;

    /// Deletes messages created strictly before `max_age`, returning how
    /// many were actually removed. Granularity may differ between
    /// implementations (whole-message for the in-memory store, whole-segment
    /// for the file store) per the contract.
    async fn remove_old_messages(&self, max_age: Timestamp) -> BrokerResult<usize>;

    /// Empties the store completely.
    async fn delete_contents(&self) -> BrokerResult<()>;
}
