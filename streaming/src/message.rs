use msgd::utils::Timestamp;
use serde::{Deserialize, Serialize};

/// The structure that is serialized and appended to a segment file. The
/// payload is never interpreted by the store — it must round-trip
/// byte-identical.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredMessage {
    pub payload: Vec<u8>,
    pub created: Timestamp,
    pub message_number: u32,
}
