use serde::{Deserialize, Serialize};

/// `Produce(topic, payload) -> msgNumber`. See design §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProduceCommand {
    pub topic: String,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProduceResponse {
    pub message_number: u32,
}

/// `Poll(topic, readFrom) -> {payloads, newReadFrom}`. See design §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollCommand {
    pub topic: String,
    pub read_from: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollResponse {
    pub payloads: Vec<Vec<u8>>,
    pub new_read_from: u32,
}
