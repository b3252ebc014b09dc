use crate::backing_store::BackingStore;
use crate::message::StoredMessage;
use crate::topic::validate_topic;
use async_trait::async_trait;
use msgd::error::{BrokerError, BrokerResult};
use msgd::utils::Timestamp;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Reference backing-store implementation: per-topic vectors of messages,
/// kept in append order (which is also message-number order and creation-time
/// order, since both are monotone by construction). All operations run under
/// a single mutex, the same single-writer discipline the file store uses.
#[derive(Default)]
pub struct MemoryBackingStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    messages_per_topic: HashMap<String, Vec<StoredMessage>>,
    next_message_number: HashMap<String, u32>,
}

impl MemoryBackingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BackingStore for MemoryBackingStore {
    async fn store(&self, topic: &str, message: Vec<u8>) -> BrokerResult<u32> {
        validate_topic(topic)?;
        let mut state = self.state.lock().await;
        let next_number = state
            .next_message_number
            .entry(topic.to_string())
            .or_insert(0);
        *next_number += 1;
        let message_number = *next_number;

        let stored = StoredMessage {
            payload: message,
            created: Timestamp::now(),
            message_number,
        };
        state
            .messages_per_topic
            .entry(topic.to_string())
            .or_default()
            .push(stored);

        Ok(message_number)
    }

    async fn poll(&self, topic: &str, read_from: u32) -> BrokerResult<(Vec<Vec<u8>>, u32)> {
        let state = self.state.lock().await;
        let messages = state
            .messages_per_topic
            .get(topic)
            .ok_or_else(|| BrokerError::UnknownTopic(topic.to_string()))?;

        let start = messages.partition_point(|m| m.message_number < read_from);
        let found = &messages[start..];
        if found.is_empty() {
            return Ok((Vec::new(), read_from));
        }
        let highest = found.last().expect("non-empty").message_number;
        let payloads = found.iter().map(|m| m.payload.clone()).collect();
        Ok((payloads, highest + 1))
    }

    async fn remove_old_messages(&self, max_age: Timestamp) -> BrokerResult<usize> {
        let mut state = self.state.lock().await;
        let mut total_removed = 0usize;
        for messages in state.messages_per_topic.values_mut() {
            let keep_from = messages.partition_point(|m| m.created < max_age);
            if keep_from == 0 {
                continue;
            }
            total_removed += keep_from;
            // Replace the incumbent vec with a freshly allocated one so the
            // removed prefix's backing storage is released.
            let survivors = messages.split_off(keep_from);
            *messages = survivors;
        }
        Ok(total_removed)
    }

    async fn delete_contents(&self) -> BrokerResult<()> {
        let mut state = self.state.lock().await;
        state.messages_per_topic.clear();
        state.next_message_number.clear();
        Ok(())
    }
}
