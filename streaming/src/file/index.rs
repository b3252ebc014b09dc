use msgd::error::{BrokerError, BrokerResult};
use msgd::utils::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Message number and creation time for one stored message. A zero
/// `message_number` signals "uninitialized" (mirrors the Go source's use of
/// the zero value before a segment's first message lands).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgMeta {
    pub message_number: u32,
    pub created: Timestamp,
}

/// Metadata for one segment file: its message-number range, creation times,
/// current byte size, and the intra-file seek offset for every message it
/// holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentMeta {
    pub oldest: MsgMeta,
    pub newest: MsgMeta,
    pub size: u64,
    pub offsets: BTreeMap<u32, u64>,
}

impl SegmentMeta {
    pub fn register_message(&mut self, message_number: u32, created: Timestamp, encoded_len: u64) {
        self.offsets.insert(message_number, self.size);
        self.size += encoded_len;
        if self.oldest.message_number == 0 {
            self.oldest = MsgMeta {
                message_number,
                created,
            };
        }
        self.newest = MsgMeta {
            message_number,
            created,
        };
    }

    pub fn message_count(&self) -> u32 {
        if self.oldest.message_number == 0 {
            0
        } else {
            self.newest.message_number - self.oldest.message_number + 1
        }
    }
}

/// The ordered list of segment names for one topic, plus their metadata. The
/// last name is the "current" (active) segment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentList {
    pub names: Vec<String>,
    pub segments: HashMap<String, SegmentMeta>,
}

impl SegmentList {
    pub fn register_new_segment(&mut self, name: String) {
        self.segments.insert(name.clone(), SegmentMeta::default());
        self.names.push(name);
    }

    pub fn current(&self) -> Option<&str> {
        self.names.last().map(|s| s.as_str())
    }

    pub fn previously_used(&self, name: &str) -> bool {
        self.segments.contains_key(name)
    }

    /// Segments whose newest message is strictly older than `max_age`. A
    /// segment that has never received a message (newest still zero-valued)
    /// is never spent.
    pub fn spent_segments(&self, max_age: Timestamp) -> Vec<String> {
        self.names
            .iter()
            .filter(|name| {
                self.segments
                    .get(name.as_str())
                    .map(|meta| {
                        meta.newest.message_number != 0 && meta.newest.created < max_age
                    })
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    pub fn forget_segments(&mut self, names: &[String]) {
        for name in names {
            self.segments.remove(name);
        }
        let drop_set: std::collections::HashSet<&String> = names.iter().collect();
        self.names.retain(|n| !drop_set.contains(n));
    }

    /// The earliest segment containing a message number >= `from`, plus
    /// every segment after it, in creation order. Binary search over each
    /// segment's `newest.message_number`, which is monotone across the
    /// ordered list by construction.
    pub fn segments_from(&self, from: u32) -> &[String] {
        let idx = self
            .names
            .partition_point(|name| self.segments[name].newest.message_number < from);
        &self.names[idx..]
    }
}

/// The sole source of truth about what exists on disk for the file store.
/// Segment file contents are never scanned to rebuild it at runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Index {
    pub topics: HashMap<String, SegmentList>,
    next_message_number: HashMap<String, u32>,
}

impl Index {
    pub fn ensure_topic(&mut self, topic: &str) -> &mut SegmentList {
        self.topics.entry(topic.to_string()).or_default()
    }

    /// The next-available message number for `topic`, without consuming it.
    pub fn peek_next_message_number(&self, topic: &str) -> u32 {
        *self.next_message_number.get(topic).unwrap_or(&1)
    }

    /// Bumps the topic's next-message-number counter. Called only after the
    /// corresponding append has actually succeeded.
    pub fn advance_message_number(&mut self, topic: &str) {
        let next = self.peek_next_message_number(topic);
        self.next_message_number.insert(topic.to_string(), next + 1);
    }
}

pub async fn load(path: &Path) -> BrokerResult<Index> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| BrokerError::io(format!("reading index at {}", path.display()), e))?;
    bincode::deserialize(&bytes).map_err(|source| BrokerError::Decode {
        what: "Index",
        source,
    })
}

pub async fn load_if_present(path: &Path) -> BrokerResult<Index> {
    if tokio::fs::try_exists(path)
        .await
        .map_err(|e| BrokerError::io(format!("checking index at {}", path.display()), e))?
    {
        load(path).await
    } else {
        Ok(Index::default())
    }
}

pub async fn save(path: &Path, index: &Index) -> BrokerResult<()> {
    let bytes = bincode::serialize(index).map_err(|source| BrokerError::Encode {
        what: "Index",
        source,
    })?;
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| BrokerError::io(format!("writing index at {}", path.display()), e))
}
