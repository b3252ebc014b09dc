use crate::message::StoredMessage;
use bytes::{Buf, BufMut, BytesMut};
use msgd::error::{BrokerError, BrokerResult};
use rand::Rng;
use std::io::ErrorKind;
use std::path::Path;

/// Hard cap on a segment's on-disk size. Once a write would push the active
/// segment past this, the store opens a new one.
pub const MAX_SEGMENT_SIZE: u64 = 1024 * 1024;

const SEGMENT_NAME_LEN: usize = 8;
const SEGMENT_NAME_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const NAME_GENERATION_ATTEMPTS: u32 = 32;

/// Picks an 8-character `[A-Z0-9]` name not already in `previously_used`,
/// retrying a bounded number of times before giving up. Collisions are
/// astronomically unlikely but the retry loop keeps behavior well-defined.
pub fn new_segment_name(topic: &str, previously_used: impl Fn(&str) -> bool) -> BrokerResult<String> {
    let mut rng = rand::thread_rng();
    for _ in 0..NAME_GENERATION_ATTEMPTS {
        let name: String = (0..SEGMENT_NAME_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..SEGMENT_NAME_ALPHABET.len());
                SEGMENT_NAME_ALPHABET[idx] as char
            })
            .collect();
        if !previously_used(&name) {
            return Ok(name);
        }
    }
    Err(BrokerError::SegmentNamesExhausted(
        topic.to_string(),
        NAME_GENERATION_ATTEMPTS,
    ))
}

/// Encodes one message as a 4-byte little-endian length prefix followed by
/// its bincode body, the unit appended to a segment file.
pub fn encode_record(message: &StoredMessage) -> BrokerResult<Vec<u8>> {
    let body = bincode::serialize(message).map_err(|source| BrokerError::Encode {
        what: "StoredMessage",
        source,
    })?;
    let mut buf = BytesMut::with_capacity(4 + body.len());
    buf.put_u32_le(body.len() as u32);
    buf.extend_from_slice(&body);
    Ok(buf.to_vec())
}

/// Streams every record out of a segment file in on-disk order. Segment
/// files contain no trailer or count, so decoding stops cleanly at EOF.
pub async fn decode_records_from(path: &Path) -> BrokerResult<Vec<StoredMessage>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| BrokerError::io(format!("reading segment {}", path.display()), e))?;
    decode_records(&bytes)
}

pub(crate) fn decode_records(mut bytes: &[u8]) -> BrokerResult<Vec<StoredMessage>> {
    let mut messages = Vec::new();
    while !bytes.is_empty() {
        if bytes.len() < 4 {
            return Err(BrokerError::io(
                "segment truncated mid length-prefix",
                std::io::Error::from(ErrorKind::UnexpectedEof),
            ));
        }
        let len = bytes.get_u32_le() as usize;
        if bytes.len() < len {
            return Err(BrokerError::io(
                "segment truncated mid record",
                std::io::Error::from(ErrorKind::UnexpectedEof),
            ));
        }
        let (body, rest) = bytes.split_at(len);
        let message: StoredMessage =
            bincode::deserialize(body).map_err(|source| BrokerError::Decode {
                what: "StoredMessage",
                source,
            })?;
        messages.push(message);
        bytes = rest;
    }
    Ok(messages)
}
