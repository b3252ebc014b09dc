use crate::file::index::Index;
use crate::file::segment::decode_records_from;
use msgd::error::{BrokerError, BrokerResult};
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Gathers every message in `topic` at or after `read_from`, reading only
/// the segments that can possibly hold one (and seeking past the ones that
/// don't, in the first segment touched). Does not mutate `index`; the
/// caller skips persisting it after a poll.
pub async fn poll(
    index: &Index,
    root: &Path,
    topic: &str,
    read_from: u32,
) -> BrokerResult<(Vec<Vec<u8>>, u32)> {
    let segment_list = index
        .topics
        .get(topic)
        .ok_or_else(|| BrokerError::UnknownTopic(topic.to_string()))?;

    let names = segment_list.segments_from(read_from);
    if names.is_empty() {
        return Ok((Vec::new(), read_from));
    }

    let mut payloads = Vec::new();
    let mut highest = read_from;
    for (i, name) in names.iter().enumerate() {
        let path = root.join(topic).join(name);
        let messages = if i == 0 {
            let offset = segment_list.segments[name.as_str()]
                .offsets
                .get(&read_from)
                .copied()
                .unwrap_or(0);
            read_from_offset(&path, offset).await?
        } else {
            decode_records_from(&path).await?
        };
        for message in messages {
            if message.message_number < read_from {
                continue;
            }
            highest = message.message_number;
            payloads.push(message.payload);
        }
    }

    if payloads.is_empty() {
        Ok((Vec::new(), read_from))
    } else {
        Ok((payloads, highest + 1))
    }
}

async fn read_from_offset(
    path: &Path,
    offset: u64,
) -> BrokerResult<Vec<crate::message::StoredMessage>> {
    if offset == 0 {
        return decode_records_from(path).await;
    }
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| BrokerError::io(format!("opening segment {}", path.display()), e))?;
    file.seek(std::io::SeekFrom::Start(offset))
        .await
        .map_err(|e| BrokerError::io(format!("seeking in segment {}", path.display()), e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .await
        .map_err(|e| BrokerError::io(format!("reading segment {}", path.display()), e))?;
    crate::file::segment::decode_records(&bytes)
}
