use crate::file::index::Index;
use crate::file::segment::{encode_record, new_segment_name, MAX_SEGMENT_SIZE};
use crate::message::StoredMessage;
use msgd::error::{BrokerError, BrokerResult};
use msgd::utils::Timestamp;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

fn segment_path(root: &Path, topic: &str, name: &str) -> PathBuf {
    root.join(topic).join(name)
}

/// Appends `payload` to `topic`'s active segment, opening a new segment
/// first if the active one would overflow `MAX_SEGMENT_SIZE`. Mutates
/// `index` in place; the caller persists it once the append has landed on
/// disk.
pub async fn store(
    index: &mut Index,
    root: &Path,
    topic: &str,
    payload: Vec<u8>,
) -> BrokerResult<u32> {
    let message_number = index.peek_next_message_number(topic);
    let created = Timestamp::now();
    let message = StoredMessage {
        payload,
        created,
        message_number,
    };
    let record = encode_record(&message)?;
    let record_len = record.len() as u64;

    let topic_dir = root.join(topic);
    tokio::fs::create_dir_all(&topic_dir)
        .await
        .map_err(|e| BrokerError::io(format!("creating topic dir {}", topic_dir.display()), e))?;

    let segment_list = index.ensure_topic(topic);
    let needs_new_segment = match segment_list.current() {
        None => true,
        Some(name) => {
            let size = segment_list.segments[name].size;
            size + record_len > MAX_SEGMENT_SIZE
        }
    };

    let segment_name = if needs_new_segment {
        let name = new_segment_name(topic, |candidate| segment_list.previously_used(candidate))?;
        segment_list.register_new_segment(name.clone());
        name
    } else {
        segment_list.current().expect("checked above").to_string()
    };

    let path = segment_path(root, topic, &segment_name);
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await
        .map_err(|e| BrokerError::io(format!("opening segment {}", path.display()), e))?;
    file.write_all(&record)
        .await
        .map_err(|e| BrokerError::io(format!("writing segment {}", path.display()), e))?;
    file.flush()
        .await
        .map_err(|e| BrokerError::io(format!("flushing segment {}", path.display()), e))?;

    segment_list
        .segments
        .get_mut(&segment_name)
        .expect("just registered or already current")
        .register_message(message_number, created, record_len);
    index.advance_message_number(topic);

    Ok(message_number)
}
