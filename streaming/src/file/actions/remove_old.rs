use crate::file::index::Index;
use msgd::error::BrokerError;
use msgd::error::BrokerResult;
use msgd::utils::Timestamp;
use std::path::Path;

/// Deletes every segment across every topic whose newest message is older
/// than `max_age`, including the active segment if it qualifies. Whole
/// segments are the unit of removal: a segment with even one message still
/// within `max_age` survives intact.
pub async fn remove_old_messages(index: &mut Index, root: &Path, max_age: Timestamp) -> BrokerResult<usize> {
    let mut total_removed = 0usize;
    for (topic, segment_list) in index.topics.iter_mut() {
        let spent = segment_list.spent_segments(max_age);
        if spent.is_empty() {
            continue;
        }
        for name in &spent {
            total_removed += segment_list.segments[name].message_count() as usize;
            let path = root.join(topic).join(name);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(BrokerError::io(
                        format!("removing segment {}", path.display()),
                        e,
                    ))
                }
            }
        }
        segment_list.forget_segments(&spent);
    }
    Ok(total_removed)
}
