use msgd::error::{BrokerError, BrokerResult};

/// Topics are created implicitly on first `Store`; this is the one place
/// that shape gets checked, regardless of which backend ends up owning the
/// topic.
pub fn validate_topic(topic: &str) -> BrokerResult<()> {
    if topic.is_empty() {
        return Err(BrokerError::InvalidTopic(
            "topic name must not be empty".to_string(),
        ));
    }
    if topic == "." || topic == ".." || topic.contains('/') || topic.contains('\\') {
        return Err(BrokerError::InvalidTopic(format!(
            "topic name is not filesystem-safe: {topic}"
        )));
    }
    Ok(())
}
