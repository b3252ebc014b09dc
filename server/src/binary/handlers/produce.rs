use msgd::messages::{ProduceCommand, ProduceResponse};
use std::sync::Arc;
use streaming::BackingStore;
use tracing::instrument;

#[instrument(skip(store, command), fields(topic = %command.topic, payload_len = command.payload.len()))]
pub async fn handle(
    store: &Arc<dyn BackingStore>,
    command: ProduceCommand,
) -> Result<ProduceResponse, msgd::BrokerError> {
    let message_number = store.store(&command.topic, command.payload).await?;
    Ok(ProduceResponse { message_number })
}
