use msgd::messages::{PollCommand, PollResponse};
use std::sync::Arc;
use streaming::BackingStore;
use tracing::instrument;

#[instrument(skip(store, command), fields(topic = %command.topic, read_from = command.read_from))]
pub async fn handle(
    store: &Arc<dyn BackingStore>,
    command: PollCommand,
) -> Result<PollResponse, msgd::BrokerError> {
    let (payloads, new_read_from) = store.poll(&command.topic, command.read_from).await?;
    Ok(PollResponse {
        payloads,
        new_read_from,
    })
}
