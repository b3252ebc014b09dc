use msgd::error::BrokerResult;
use msgd::utils::{BrokerDuration, Timestamp};
use std::sync::Arc;
use std::time::Duration;
use streaming::BackingStore;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Spawns the background task that periodically deletes messages older
/// than `retention_time`. Wakes at one tenth of the retention window
/// (`BrokerDuration::tick_interval`), the same ratio the teacher's
/// `MessagesCleaner` uses between its configured interval and its sweep.
/// Stops as soon as `stop` is signalled; a sweep failure also ends the task,
/// with the error carried in the join result so `main` can treat it as the
/// "retention loop and RPC server are peers" failure from spec.md §4.4 and
/// shut the listener down too (via the `tokio::select!` in `main.rs` that
/// races this handle against the listener's).
pub fn start(
    store: Arc<dyn BackingStore>,
    retention_time: BrokerDuration,
    mut stop: watch::Receiver<bool>,
) -> JoinHandle<BrokerResult<()>> {
    let tick = retention_time.tick_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick);
        info!(
            retention_time = %retention_time,
            tick_interval = ?tick,
            "retention task started"
        );
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    sweep(store.as_ref(), retention_time).await?;
                }
                _ = stop.changed() => {
                    if *stop.borrow() {
                        info!("retention task stopping");
                        return Ok(());
                    }
                }
            }
        }
    })
}

async fn sweep(store: &dyn BackingStore, retention_time: BrokerDuration) -> BrokerResult<()> {
    let cutoff_micros = Timestamp::now()
        .as_micros()
        .saturating_sub(retention_time.get().as_micros() as u64);
    let max_age = Timestamp::from(cutoff_micros);
    match store.remove_old_messages(max_age).await {
        Ok(0) => Ok(()),
        Ok(removed) => {
            info!(removed, "retention sweep removed expired messages");
            Ok(())
        }
        Err(error) => {
            error!(%error, "retention sweep failed");
            Err(error)
        }
    }
}
