use crate::binary::connection;
use msgd::error::BrokerError;
use std::net::SocketAddr;
use std::sync::Arc;
use streaming::BackingStore;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Accepts connections on `host` and spawns a handler task per connection,
/// sharing one `BackingStore` behind an `Arc`. Runs until `shutdown`
/// resolves, at which point no new connections are accepted (connections
/// already in flight finish on their own). Returns the task handle together
/// with the address actually bound, so a caller binding to port 0 can learn
/// which port it landed on.
pub async fn start(
    host: &str,
    store: Arc<dyn BackingStore>,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) -> Result<(JoinHandle<()>, SocketAddr), BrokerError> {
    let listener = TcpListener::bind(host)
        .await
        .map_err(|e| BrokerError::io(format!("binding to {host}"), e))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| BrokerError::io("reading bound address", e))?;
    info!(%host, "listening for connections");

    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let store = store.clone();
                            tokio::spawn(connection::handle(store, stream, peer));
                        }
                        Err(error) => warn!(%error, "failed to accept connection"),
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("listener stopping");
                        return;
                    }
                }
            }
        }
    });

    Ok((handle, local_addr))
}
