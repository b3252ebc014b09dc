mod binary;
mod channels;
mod configs;
mod server_error;
mod shutdown;

use server_error::ServerError;
use shutdown::Shutdown;
use std::sync::Arc;
use streaming::{BackingStore, FileBackingStore, MemoryBackingStore};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    if let Err(error) = run().await {
        error!(%error, "server exited with error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let config = configs::load()?;

    let store: Arc<dyn BackingStore> = match &config.root_dir {
        Some(root_dir) => {
            info!(%root_dir, "using file backing store");
            Arc::new(FileBackingStore::open(root_dir).await?)
        }
        None => {
            info!("ROOT_DIR unset, using in-memory backing store");
            Arc::new(MemoryBackingStore::new())
        }
    };

    let (shutdown, listener_stop) = Shutdown::new();
    let retention_stop = shutdown.subscribe();

    let (mut listener_handle, bound_addr) =
        binary::listener::start(&config.host, store.clone(), listener_stop).await?;
    info!(%bound_addr, "bound");
    let mut retention_handle = channels::commands::retention::start(store, config.retention_time, retention_stop);

    info!("msgd server ready");

    tokio::select! {
        _ = shutdown.wait_for_ctrl_c() => {}
        result = &mut listener_handle => {
            if let Err(join_error) = result {
                error!(%join_error, "listener task panicked");
            }
        }
        result = &mut retention_handle => {
            match result {
                Ok(Err(sweep_error)) => error!(%sweep_error, "retention task failed"),
                Err(join_error) => error!(%join_error, "retention task panicked"),
                Ok(Ok(())) => {}
            }
        }
    }

    shutdown.trigger();
    let _ = listener_handle.await;
    let _ = retention_handle.await;
    info!("msgd server stopped");
    Ok(())
}
