use tokio::sync::watch;
use tracing::info;

/// A broadcast-style stop signal shared by the listener task and the
/// retention task. Fires on Ctrl-C; either task can also be torn down if the
/// other exits unexpectedly (see `main.rs`).
pub struct Shutdown {
    sender: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (sender, receiver) = watch::channel(false);
        (Self { sender }, receiver)
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }

    pub fn trigger(&self) {
        let _ = self.sender.send(true);
    }

    pub async fn wait_for_ctrl_c(&self) {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received shutdown signal");
        }
        self.trigger();
    }
}
