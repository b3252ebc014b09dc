use msgd::error::BrokerError;
use thiserror::Error;

/// Process-level failures, as distinct from `BrokerError`'s data-path
/// failures. `main` matches on this to decide how to exit.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to load configuration: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] BrokerError),
}
