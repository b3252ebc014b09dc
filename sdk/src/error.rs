use std::io;
use thiserror::Error;

/// Error taxonomy for the data path: the `BackingStore` contract, the wire
/// codec, and anything a client can observe as the outcome of a request.
///
/// Mirrors the shape of the kinds enumerated in the design: `UnknownTopic` is
/// reported but never retried internally, `Io` wraps a filesystem failure
/// with context, and the codec errors cover malformed frames on the wire or
/// on disk.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("unknown topic: {0}")]
    UnknownTopic(String),

    #[error("invalid topic name: {0}")]
    InvalidTopic(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: bincode::Error,
    },

    #[error("failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: bincode::Error,
    },

    #[error("could not find a free segment name for topic {0} after {1} attempts")]
    SegmentNamesExhausted(String, u32),

    #[error("request deadline exceeded waiting for {0}")]
    DeadlineExceeded(String),
}

impl BrokerError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        BrokerError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type BrokerResult<T> = Result<T, BrokerError>;
