pub mod duration;
pub mod timestamp;

pub use duration::BrokerDuration;
pub use timestamp::Timestamp;
