use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A microsecond-precision wall-clock timestamp, stamped at `Store` time and
/// used only for retention decisions. Never exposed to clients over the wire.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn now() -> Self {
        let micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before the unix epoch")
            .as_micros() as u64;
        Timestamp(micros)
    }

    pub fn zero() -> Self {
        Timestamp(0)
    }

    pub fn as_micros(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for Timestamp {
    fn from(micros: u64) -> Self {
        Timestamp(micros)
    }
}

impl From<Timestamp> for u64 {
    fn from(timestamp: Timestamp) -> u64 {
        timestamp.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dt = DateTime::<Utc>::from(UNIX_EPOCH + std::time::Duration::from_micros(self.0));
        write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.6f"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_nonzero_and_monotone_enough() {
        let a = Timestamp::now();
        let b = Timestamp::now();
        assert!(a.as_micros() > 0);
        assert!(b >= a);
    }

    #[test]
    fn round_trips_through_u64() {
        let t = Timestamp::from(1_694_968_446_131_680);
        assert_eq!(u64::from(t), 1_694_968_446_131_680);
    }
}
