use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A human-readable duration, parsed from forms like `"5m"` or `"3s"` via
/// `humantime`. Used for the `RETENTION_TIME` environment variable and for
/// sizing the retention task's wake-up interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerDuration(Duration);

impl BrokerDuration {
    pub fn new(duration: Duration) -> Self {
        BrokerDuration(duration)
    }

    pub fn get(&self) -> Duration {
        self.0
    }

    /// The retention task wakes at one tenth of the retention window, per
    /// design: if messages are kept for 50 minutes, check for expiry every 5.
    pub fn tick_interval(&self) -> Duration {
        let tenth = self.0 / 10;
        if tenth.is_zero() {
            Duration::from_millis(1)
        } else {
            tenth
        }
    }
}

impl FromStr for BrokerDuration {
    type Err = humantime::DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(BrokerDuration(humantime::parse_duration(s)?))
    }
}

impl fmt::Display for BrokerDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", humantime::format_duration(self.0))
    }
}

impl From<Duration> for BrokerDuration {
    fn from(duration: Duration) -> Self {
        BrokerDuration(duration)
    }
}
