//! Millisecond durations used for message time-to-live.

use std::fmt;
use std::ops::Mul;

use serde::{Deserialize, Serialize};

/// A span of time with millisecond resolution.
///
/// Arithmetic saturates at [`Duration::FOREVER`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Duration(u64);

impl Duration {
    /// Zero length.
    pub const IMMEDIATE: Duration = Duration(0);
    /// One second.
    pub const SECOND: Duration = Duration(1000);
    /// One minute.
    pub const MINUTE: Duration = Duration(60 * 1000);
    /// No limit.
    pub const FOREVER: Duration = Duration(u64::MAX);

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    pub const fn is_forever(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Mul<u64> for Duration {
    type Output = Duration;

    fn mul(self, rhs: u64) -> Duration {
        Duration(self.0.saturating_mul(rhs))
    }
}

impl Mul<Duration> for u64 {
    type Output = Duration;

    fn mul(self, rhs: Duration) -> Duration {
        rhs * self
    }
}

impl From<std::time::Duration> for Duration {
    fn from(d: std::time::Duration) -> Self {
        Self(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

impl From<Duration> for std::time::Duration {
    fn from(d: Duration) -> Self {
        std::time::Duration::from_millis(d.0)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_forever() {
            f.write_str("forever")
        } else {
            write!(f, "{}ms", self.0)
        }
    }
}
