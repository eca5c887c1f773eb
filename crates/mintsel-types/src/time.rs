//! Protocol timestamps and the injected clock.
//!
//! Timestamps are whole Unix seconds. [`Timestamp::NEVER`] stands for
//! "does not expire". The engine never reads the system clock itself: callers
//! hand it a reference time, or an engine is built around a [`Clock`].

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

const MICROS_PER_SEC: u64 = 1_000_000;

/// A point in time, in seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// The far future; compares greater than every real timestamp.
    pub const NEVER: Self = Self(u64::MAX);

    #[must_use]
    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    #[must_use]
    pub fn as_secs(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn is_never(self) -> bool {
        self == Self::NEVER
    }

    /// Convert from a chrono UTC datetime. Pre-epoch times clamp to zero.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(u64::try_from(dt.timestamp()).unwrap_or(0))
    }

    /// Convert to a chrono UTC datetime; `None` for `NEVER` or out-of-range values.
    #[must_use]
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        if self.is_never() {
            return None;
        }
        let secs = i64::try_from(self.0).ok()?;
        Utc.timestamp_opt(secs, 0).single()
    }

    /// Subtract a number of seconds, saturating at zero. `NEVER` stays `NEVER`.
    #[must_use]
    pub fn saturating_sub_secs(self, secs: u64) -> Self {
        if self.is_never() {
            self
        } else {
            Self(self.0.saturating_sub(secs))
        }
    }

    /// Whether the stamp has its own microsecond encoding in signed records.
    /// Finite stamps past `u64::MAX / 10^6` seconds would collide with `NEVER`.
    #[must_use]
    pub fn is_signable(self) -> bool {
        self.is_never() || self.0.checked_mul(MICROS_PER_SEC).is_some()
    }

    /// The big-endian microsecond encoding used inside signed records.
    ///
    /// Stamps that are not [signable](Self::is_signable) saturate to the
    /// `NEVER` encoding.
    #[must_use]
    pub fn to_signed_bytes(self) -> [u8; 8] {
        let micros = if self.is_never() {
            u64::MAX
        } else {
            self.0.saturating_mul(MICROS_PER_SEC)
        };
        micros.to_be_bytes()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_never() {
            write!(f, "never")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_datetime(Utc::now())
    }
}

/// A clock frozen at a fixed instant, for tests and replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}
