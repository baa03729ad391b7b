//! Clock abstraction used for record expiry and captured timestamps.
//!
//! Production code uses [`RealClock`]. Tests inject [`TestClock`] (behind the
//! `test-utils` feature) to move time forward without sleeping.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, SecondsFormat, Utc};

/// Source of wall-clock time.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current system time.
    fn now_system(&self) -> SystemTime;

    /// Current time as UTC `DateTime`.
    fn now_utc(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from(self.now_system())
    }

    /// Milliseconds since the Unix epoch.
    fn unix_millis(&self) -> i64 {
        let since = self
            .now_system()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        i64::try_from(since.as_millis()).unwrap_or(i64::MAX)
    }

    /// Nanoseconds since the Unix epoch.
    fn unix_nanos(&self) -> u128 {
        self.now_system()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    }

    /// RFC 3339 timestamp with nanosecond precision, e.g. for captured records.
    fn rfc3339_nanos(&self) -> String {
        self.now_utc().to_rfc3339_opts(SecondsFormat::Nanos, true)
    }
}

/// Wall clock backed by [`SystemTime::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RealClock;

impl RealClock {
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for RealClock {
    fn now_system(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Convert a TTL into milliseconds, saturating on overflow.
pub fn duration_millis(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(any(test, feature = "test-utils"))]
pub use test_clock::TestClock;

#[cfg(any(test, feature = "test-utils"))]
mod test_clock {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use super::Clock;

    /// Controllable clock for deterministic expiry tests.
    ///
    /// Clones share the same underlying time, so a clone handed to a store
    /// can be advanced from the test body.
    #[derive(Debug, Clone)]
    pub struct TestClock {
        /// Nanoseconds since `UNIX_EPOCH`.
        system_ns: Arc<AtomicU64>,
    }

    impl TestClock {
        /// A test clock starting at the current system time.
        pub fn new() -> Self {
            Self::with_start_time(SystemTime::now())
        }

        /// A test clock starting at `start`.
        pub fn with_start_time(start: SystemTime) -> Self {
            let since = start.duration_since(UNIX_EPOCH).unwrap_or_default();
            Self {
                system_ns: Arc::new(AtomicU64::new(
                    u64::try_from(since.as_nanos()).unwrap_or(u64::MAX),
                )),
            }
        }

        /// Move the clock forward.
        pub fn advance(&self, duration: Duration) {
            let ns = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
            self.system_ns.fetch_add(ns, Ordering::AcqRel);
        }
    }

    impl Default for TestClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for TestClock {
        fn now_system(&self) -> SystemTime {
            UNIX_EPOCH + Duration::from_nanos(self.system_ns.load(Ordering::Acquire))
        }
    }
}
