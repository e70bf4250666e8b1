//! Monotonic nanosecond clock sources.
//!
//! The engine only ever asks a [`Clock`] for "now". Which clock backs that
//! answer is a caller decision: [`TimeSource`] selects between the two
//! `Instant`-backed implementations shipped here, and tests inject their
//! own deterministic clocks.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

/// A monotonic source of nanosecond timestamps.
///
/// Values are measured from an arbitrary epoch and must never decrease
/// for the lifetime of the clock.
pub trait Clock {
    /// Current time in nanoseconds since the clock's epoch.
    fn now_nanos(&self) -> i64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_nanos(&self) -> i64 {
        (**self).now_nanos()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now_nanos(&self) -> i64 {
        (**self).now_nanos()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_nanos(&self) -> i64 {
        (**self).now_nanos()
    }
}

fn nanos_since(origin: Instant) -> i64 {
    i64::try_from(origin.elapsed().as_nanos()).unwrap_or(i64::MAX)
}

/// Nanoseconds since this clock was created.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose epoch is the moment of construction.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now_nanos(&self) -> i64 {
        nanos_since(self.origin)
    }
}

static PROCESS_EPOCH: OnceLock<Instant> = OnceLock::new();

/// Nanoseconds since a process-wide epoch.
///
/// All instances share one epoch (fixed on first use), so timestamps
/// taken by different sessions can be compared directly.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessClock;

impl ProcessClock {
    /// The shared epoch, initialised on first call.
    pub fn epoch() -> Instant {
        *PROCESS_EPOCH.get_or_init(Instant::now)
    }
}

impl Clock for ProcessClock {
    #[inline]
    fn now_nanos(&self) -> i64 {
        nanos_since(Self::epoch())
    }
}

/// Which platform clock a session should read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeSource {
    /// A clock private to the session, starting at zero when created.
    #[default]
    Monotonic,
    /// The process-wide clock shared by every session.
    Process,
}

/// A platform clock chosen at runtime from a [`TimeSource`].
#[derive(Clone, Copy, Debug)]
pub enum SystemClock {
    /// See [`MonotonicClock`].
    Monotonic(MonotonicClock),
    /// See [`ProcessClock`].
    Process(ProcessClock),
}

impl SystemClock {
    /// Build the clock a [`TimeSource`] names.
    pub fn new(source: TimeSource) -> Self {
        match source {
            TimeSource::Monotonic => Self::Monotonic(MonotonicClock::new()),
            TimeSource::Process => Self::Process(ProcessClock),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(TimeSource::default())
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now_nanos(&self) -> i64 {
        match self {
            Self::Monotonic(c) => c.now_nanos(),
            Self::Process(c) => c.now_nanos(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_never_decreases() {
        let clock = MonotonicClock::new();
        let mut last = clock.now_nanos();
        for _ in 0..1000 {
            let now = clock.now_nanos();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn process_clocks_share_an_epoch() {
        let a = ProcessClock;
        let first = a.now_nanos();
        let b = ProcessClock;
        assert!(b.now_nanos() >= first);
    }

    #[test]
    fn system_clock_follows_source() {
        assert!(matches!(
            SystemClock::new(TimeSource::Monotonic),
            SystemClock::Monotonic(_)
        ));
        assert!(matches!(
            SystemClock::new(TimeSource::Process),
            SystemClock::Process(_)
        ));
        assert!(SystemClock::default().now_nanos() >= 0);
    }

    #[test]
    fn boxed_and_borrowed_clocks_forward() {
        let clock = MonotonicClock::new();
        let boxed: Box<dyn Clock> = Box::new(clock);
        assert!(boxed.now_nanos() >= 0);
        let borrowed: &dyn Clock = &clock;
        assert!(borrowed.now_nanos() >= 0);
    }
}
