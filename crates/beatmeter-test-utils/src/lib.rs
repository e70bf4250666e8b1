//! Test utilities and deterministic clocks for beatmeter development.
//!
//! Provides [`Clock`] implementations whose readings are fully controlled
//! by the test, so costs, percentages and loop statistics can be asserted
//! exactly.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use beatmeter_core::Clock;

pub use fixtures::{costs_to_timestamps, deltas_to_timestamps, NANOS_PER_MS};

/// Clock that only moves when the test moves it.
///
/// Interior-mutable so a session can hold `&ManualClock` while the test
/// advances time between recording calls.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    /// Jump to an absolute time.
    pub fn set(&self, nanos: i64) {
        self.now.store(nanos, Ordering::Relaxed);
    }

    /// Move forward by `nanos` and return the new time.
    pub fn advance(&self, nanos: i64) -> i64 {
        self.now.fetch_add(nanos, Ordering::Relaxed) + nanos
    }
}

impl Clock for ManualClock {
    fn now_nanos(&self) -> i64 {
        self.now.load(Ordering::Relaxed)
    }
}

/// Clock that moves forward by a fixed step on every read.
#[derive(Debug)]
pub struct SteppingClock {
    next: AtomicI64,
    step: i64,
}

impl SteppingClock {
    pub fn new(start: i64, step: i64) -> Self {
        Self {
            next: AtomicI64::new(start),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn now_nanos(&self) -> i64 {
        self.next.fetch_add(self.step, Ordering::Relaxed)
    }
}

/// Clock that replays a fixed list of readings, then repeats the last one.
#[derive(Debug)]
pub struct ScriptedClock {
    readings: Vec<i64>,
    cursor: AtomicUsize,
}

impl ScriptedClock {
    /// # Panics
    ///
    /// Panics if `readings` is empty.
    pub fn new(readings: Vec<i64>) -> Self {
        assert!(!readings.is_empty(), "ScriptedClock needs at least one reading");
        Self {
            readings,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Number of readings handed out so far.
    pub fn reads(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }
}

impl Clock for ScriptedClock {
    fn now_nanos(&self) -> i64 {
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed);
        let last = self.readings.len() - 1;
        self.readings[idx.min(last)]
    }
}
