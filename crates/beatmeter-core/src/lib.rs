//! Core types for the beatmeter instrumentation engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the beatmeter workspace:
//! identifiers, the packed event word, clock sources, and error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod clock;
pub mod error;
pub mod flags;
pub mod id;

pub use clock::{Clock, MonotonicClock, ProcessClock, SystemClock, TimeSource};
pub use error::{LoopImbalance, MeterError};
pub use flags::{EventFlags, EventKind, Modifiers};
pub use id::{CallerId, RunId, StepIndex};

/// Convert nanoseconds to fractional milliseconds.
///
/// Used by every human-facing rendering of a duration.
pub fn nanos_to_millis(nanos: i64) -> f64 {
    nanos as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_conversion_keeps_fraction() {
        assert_eq!(nanos_to_millis(1_500_000), 1.5);
        assert_eq!(nanos_to_millis(0), 0.0);
        assert_eq!(nanos_to_millis(-2_000_000), -2.0);
    }
}
