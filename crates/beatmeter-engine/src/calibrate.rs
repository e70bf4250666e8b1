//! Self-measurement of per-call recording overhead.
//!
//! [`Session::calibrate`] opens a throwaway run, calls each recording
//! operation once, and times every call with the session's own clock.
//! The result is diagnostic: it tells you how much of a reported step
//! cost is the meter itself.

use std::fmt;

use log::trace;

use beatmeter_core::{nanos_to_millis, Clock, MeterError};

use crate::session::Session;

/// Cost of one call to each recording operation, in nanoseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Calibration {
    /// Opening a run.
    pub start: i64,
    /// Recording an included step.
    pub beat: i64,
    /// Annotating the last step.
    pub log: i64,
    /// Recording an excluded step.
    pub skip: i64,
    /// Opening a loop.
    pub enter_loop: i64,
    /// Recording a loop iteration.
    pub recap: i64,
    /// Closing a loop.
    pub unloop: i64,
    /// Recording END.
    pub end: i64,
    /// Popping the run.
    pub pop: i64,
}

impl Calibration {
    /// Operation labels and costs, in call order.
    pub fn entries(&self) -> [(&'static str, i64); 9] {
        [
            ("start", self.start),
            ("beat", self.beat),
            ("log", self.log),
            ("skip", self.skip),
            ("loop", self.enter_loop),
            ("recap", self.recap),
            ("unloop", self.unloop),
            ("end", self.end),
            ("pop", self.pop),
        ]
    }

    /// Sum of every measured call.
    pub fn total(&self) -> i64 {
        self.entries().iter().map(|(_, cost)| cost).sum()
    }
}

impl fmt::Display for Calibration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("calibrate [st/be/lg/sk/lo/re/un/en/po]: ")?;
        for (i, (_, cost)) in self.entries().iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{:.3}", nanos_to_millis(*cost))?;
        }
        f.write_str(" ms")
    }
}

/// Split timer: each call returns the time since the previous one.
struct Lap {
    mark: i64,
}

impl Lap {
    fn split(&mut self, now: i64) -> i64 {
        let elapsed = now - self.mark;
        self.mark = now;
        elapsed
    }
}

impl<C: Clock> Session<C> {
    /// Time one call of every recording operation.
    ///
    /// Runs on its own run pushed on top of the stack and popped before
    /// returning, so the caller's runs are untouched. The result is also
    /// kept and available from [`calibration`](Session::calibration).
    ///
    /// # Errors
    ///
    /// Propagates any recording error, e.g. [`MeterError::CapacityExceeded`]
    /// when the configured run capacity is below the six top-level events
    /// a calibration pass records. The calibration run is discarded either
    /// way.
    pub fn calibrate(&mut self) -> Result<Calibration, MeterError> {
        let depth = self.depth();
        let result = self.calibration_pass();
        if result.is_err() {
            while self.depth() > depth {
                self.pop();
            }
        }
        let calibration = result?;
        trace!("{calibration}");
        self.store_calibration(calibration);
        Ok(calibration)
    }

    fn calibration_pass(&mut self) -> Result<Calibration, MeterError> {
        let mut lap = Lap {
            mark: self.clock().now_nanos(),
        };

        self.start();
        let start = lap.split(self.clock().now_nanos());
        self.beat()?;
        let beat = lap.split(self.clock().now_nanos());
        self.log("calibrate")?;
        let log = lap.split(self.clock().now_nanos());
        self.skip()?;
        let skip = lap.split(self.clock().now_nanos());
        self.enter_endless_loop()?;
        let enter_loop = lap.split(self.clock().now_nanos());
        self.recap()?;
        let recap = lap.split(self.clock().now_nanos());
        self.unloop()?;
        let unloop = lap.split(self.clock().now_nanos());
        self.end()?;
        let end = lap.split(self.clock().now_nanos());
        self.pop();
        let pop = lap.split(self.clock().now_nanos());

        Ok(Calibration {
            start,
            beat,
            log,
            skip,
            enter_loop,
            recap,
            unloop,
            end,
            pop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use beatmeter_test_utils::{SteppingClock, NANOS_PER_MS};

    #[test]
    fn each_operation_is_timed() {
        let clock = SteppingClock::new(0, NANOS_PER_MS);
        let mut session = Session::with_clock(SessionConfig::default(), clock).unwrap();
        let c = session.calibrate().unwrap();

        // Operations that read the clock cost two steps; log and pop
        // only cost the split read itself.
        let ms = NANOS_PER_MS;
        assert_eq!(
            c,
            Calibration {
                start: 2 * ms,
                beat: 2 * ms,
                log: ms,
                skip: 2 * ms,
                enter_loop: 2 * ms,
                recap: 2 * ms,
                unloop: 2 * ms,
                end: 2 * ms,
                pop: ms,
            }
        );
        assert_eq!(c.total(), 16 * ms);
        assert_eq!(session.calibration(), Some(&c));
    }

    #[test]
    fn calibration_leaves_stack_untouched() {
        let mut session =
            Session::with_clock(SessionConfig::default(), SteppingClock::new(0, 1)).unwrap();
        let outer = session.start();
        session.beat().unwrap();
        session.calibrate().unwrap();
        assert_eq!(session.depth(), 1);
        assert_eq!(session.current().unwrap().id(), outer);
        assert_eq!(session.current().unwrap().len(), 2);
    }

    #[test]
    fn undersized_run_fails_and_cleans_up() {
        let mut config = SessionConfig::default();
        config.run.capacity = 3;
        let mut session = Session::with_clock(config, SteppingClock::new(0, 1)).unwrap();
        let err = session.calibrate().unwrap_err();
        assert_eq!(err, MeterError::CapacityExceeded { capacity: 3 });
        assert!(!session.is_tracking());
        assert!(session.calibration().is_none());
    }

    #[test]
    fn display_lists_every_operation() {
        let c = Calibration {
            start: 1_000_000,
            pop: 2_500_000,
            ..Calibration::default()
        };
        assert_eq!(
            c.to_string(),
            "calibrate [st/be/lg/sk/lo/re/un/en/po]: \
             1.000/0.000/0.000/0.000/0.000/0.000/0.000/0.000/2.500 ms"
        );
    }
}
