//! The public recording API.
//!
//! A [`Session`] owns a stack of [`MeasurementRun`]s. [`start`](Session::start)
//! pushes a new run, every recording call writes to the top of the stack,
//! and [`finish`](Session::finish) closes, reports and pops it, handing
//! control back to the enclosing run.
//!
//! # Ownership model
//!
//! `Session` is [`Send`] and holds no interior mutability. All recording
//! methods take `&mut self`, so one session serves exactly one caller at
//! a time. Use a [`SessionRegistry`](crate::registry::SessionRegistry) to
//! keep one session per caller.

use log::{debug, warn};

use beatmeter_core::{Clock, MeterError, RunId, StepIndex, SystemClock};
use beatmeter_ledger::MeasurementRun;
use beatmeter_report::{publish, LogSink, Report, ReportSink};

use crate::calibrate::Calibration;
use crate::config::{ConfigError, SessionConfig};

const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Session>();
    }
};

/// Stack of measurement runs driven by one caller.
#[derive(Debug)]
pub struct Session<C: Clock = SystemClock> {
    clock: C,
    config: SessionConfig,
    runs: Vec<MeasurementRun>,
    next_id: u32,
    calibration: Option<Calibration>,
}

impl Session<SystemClock> {
    /// Create a session reading time from the configured
    /// [`TimeSource`](beatmeter_core::TimeSource).
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        let clock = SystemClock::new(config.time_source);
        Self::with_clock(config, clock)
    }
}

impl<C: Clock> Session<C> {
    /// Create a session with an explicit clock. The config's time source
    /// is ignored.
    pub fn with_clock(config: SessionConfig, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            clock,
            config,
            runs: Vec::new(),
            next_id: 0,
            calibration: None,
        })
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The clock timestamps are read from.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Whether a run is open.
    pub fn is_tracking(&self) -> bool {
        !self.runs.is_empty()
    }

    /// Number of runs on the stack.
    pub fn depth(&self) -> usize {
        self.runs.len()
    }

    /// The run recording calls currently write to.
    pub fn current(&self) -> Option<&MeasurementRun> {
        self.runs.last()
    }

    /// Every run on the stack, outermost first.
    pub fn runs(&self) -> &[MeasurementRun] {
        &self.runs
    }

    fn current_mut(&mut self) -> Result<&mut MeasurementRun, MeterError> {
        self.runs.last_mut().ok_or(MeterError::NotTracking)
    }

    // ── recording ─────────────────────────────────────────────────

    /// Open a new run on top of the stack and record its START event.
    pub fn start(&mut self) -> RunId {
        let now = self.clock.now_nanos();
        let id = RunId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.runs.push(MeasurementRun::open(id, now, &self.config.run));
        debug!(
            "run {id} opened at depth {} ({} bytes of event slots)",
            self.runs.len(),
            self.config.run.slot_bytes()
        );
        id
    }

    /// Record a step that counts towards the run's timing.
    pub fn beat(&mut self) -> Result<StepIndex, MeterError> {
        let now = self.clock.now_nanos();
        self.current_mut()?.record_point(now, true)
    }

    /// Record a step whose cost is excluded from the run's timing.
    pub fn skip(&mut self) -> Result<StepIndex, MeterError> {
        let now = self.clock.now_nanos();
        self.current_mut()?.record_point(now, false)
    }

    /// Open a loop expected to run `count` iterations.
    ///
    /// The tracker retains the last `count` iterations; extra iterations
    /// overwrite the oldest. A negative count is rejected.
    ///
    /// The retention ring is allocated up front at 16 bytes per declared
    /// iteration; see [`MeasurementRun::open_loop`] before declaring
    /// counts in the hundreds of millions.
    pub fn enter_loop(&mut self, count: i64) -> Result<StepIndex, MeterError> {
        let now = self.clock.now_nanos();
        self.current_mut()?.open_loop(now, count, false)
    }

    /// Open a loop with no known iteration count. Only the configured
    /// window of most recent iterations is retained.
    pub fn enter_endless_loop(&mut self) -> Result<StepIndex, MeterError> {
        let now = self.clock.now_nanos();
        self.current_mut()?.open_loop(now, -1, true)
    }

    /// Record the end of one iteration of the innermost open loop.
    ///
    /// Returns the step index of that loop.
    pub fn recap(&mut self) -> Result<StepIndex, MeterError> {
        let now = self.clock.now_nanos();
        self.current_mut()?.record_iteration(now)
    }

    /// Close the innermost open loop.
    pub fn unloop(&mut self) -> Result<StepIndex, MeterError> {
        let now = self.clock.now_nanos();
        self.current_mut()?.close_loop(now)
    }

    /// Record the END event of the current run without popping it.
    pub fn end(&mut self) -> Result<StepIndex, MeterError> {
        let now = self.clock.now_nanos();
        self.current_mut()?.close(now)
    }

    /// Annotate the most recently recorded step of the current run.
    pub fn log(&mut self, text: impl Into<String>) -> Result<(), MeterError> {
        self.current_mut()?.annotate_last(text);
        Ok(())
    }

    /// Annotate a specific step of the current run.
    pub fn annotate(&mut self, index: StepIndex, text: impl Into<String>) -> Result<(), MeterError> {
        self.current_mut()?.annotate(index, text)
    }

    // ── reporting ─────────────────────────────────────────────────

    /// Build the report of the current run.
    ///
    /// Works on open and closed runs alike; loops still open are listed
    /// as incomplete.
    pub fn report(&self) -> Result<Report, MeterError> {
        let run = self.runs.last().ok_or(MeterError::NotTracking)?;
        if !run.open_loops().is_empty() {
            warn!(
                "run {} reported with {} open loop(s)",
                run.id(),
                run.open_loops().len()
            );
        }
        Ok(Report::build(run, self.config.report.top_n_longest))
    }

    /// Build the report of the current run and publish it to `sink`.
    pub fn publish_to(&self, sink: &mut impl ReportSink) -> Result<Report, MeterError> {
        let report = self.report()?;
        publish(&report, &self.config.report, sink);
        Ok(report)
    }

    /// Publish the current run's report through `log` under the
    /// configured output tag.
    pub fn stats(&self) -> Result<Report, MeterError> {
        self.publish_to(&mut LogSink::new(self.config.output_tag.as_str()))
    }

    /// End the current run, log its report, and pop it.
    pub fn finish(&mut self) -> Result<Report, MeterError> {
        let mut sink = LogSink::new(self.config.output_tag.as_str());
        self.finish_to(&mut sink)
    }

    /// End the current run, publish its report to `sink`, and pop it.
    ///
    /// If END cannot be recorded (the run is full or already closed) the
    /// report covers what was recorded and the run is still popped.
    pub fn finish_to(&mut self, sink: &mut impl ReportSink) -> Result<Report, MeterError> {
        match self.end() {
            Ok(_) | Err(MeterError::RunClosed) => {}
            Err(MeterError::CapacityExceeded { capacity }) => {
                warn!("run full at {capacity} steps, finishing without END");
            }
            Err(e) => return Err(e),
        }
        let report = self.publish_to(sink)?;
        self.pop();
        Ok(report)
    }

    /// Remove the current run, making the enclosing run current.
    pub fn pop(&mut self) -> Option<MeasurementRun> {
        let run = self.runs.pop()?;
        if !run.is_closed() {
            warn!("run {} popped without END", run.id());
        }
        debug!("run {} popped, depth {}", run.id(), self.runs.len());
        Some(run)
    }

    /// Drop every run.
    pub fn clear(&mut self) {
        if !self.runs.is_empty() {
            debug!("clearing {} run(s)", self.runs.len());
        }
        self.runs.clear();
    }

    // ── calibration ───────────────────────────────────────────────

    /// Most recent [`calibrate`](Self::calibrate) result.
    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    pub(crate) fn store_calibration(&mut self, calibration: Calibration) {
        self.calibration = Some(calibration);
    }
}
