//! Per-step derived statistics.
//!
//! A [`StepSummary`] is recomputed from a [`MeasurementRun`] on demand and
//! never stored back into it.

use beatmeter_core::{EventFlags, StepIndex};
use beatmeter_ledger::{LoopStats, MeasurementRun};

/// Position of `value` on the `[min, max]` scale, in percent.
///
/// A zero-width scale yields 0 rather than NaN.
pub fn percent(value: i64, min: i64, max: i64) -> f64 {
    let span = max - min;
    if span == 0 {
        return 0.0;
    }
    (value - min) as f64 * 100.0 / span as f64
}

/// Derived view of one top-level step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepSummary {
    /// Which step this summarises.
    pub index: StepIndex,
    /// The step's event word.
    pub flags: EventFlags,
    /// Timestamp of the step.
    pub start: i64,
    /// Time since the previous step; the START step measures against itself.
    pub cost: i64,
    /// Time since the run started.
    pub accumulated: i64,
    /// Whether the step was recorded as excluded.
    pub is_excluded: bool,
    /// `cost` when excluded, otherwise zero.
    pub excluded: i64,
    /// Share of the run's total time spent in this step.
    pub percent: f64,
    /// Loop statistics, a user annotation, or a default label.
    pub annotation: String,
    /// True for a LOOP step whose loop was never closed.
    pub incomplete: bool,
}

impl StepSummary {
    /// Summarise step `index` of `run`, or `None` if it was never recorded.
    pub fn build(run: &MeasurementRun, index: StepIndex) -> Option<Self> {
        let start = run.timestamp(index)?;
        let flags = run.flags(index)?;
        let prev_index = index.previous();
        let prev = run.timestamp(prev_index)?;

        let cost = start - prev;
        let is_excluded = flags.is_excluded();
        let (lo, hi) = (run.start(), run.last());

        Some(Self {
            index,
            flags,
            start,
            cost,
            accumulated: start - run.start(),
            is_excluded,
            excluded: if is_excluded { cost } else { 0 },
            percent: percent(start, lo, hi) - percent(prev, lo, hi),
            annotation: resolve_annotation(run, index, flags),
            incomplete: flags.is_loop() && run.is_loop_open(index),
        })
    }

    /// Cost that counts towards rankings and the reported total.
    pub fn net_cost(&self) -> i64 {
        self.cost - self.excluded
    }
}

/// Label shown for a step with no user annotation.
pub fn default_label(index: StepIndex, flags: EventFlags) -> String {
    if flags.is_loop() {
        format!("loop #{index}")
    } else {
        format!("step #{index}")
    }
}

fn resolve_annotation(run: &MeasurementRun, index: StepIndex, flags: EventFlags) -> String {
    let body = match run.annotation(index) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => default_label(index, flags),
    };
    if !flags.is_unloop() {
        return body;
    }
    let stats = run
        .loop_tracker(StepIndex(flags.payload()))
        .map(|tracker| tracker.statistics())
        .unwrap_or_default();
    format!("{stats} / {body}")
}

/// Statistics of a loop that has a tracker, zero otherwise.
pub fn loop_statistics(run: &MeasurementRun, index: StepIndex) -> LoopStats {
    run.loop_tracker(index)
        .map(|tracker| tracker.statistics())
        .unwrap_or_default()
}
