//! Report assembly and the top-N ranking.
//!
//! [`Report::build`] is the only place statistics are computed. It runs
//! once per finished run, off the recording hot path, and is free to
//! allocate.

use std::cmp::Reverse;

use beatmeter_core::{RunId, StepIndex};
use beatmeter_ledger::{LoopStats, MeasurementRun};

use crate::summary::{loop_statistics, StepSummary};

/// The final totals of a report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReportSummary {
    /// Run total minus every excluded step, in nanoseconds.
    pub elapsed: i64,
    /// Sum of excluded step costs, in nanoseconds.
    pub excluded_total: i64,
    /// Number of top-level steps.
    pub step_count: usize,
}

/// A loop that was still open when the report was built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IncompleteLoop {
    /// Step index of the LOOP event.
    pub step: StepIndex,
    /// Statistics over whatever iterations were recorded (zero if none).
    pub stats: LoopStats,
}

/// Everything derived from one run.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    /// Which run this report describes.
    pub run_id: RunId,
    /// One summary per top-level step, in step order.
    pub steps: Vec<StepSummary>,
    /// Last timestamp minus start, in nanoseconds.
    pub total: i64,
    /// Sum of excluded step costs, in nanoseconds.
    pub excluded_total: i64,
    /// `total - excluded_total`.
    pub elapsed: i64,
    /// The most expensive non-excluded steps, most expensive first.
    pub ranking: Vec<StepIndex>,
    /// Loops never closed before the report was built.
    pub incomplete_loops: Vec<IncompleteLoop>,
}

impl Report {
    /// Derive every statistic of `run`, ranking up to `top_n` steps.
    pub fn build(run: &MeasurementRun, top_n: usize) -> Self {
        let steps: Vec<StepSummary> = (0..run.len() as u32)
            .filter_map(|i| StepSummary::build(run, StepIndex(i)))
            .collect();

        let total = run.total();
        let excluded_total = steps.iter().map(|s| s.excluded).sum();
        let ranking = rank_top_n(&steps, top_n);
        let incomplete_loops = run
            .open_loops()
            .iter()
            .map(|&step| IncompleteLoop {
                step,
                stats: loop_statistics(run, step),
            })
            .collect();

        Self {
            run_id: run.id(),
            steps,
            total,
            excluded_total,
            elapsed: total - excluded_total,
            ranking,
            incomplete_loops,
        }
    }

    /// The final summary tuple.
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            elapsed: self.elapsed,
            excluded_total: self.excluded_total,
            step_count: self.steps.len(),
        }
    }

    /// Summary of one step.
    pub fn step(&self, index: StepIndex) -> Option<&StepSummary> {
        self.steps.get(index.as_usize())
    }

    /// Ranked step summaries, most expensive first.
    pub fn top(&self) -> impl Iterator<Item = &StepSummary> {
        self.ranking.iter().filter_map(|&i| self.step(i))
    }

    /// Whether every loop was closed before the report was built.
    pub fn is_complete(&self) -> bool {
        self.incomplete_loops.is_empty()
    }
}

/// The `n` most expensive non-excluded steps by net cost.
///
/// Ties keep step order, so the earlier step ranks first. Excluded steps
/// are dropped before ranking; when fewer than `n` remain the result is
/// shorter than `n`.
pub fn rank_top_n(steps: &[StepSummary], n: usize) -> Vec<StepIndex> {
    let mut candidates: Vec<&StepSummary> = steps.iter().filter(|s| !s.is_excluded).collect();
    candidates.sort_by_key(|s| (Reverse(s.net_cost()), s.index));
    candidates.into_iter().take(n).map(|s| s.index).collect()
}
