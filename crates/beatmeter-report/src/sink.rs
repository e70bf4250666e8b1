//! Report delivery.
//!
//! [`publish`] walks a [`Report`] once and hands each [`ReportRecord`] to
//! a [`ReportSink`]. Sinks decide where records go: the `log` facade, a
//! buffer, or another thread.

use std::fmt;

use crossbeam_channel::{Sender, TrySendError};
use log::Level;

use crate::config::ReportConfig;
use crate::render::{self, ReportRow, DELIMITER};
use crate::report::{IncompleteLoop, Report, ReportSummary};

/// One unit of report output.
#[derive(Clone, Debug, PartialEq)]
pub enum ReportRecord {
    /// A step row.
    Row(ReportRow),
    /// A loop that was still open when the run was reported.
    Incomplete(IncompleteLoop),
    /// Section separator.
    Delimiter,
    /// Final totals.
    Summary(ReportSummary),
    /// One entry of the top-N ranking; `rank` starts at 1.
    Top {
        /// Position in the ranking.
        rank: usize,
        /// The ranked step.
        row: ReportRow,
    },
}

impl fmt::Display for ReportRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row(row) => write!(f, "{row}"),
            Self::Incomplete(lp) => write!(f, "incomplete: loop #{} {}", lp.step, lp.stats),
            Self::Delimiter => f.write_str(DELIMITER),
            Self::Summary(summary) => f.write_str(&render::summary_line(*summary)),
            Self::Top { rank, row } => write!(f, "top-{rank}: {row}"),
        }
    }
}

/// Consumer of report records.
pub trait ReportSink {
    /// Accept one record.
    fn emit(&mut self, record: ReportRecord);
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn emit(&mut self, record: ReportRecord) {
        (**self).emit(record);
    }
}

/// Render `report` under `config` and feed every record to `sink`.
///
/// Order: step rows, incomplete loops, then the summary and the ranking,
/// each section preceded by a delimiter, and a closing delimiter.
pub fn publish(report: &Report, config: &ReportConfig, sink: &mut impl ReportSink) {
    let width = report.steps.len();
    for step in &report.steps {
        sink.emit(ReportRecord::Row(render::row(step, width, config)));
    }
    for lp in &report.incomplete_loops {
        sink.emit(ReportRecord::Incomplete(*lp));
    }

    if config.show_summary {
        sink.emit(ReportRecord::Delimiter);
        sink.emit(ReportRecord::Summary(report.summary()));
    }

    if config.top_n_longest > 0 {
        sink.emit(ReportRecord::Delimiter);
        for (rank, row) in render::top_rows(report, config) {
            sink.emit(ReportRecord::Top { rank, row });
        }
    }

    sink.emit(ReportRecord::Delimiter);
}

// ── LogSink ─────────────────────────────────────────────────────

/// Writes records through the `log` facade under a fixed target.
///
/// Excluded rows and incomplete loops log at `warn`, the summary and the
/// ranking at `info`, everything else at `debug`.
#[derive(Clone, Debug)]
pub struct LogSink {
    target: String,
}

impl LogSink {
    /// Log under `target` (the session's output tag).
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// The log target.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Level a record is logged at.
    pub fn level(record: &ReportRecord) -> Level {
        match record {
            ReportRecord::Row(row) if row.excluded => Level::Warn,
            ReportRecord::Incomplete(_) => Level::Warn,
            ReportRecord::Summary(_) | ReportRecord::Top { .. } => Level::Info,
            ReportRecord::Row(_) | ReportRecord::Delimiter => Level::Debug,
        }
    }
}

impl ReportSink for LogSink {
    fn emit(&mut self, record: ReportRecord) {
        log::log!(target: self.target.as_str(), Self::level(&record), "{record}");
    }
}

// ── MemorySink ──────────────────────────────────────────────────

/// Collects records in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    records: Vec<ReportRecord>,
}

impl MemorySink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records received so far.
    pub fn records(&self) -> &[ReportRecord] {
        &self.records
    }

    /// Records rendered as text lines.
    pub fn lines(&self) -> Vec<String> {
        self.records.iter().map(ToString::to_string).collect()
    }

    /// Take the collected records.
    pub fn into_records(self) -> Vec<ReportRecord> {
        self.records
    }
}

impl ReportSink for MemorySink {
    fn emit(&mut self, record: ReportRecord) {
        self.records.push(record);
    }
}

// ── ChannelSink ─────────────────────────────────────────────────

/// Ships records to another thread.
///
/// Never blocks: when the channel is full or the receiver is gone the
/// record is dropped and counted.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: Sender<ReportRecord>,
    dropped: u64,
}

impl ChannelSink {
    /// Send records over `tx`.
    pub fn new(tx: Sender<ReportRecord>) -> Self {
        Self { tx, dropped: 0 }
    }

    /// Records that could not be delivered.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl ReportSink for ChannelSink {
    fn emit(&mut self, record: ReportRecord) {
        match self.tx.try_send(record) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped += 1;
            }
        }
    }
}
