//! Reporting for beatmeter runs.
//!
//! Everything here reads a finished [`MeasurementRun`] and never writes
//! back to it:
//!
//! - [`summary`]: per-step cost, accumulated time, percentage and labels.
//! - [`report`]: report assembly, totals and the top-N ranking.
//! - [`render`]: column-ordered rows and the summary/top-N text lines.
//! - [`sink`]: delivery to the `log` facade, memory, or a channel.
//!
//! [`MeasurementRun`]: beatmeter_ledger::MeasurementRun

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod render;
pub mod report;
pub mod sink;
pub mod summary;

pub use config::{Column, ReportConfig};
pub use render::{Cell, ReportRow, DELIMITER};
pub use report::{rank_top_n, IncompleteLoop, Report, ReportSummary};
pub use sink::{publish, ChannelSink, LogSink, MemorySink, ReportRecord, ReportSink};
pub use summary::{percent, StepSummary};
