//! Beatmeter: in-process instrumentation for micro-benchmarking code regions.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! beatmeter sub-crates. For most users, adding `beatmeter` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use beatmeter::prelude::*;
//!
//! let mut session = Session::new(SessionConfig::default()).unwrap();
//!
//! session.start();
//! session.beat().unwrap();
//! session.log("parse").unwrap();
//!
//! session.enter_loop(3).unwrap();
//! for _ in 0..3 {
//!     session.recap().unwrap();
//! }
//! session.unloop().unwrap();
//! session.log("transform").unwrap();
//!
//! // Publish into memory instead of the `log` facade.
//! let mut sink = MemorySink::new();
//! let report = session.finish_to(&mut sink).unwrap();
//!
//! // START, beat, LOOP, UNLOOP, END
//! assert_eq!(report.steps.len(), 5);
//! assert_eq!(report.elapsed, report.total);
//! assert!(!session.is_tracking());
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `beatmeter-core` | IDs, event words, clocks, errors |
//! | [`ledger`] | `beatmeter-ledger` | Measurement runs and loop trackers |
//! | [`report`] | `beatmeter-report` | Step summaries, rankings, rendering, sinks |
//! | [`engine`] | `beatmeter-engine` | Sessions, calibration, the session registry |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`beatmeter-core`).
///
/// Contains step and run identifiers, the packed [`types::EventFlags`]
/// word, the [`types::Clock`] trait with its implementations, and
/// [`types::MeterError`].
pub use beatmeter_core as types;

/// Fixed-capacity recording storage (`beatmeter-ledger`).
///
/// [`ledger::MeasurementRun`] holds one run's events;
/// [`ledger::LoopTracker`] keeps a loop's most recent iterations.
pub use beatmeter_ledger as ledger;

/// Report assembly and delivery (`beatmeter-report`).
///
/// Build a [`report::Report`] from a run, render it with
/// [`report::ReportConfig`], and publish it to any [`report::ReportSink`].
pub use beatmeter_report as report;

/// Recording sessions (`beatmeter-engine`).
///
/// [`engine::Session`] is the recording API; [`engine::SessionRegistry`]
/// maps explicit caller ids to sessions.
pub use beatmeter_engine as engine;

/// Common imports for typical beatmeter usage.
///
/// ```rust
/// use beatmeter::prelude::*;
/// ```
///
/// This imports the session API, its configuration, the report types and
/// sinks, the clock trait, and the error types.
pub mod prelude {
    // Core types and traits
    pub use beatmeter_core::{CallerId, Clock, RunId, StepIndex, TimeSource};

    // Errors
    pub use beatmeter_core::MeterError;
    pub use beatmeter_engine::ConfigError;

    // Ledger
    pub use beatmeter_ledger::{LoopStats, MeasurementRun, RunConfig};

    // Reporting
    pub use beatmeter_report::{
        ChannelSink, LogSink, MemorySink, Report, ReportConfig, ReportSink, StepSummary,
    };

    // Engine
    pub use beatmeter_engine::{Calibration, Session, SessionConfig, SessionRegistry};
}
