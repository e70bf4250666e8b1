//! Fixed-capacity measurement ledger for beatmeter.
//!
//! Storage is sized once, when a run or loop opens, and never grows:
//!
//! ```text
//! MeasurementRun (one start/close bracket)
//! ├── timestamps: [i64; capacity]      ─┐ parallel, one slot per
//! ├── flags:      [EventFlags; capacity] ┘ top-level step
//! ├── loop_stack: SmallVec<StepIndex>   (open loops, innermost last)
//! ├── loops:      StepIndex → LoopTracker
//! │   └── ring of iteration timestamps (overwrites oldest when full)
//! └── annotations: StepIndex → String
//! ```
//!
//! Top-level slots are never overwritten: a full run rejects further
//! events. Loop iterations are the opposite: a full tracker keeps the
//! most recent window and counts the rest.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod run;
pub mod tracker;

pub use config::RunConfig;
pub use run::MeasurementRun;
pub use tracker::{logical_to_physical, LoopStats, LoopTracker};
