//! Recording sessions for beatmeter.
//!
//! A [`Session`] is the public recording API: it opens runs, records
//! steps and loops against a [`Clock`](beatmeter_core::Clock), and turns
//! finished runs into reports. [`SessionRegistry`] keeps one session per
//! explicit caller id, and [`Calibration`] measures the meter's own
//! per-call cost.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod calibrate;
pub mod config;
pub mod registry;
pub mod session;

pub use calibrate::Calibration;
pub use config::{ConfigError, SessionConfig};
pub use registry::SessionRegistry;
pub use session::Session;
