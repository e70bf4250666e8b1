//! Benchmark workloads for the beatmeter instrumentation engine.
//!
//! Provides pre-shaped recording workloads for benchmarks and the demo:
//!
//! - [`Workload::SMALL`]: a handful of steps and one short loop
//! - [`Workload::LARGE`]: a run close to the default capacity with
//!   loops that overflow their trackers
//! - [`record`]: replay a workload against any [`Session`]

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use beatmeter_core::{Clock, MeterError, RunId};
use beatmeter_engine::{Session, SessionConfig};

/// Shape of one recorded run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Workload {
    /// Plain steps recorded before the loops.
    pub steps: usize,
    /// Number of sequential loops.
    pub loops: usize,
    /// Declared iteration count of each loop.
    pub declared: usize,
    /// Iterations actually recorded per loop; above `declared` the
    /// tracker wraps.
    pub iterations: usize,
    /// Every n-th plain step is skipped; 0 never skips.
    pub skip_every: usize,
}

impl Workload {
    /// A few steps and one short loop.
    pub const SMALL: Self = Self {
        steps: 8,
        loops: 1,
        declared: 16,
        iterations: 16,
        skip_every: 4,
    };

    /// Near the default run capacity, with overflowing loop trackers.
    pub const LARGE: Self = Self {
        steps: 200,
        loops: 20,
        declared: 64,
        iterations: 256,
        skip_every: 10,
    };

    /// Top-level slots a run of this shape uses, START and END included.
    pub fn top_level_events(&self) -> usize {
        // LOOP and UNLOOP per loop; iterations take no top-level slot.
        self.steps + 2 * self.loops + 2
    }

    /// A session config sized exactly for this workload.
    pub fn config(&self) -> SessionConfig {
        let mut config = SessionConfig::default();
        config.run.capacity = self.top_level_events();
        config
    }
}

/// Record one run of `workload` on `session` and close it with END.
///
/// The run stays on the stack so the caller can report or pop it.
pub fn record<C: Clock>(session: &mut Session<C>, workload: &Workload) -> Result<RunId, MeterError> {
    let id = session.start();
    for step in 0..workload.steps {
        if workload.skip_every > 0 && step % workload.skip_every == 0 {
            session.skip()?;
        } else {
            session.beat()?;
        }
    }
    for _ in 0..workload.loops {
        session.enter_loop(workload.declared as i64)?;
        for _ in 0..workload.iterations {
            session.recap()?;
        }
        session.unloop()?;
    }
    session.end()?;
    Ok(id)
}
