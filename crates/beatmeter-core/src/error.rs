//! Error types for the beatmeter instrumentation engine.
//!
//! Every recording failure is local to the run being recorded: the
//! session can discard that run and keep going. Nothing here is retried,
//! since a timestamped sequence cannot be replayed.

use std::error::Error;
use std::fmt;

use crate::id::StepIndex;

/// Which loop-stack rule a caller broke.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoopImbalance {
    /// An iteration was recorded while no loop was open.
    IterationOutsideLoop,
    /// A loop was closed while no loop was open.
    UnloopWithoutLoop,
    /// The run ended while loops were still open.
    OpenAtClose {
        /// Step indices of the loops that were never closed, outermost first.
        open: Vec<StepIndex>,
    },
}

impl fmt::Display for LoopImbalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IterationOutsideLoop => write!(f, "iteration recorded outside any loop"),
            Self::UnloopWithoutLoop => write!(f, "unloop without a matching loop"),
            Self::OpenAtClose { open } => {
                write!(f, "{} loop(s) still open at close:", open.len())?;
                for step in open {
                    write!(f, " #{step}")?;
                }
                Ok(())
            }
        }
    }
}

/// Errors raised while recording or decoding measurement events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MeterError {
    /// The run's fixed event capacity is exhausted. Top-level slots are
    /// never overwritten.
    CapacityExceeded {
        /// The run's fixed capacity in events.
        capacity: usize,
    },
    /// Loop bookkeeping does not follow stack discipline.
    UnbalancedLoop {
        /// The specific rule that was broken.
        reason: LoopImbalance,
    },
    /// A negative iteration count was requested for a bounded loop.
    InvalidLoopSize {
        /// The rejected count.
        requested: i64,
    },
    /// A payload does not fit the 32-bit payload field of an event word.
    PrecisionLossPayload {
        /// The value that would have been truncated.
        value: u64,
    },
    /// A session operation was issued with no active run.
    NotTracking,
    /// The run already recorded its END event.
    RunClosed,
    /// A step index that was never recorded in this run.
    UnknownStep {
        /// The offending index.
        index: StepIndex,
    },
    /// A raw word has bits set outside the documented event layout.
    ReservedBits {
        /// The rejected word.
        word: u64,
    },
}

impl MeterError {
    /// Shorthand for an [`UnbalancedLoop`](Self::UnbalancedLoop) error.
    pub fn unbalanced(reason: LoopImbalance) -> Self {
        Self::UnbalancedLoop { reason }
    }
}

impl fmt::Display for MeterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { capacity } => {
                write!(f, "run capacity of {capacity} events exceeded")
            }
            Self::UnbalancedLoop { reason } => write!(f, "unbalanced loop: {reason}"),
            Self::InvalidLoopSize { requested } => {
                write!(f, "invalid loop size {requested}: bounded loops need a count >= 0")
            }
            Self::PrecisionLossPayload { value } => {
                write!(f, "payload {value} does not fit in 32 bits")
            }
            Self::NotTracking => write!(f, "no active measurement run"),
            Self::RunClosed => write!(f, "run already ended"),
            Self::UnknownStep { index } => write!(f, "step #{index} was never recorded"),
            Self::ReservedBits { word } => {
                write!(f, "event word {word:#018x} sets reserved bits")
            }
        }
    }
}

impl Error for MeterError {}
