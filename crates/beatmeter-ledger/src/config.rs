//! Ledger sizing parameters.

/// Fixed capacities for a measurement run and its loop trackers.
///
/// Both values are fixed when a run opens; nothing grows afterwards.
/// Callers size a run for their worst case: recording past `capacity`
/// fails rather than truncating.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Number of top-level event slots per run, START and END included.
    ///
    /// Default: 256.
    pub capacity: usize,

    /// Retention window for loops opened without a known iteration count.
    ///
    /// Default: 1000. Only the most recent window of iterations feeds the
    /// loop statistics; the total iteration count stays exact.
    pub endless_loop_capacity: usize,
}

impl RunConfig {
    /// Default top-level event capacity.
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Default retention window for endless loops.
    pub const DEFAULT_ENDLESS_CAPACITY: usize = 1000;

    /// Largest usable capacity: step indices must fit the 32-bit payload.
    pub const MAX_CAPACITY: usize = u32::MAX as usize;

    /// Create a config with the given top-level capacity and default
    /// endless-loop window.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Approximate bytes a run reserves up front for its event slots.
    pub fn slot_bytes(&self) -> usize {
        self.capacity * (std::mem::size_of::<i64>() + std::mem::size_of::<u64>())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            capacity: Self::DEFAULT_CAPACITY,
            endless_loop_capacity: Self::DEFAULT_ENDLESS_CAPACITY,
        }
    }
}
