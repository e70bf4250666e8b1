//! Strongly-typed identifiers for steps, runs, and callers.

use std::fmt;

/// Position of a top-level event within a measurement run.
///
/// Index 0 is always the run's START event. Step indices are dense and
/// assigned in recording order; they also travel inside UNLOOP payloads,
/// which is why they are limited to 32 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepIndex(pub u32);

impl StepIndex {
    /// The START step every run begins with.
    pub const FIRST: Self = Self(0);

    /// The index as a `usize`, for slot addressing.
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// The step recorded immediately before this one, saturating at the first.
    pub fn previous(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

impl fmt::Display for StepIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for StepIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a measurement run within a session.
///
/// Assigned from a per-session counter in creation order, so nested runs
/// always carry a larger id than the run they were started inside.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(pub u32);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for RunId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Caller-chosen key under which a session is registered.
///
/// The engine never derives this from thread identity; callers pick a
/// value (a worker index, a thread-local counter) and remove it explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallerId(pub u64);

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CallerId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_saturates_at_first() {
        assert_eq!(StepIndex(3).previous(), StepIndex(2));
        assert_eq!(StepIndex::FIRST.previous(), StepIndex::FIRST);
    }

    #[test]
    fn display_is_bare_number() {
        assert_eq!(StepIndex(7).to_string(), "7");
        assert_eq!(RunId(2).to_string(), "2");
        assert_eq!(CallerId(99).to_string(), "99");
    }

    #[test]
    fn ordering_follows_inner_value() {
        assert!(StepIndex(1) < StepIndex(2));
        assert!(RunId(0) < RunId(1));
    }
}
