//! The fixed-capacity ledger of one measurement run.
//!
//! A [`MeasurementRun`] stores `(timestamp, event word)` pairs in two
//! parallel pre-sized arrays. Every recording call is O(1): it checks
//! capacity, writes one slot and bumps the cursor. Loop iterations never
//! touch the top-level arrays; they go to the [`LoopTracker`] of the
//! innermost open loop.
//!
//! Failed calls commit nothing. Capacity, lifecycle and loop-stack
//! checks all happen before the first write.

use indexmap::IndexMap;
use smallvec::SmallVec;

use beatmeter_core::{
    EventFlags, EventKind, LoopImbalance, MeterError, Modifiers, RunId, StepIndex,
};

use crate::config::RunConfig;
use crate::tracker::LoopTracker;

/// Typical nesting depth; deeper loop stacks spill to the heap.
const INLINE_LOOP_DEPTH: usize = 8;

/// Recording ledger for one start/close bracket.
#[derive(Clone, Debug)]
pub struct MeasurementRun {
    id: RunId,
    start: i64,
    timestamps: Box<[i64]>,
    flags: Box<[EventFlags]>,
    /// Next free slot.
    position: usize,
    loop_stack: SmallVec<[StepIndex; INLINE_LOOP_DEPTH]>,
    loops: IndexMap<StepIndex, LoopTracker>,
    annotations: IndexMap<StepIndex, String>,
    endless_capacity: usize,
    closed: bool,
}

impl MeasurementRun {
    /// Open a run and record its INCLUDE|START event at `start` as step 0.
    ///
    /// # Panics
    ///
    /// Panics if `config.capacity` is zero or exceeds
    /// [`RunConfig::MAX_CAPACITY`], or if `config.endless_loop_capacity`
    /// is zero. Validate the config first to get an error instead.
    pub fn open(id: RunId, start: i64, config: &RunConfig) -> Self {
        assert!(
            (1..=RunConfig::MAX_CAPACITY).contains(&config.capacity),
            "run capacity must be in 1..=u32::MAX, got {}",
            config.capacity
        );
        assert!(
            config.endless_loop_capacity >= 1,
            "endless loop capacity must be >= 1"
        );

        let mut timestamps = vec![0; config.capacity].into_boxed_slice();
        let mut flags = vec![EventFlags::default(); config.capacity].into_boxed_slice();
        timestamps[0] = start;
        flags[0] = EventFlags::of(EventKind::INCLUDE | EventKind::START);

        Self {
            id,
            start,
            timestamps,
            flags,
            position: 1,
            loop_stack: SmallVec::new(),
            loops: IndexMap::new(),
            annotations: IndexMap::new(),
            endless_capacity: config.endless_loop_capacity,
            closed: false,
        }
    }

    // ── recording ─────────────────────────────────────────────────

    /// Fail unless one more top-level slot can be written.
    fn ensure_slot(&self) -> Result<(), MeterError> {
        if self.closed {
            return Err(MeterError::RunClosed);
        }
        if self.position == self.capacity() {
            return Err(MeterError::CapacityExceeded {
                capacity: self.capacity(),
            });
        }
        Ok(())
    }

    /// Write one slot. Callers must have passed [`ensure_slot`](Self::ensure_slot).
    fn commit(&mut self, time: i64, flags: EventFlags) -> StepIndex {
        let index = self.position;
        self.timestamps[index] = time;
        self.flags[index] = flags;
        self.position += 1;
        StepIndex(index as u32)
    }

    fn push(&mut self, time: i64, flags: EventFlags) -> Result<StepIndex, MeterError> {
        self.ensure_slot()?;
        Ok(self.commit(time, flags))
    }

    /// Record a plain marker: INCLUDE when `include`, EXCLUDE otherwise.
    pub fn record_point(&mut self, time: i64, include: bool) -> Result<StepIndex, MeterError> {
        let kind = if include {
            EventKind::INCLUDE
        } else {
            EventKind::EXCLUDE
        };
        self.push(time, EventFlags::of(kind))
    }

    /// Open a loop and make it the target of subsequent iterations.
    ///
    /// Bounded loops retain `expected_count` iterations (at least one);
    /// endless loops retain the configured window and ignore
    /// `expected_count`.
    ///
    /// # Memory
    ///
    /// The tracker's ring is allocated here, sized to the retention
    /// count: 16 bytes per slot (a timestamp and an event word). A
    /// declared count near the 32-bit limit asks for tens of GiB and
    /// aborts on allocation failure, so declare the real iteration count
    /// or use an endless loop.
    ///
    /// # Errors
    ///
    /// - [`MeterError::InvalidLoopSize`] if `expected_count < 0` and the
    ///   loop is not endless.
    /// - [`MeterError::PrecisionLossPayload`] if the count exceeds 32 bits.
    /// - [`MeterError::CapacityExceeded`] / [`MeterError::RunClosed`] as
    ///   for every top-level event.
    pub fn open_loop(
        &mut self,
        time: i64,
        expected_count: i64,
        endless: bool,
    ) -> Result<StepIndex, MeterError> {
        self.ensure_slot()?;

        let (size, modifiers) = if endless {
            (self.endless_capacity as u64, Modifiers::ENDLESS)
        } else {
            let size = u64::try_from(expected_count).map_err(|_| MeterError::InvalidLoopSize {
                requested: expected_count,
            })?;
            (size, Modifiers::NONE)
        };
        let flags = EventFlags::encode(EventKind::INCLUDE | EventKind::LOOP, modifiers, size)?;

        let index = self.commit(time, flags);
        let capacity = (size as usize).max(1);
        self.loops
            .insert(index, LoopTracker::new(time, capacity, endless));
        self.loop_stack.push(index);
        Ok(index)
    }

    /// Record one iteration of the innermost open loop.
    ///
    /// Does not consume a top-level slot. Returns the step index of the
    /// loop that received the iteration.
    ///
    /// # Errors
    ///
    /// [`MeterError::UnbalancedLoop`] if no loop is open.
    pub fn record_iteration(&mut self, time: i64) -> Result<StepIndex, MeterError> {
        if self.closed {
            return Err(MeterError::RunClosed);
        }
        let owner = *self
            .loop_stack
            .last()
            .ok_or_else(|| MeterError::unbalanced(LoopImbalance::IterationOutsideLoop))?;
        let tracker = self
            .loops
            .get_mut(&owner)
            .ok_or(MeterError::UnknownStep { index: owner })?;
        tracker.record(time, EventFlags::of(EventKind::INCLUDE | EventKind::RECAP));
        Ok(owner)
    }

    /// Close the innermost open loop with an UNLOOP event whose payload
    /// is the loop's own step index.
    ///
    /// # Errors
    ///
    /// [`MeterError::UnbalancedLoop`] if no loop is open; the run is left
    /// untouched.
    pub fn close_loop(&mut self, time: i64) -> Result<StepIndex, MeterError> {
        self.ensure_slot()?;
        let owner = self
            .loop_stack
            .pop()
            .ok_or_else(|| MeterError::unbalanced(LoopImbalance::UnloopWithoutLoop))?;
        Ok(self.commit(
            time,
            EventFlags::pack(EventKind::UNLOOP, Modifiers::NONE, owner.0),
        ))
    }

    /// Record the END event. Open loops stay open and are reported as
    /// incomplete.
    pub fn close(&mut self, time: i64) -> Result<StepIndex, MeterError> {
        let index = self.push(time, EventFlags::of(EventKind::END))?;
        self.closed = true;
        Ok(index)
    }

    /// Attach a free-text annotation to a recorded step. Last write wins.
    ///
    /// # Errors
    ///
    /// [`MeterError::UnknownStep`] if `index` was never recorded.
    pub fn annotate(&mut self, index: StepIndex, text: impl Into<String>) -> Result<(), MeterError> {
        if index.as_usize() >= self.position {
            return Err(MeterError::UnknownStep { index });
        }
        self.annotations.insert(index, text.into());
        Ok(())
    }

    /// Annotate the most recently recorded top-level step.
    pub fn annotate_last(&mut self, text: impl Into<String>) {
        self.annotations.insert(self.last_index(), text.into());
    }

    // ── queries ───────────────────────────────────────────────────

    /// Fail with [`MeterError::UnbalancedLoop`] if any loop is still open.
    pub fn verify_balanced(&self) -> Result<(), MeterError> {
        if self.loop_stack.is_empty() {
            Ok(())
        } else {
            Err(MeterError::unbalanced(LoopImbalance::OpenAtClose {
                open: self.loop_stack.to_vec(),
            }))
        }
    }

    /// Last recorded top-level timestamp minus the run start.
    pub fn total(&self) -> i64 {
        self.last() - self.start
    }

    /// This run's id.
    pub fn id(&self) -> RunId {
        self.id
    }

    /// Start timestamp (the timestamp of step 0).
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Most recently recorded top-level timestamp.
    pub fn last(&self) -> i64 {
        self.timestamps[self.position - 1]
    }

    /// Index of the most recently recorded top-level step.
    pub fn last_index(&self) -> StepIndex {
        StepIndex((self.position - 1) as u32)
    }

    /// Number of recorded top-level steps.
    pub fn len(&self) -> usize {
        self.position
    }

    /// Always false: a run holds its START event from creation.
    pub fn is_empty(&self) -> bool {
        self.position == 0
    }

    /// Fixed top-level capacity.
    pub fn capacity(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether END has been recorded.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Recorded timestamps, in step order.
    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps[..self.position]
    }

    /// Recorded event words, in step order.
    pub fn events(&self) -> &[EventFlags] {
        &self.flags[..self.position]
    }

    /// Timestamp of one step.
    pub fn timestamp(&self, index: StepIndex) -> Option<i64> {
        self.timestamps().get(index.as_usize()).copied()
    }

    /// Event word of one step.
    pub fn flags(&self, index: StepIndex) -> Option<EventFlags> {
        self.events().get(index.as_usize()).copied()
    }

    /// Tracker of the loop opened at `index`.
    pub fn loop_tracker(&self, index: StepIndex) -> Option<&LoopTracker> {
        self.loops.get(&index)
    }

    /// Every loop opened in this run, in opening order.
    pub fn loops(&self) -> impl Iterator<Item = (StepIndex, &LoopTracker)> {
        self.loops.iter().map(|(k, v)| (*k, v))
    }

    /// User annotation of one step.
    pub fn annotation(&self, index: StepIndex) -> Option<&str> {
        self.annotations.get(&index).map(String::as_str)
    }

    /// Loops still open, outermost first.
    pub fn open_loops(&self) -> &[StepIndex] {
        &self.loop_stack
    }

    /// Whether the loop opened at `index` is still open.
    pub fn is_loop_open(&self, index: StepIndex) -> bool {
        self.loop_stack.contains(&index)
    }
}
