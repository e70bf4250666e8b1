//! Fixed-capacity ring of loop iteration timestamps.
//!
//! [`LoopTracker`] keeps the most recent `capacity` iterations of one
//! loop. Once full, each new iteration overwrites the oldest one; the
//! total iteration count keeps counting regardless. Statistics are
//! computed over the retained window only, at report time.

use std::fmt;

use beatmeter_core::{nanos_to_millis, EventFlags};

/// Map a logical (chronological) index to a physical slot.
///
/// `cursor` is the next slot to be written and `retained` the number of
/// valid slots. While the ring has not wrapped, the oldest entry is in
/// slot 0; once full, the oldest entry sits under the cursor.
///
/// # Panics
///
/// Panics in debug builds if `retained > capacity` or
/// `index >= retained`.
#[inline]
pub fn logical_to_physical(index: usize, cursor: usize, retained: usize, capacity: usize) -> usize {
    debug_assert!(retained <= capacity, "retained {retained} > capacity {capacity}");
    debug_assert!(index < retained, "index {index} out of {retained} retained");
    if retained < capacity {
        index
    } else {
        (cursor + index) % capacity
    }
}

/// Aggregate timing of one loop's retained iterations, in nanoseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Trimmed mean iteration duration (single min and max discarded).
    pub avg: i64,
    /// Shortest retained iteration.
    pub min: i64,
    /// Longest retained iteration.
    pub max: i64,
    /// Last retained iteration timestamp minus the loop start.
    pub total_span: i64,
    /// Iterations ever recorded, including overwritten ones.
    pub call_count: u64,
}

impl fmt::Display for LoopStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "avg/min/max/total: {:.3}/{:.3}/{:.3}/{:.3} ms - calls:{}",
            nanos_to_millis(self.avg),
            nanos_to_millis(self.min),
            nanos_to_millis(self.max),
            nanos_to_millis(self.total_span),
            self.call_count
        )
    }
}

/// Iteration history of a single loop.
///
/// Storage is allocated once, at construction. [`record`](Self::record)
/// never allocates and never fails.
#[derive(Clone, Debug)]
pub struct LoopTracker {
    iterations: Box<[i64]>,
    flags: Box<[EventFlags]>,
    /// Next slot to write.
    cursor: usize,
    retained: usize,
    total_captured: u64,
    start: i64,
    /// Timestamp preceding the oldest retained iteration: the loop start
    /// until the first overwrite, then the most recently evicted entry.
    anchor: i64,
    endless: bool,
}

impl LoopTracker {
    /// Create a tracker for a loop that started at `start`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(start: i64, capacity: usize, endless: bool) -> Self {
        assert!(capacity >= 1, "LoopTracker capacity must be >= 1, got {capacity}");
        Self {
            iterations: vec![0; capacity].into_boxed_slice(),
            flags: vec![EventFlags::default(); capacity].into_boxed_slice(),
            cursor: 0,
            retained: 0,
            total_captured: 0,
            start,
            anchor: start,
            endless,
        }
    }

    /// Record one finished iteration.
    ///
    /// Overwrites the oldest retained iteration once the ring is full.
    pub fn record(&mut self, time: i64, flags: EventFlags) {
        let capacity = self.capacity();
        if self.retained == capacity {
            self.anchor = self.iterations[self.cursor];
        }
        self.iterations[self.cursor] = time;
        self.flags[self.cursor] = flags;
        self.cursor = (self.cursor + 1) % capacity;
        self.retained = (self.retained + 1).min(capacity);
        self.total_captured += 1;
    }

    /// Retained `(timestamp, flags)` pairs, oldest first.
    pub fn iterations(&self) -> impl Iterator<Item = (i64, EventFlags)> + '_ {
        let capacity = self.capacity();
        (0..self.retained).map(move |i| {
            let slot = logical_to_physical(i, self.cursor, self.retained, capacity);
            (self.iterations[slot], self.flags[slot])
        })
    }

    /// Durations of the retained iterations, oldest first.
    pub fn durations(&self) -> impl Iterator<Item = i64> + '_ {
        self.iterations().scan(self.anchor, |prev, (time, _)| {
            let delta = time - *prev;
            *prev = time;
            Some(delta)
        })
    }

    /// Statistics over the retained window.
    ///
    /// The average is a trimmed mean: the single shortest and single
    /// longest iteration are subtracted from the sum, which is divided by
    /// `max(1, retained - 2)`. Below three iterations the trim removes
    /// everything, so one iteration yields `-delta` and two yield 0.
    /// An empty tracker reports all zeros.
    pub fn statistics(&self) -> LoopStats {
        if self.retained == 0 {
            return LoopStats::default();
        }

        let mut sum = 0i64;
        let mut min = i64::MAX;
        let mut max = i64::MIN;
        for delta in self.durations() {
            sum += delta;
            min = min.min(delta);
            max = max.max(delta);
        }

        let avg = (sum - min - max) / (self.retained as i64 - 2).max(1);

        LoopStats {
            avg,
            min,
            max,
            total_span: self.last().unwrap_or(self.start) - self.start,
            call_count: self.total_captured,
        }
    }

    /// The most recently recorded iteration timestamp.
    pub fn last(&self) -> Option<i64> {
        if self.retained == 0 {
            return None;
        }
        let capacity = self.capacity();
        Some(self.iterations[(self.cursor + capacity - 1) % capacity])
    }

    /// Ring capacity in iterations.
    pub fn capacity(&self) -> usize {
        self.iterations.len()
    }

    /// Number of iterations currently retained (up to `capacity`).
    pub fn retained(&self) -> usize {
        self.retained
    }

    /// Iterations ever recorded.
    pub fn total_captured(&self) -> u64 {
        self.total_captured
    }

    /// Whether no iteration has been recorded.
    pub fn is_empty(&self) -> bool {
        self.total_captured == 0
    }

    /// Whether the loop was opened without a known iteration count.
    pub fn is_endless(&self) -> bool {
        self.endless
    }

    /// Loop start timestamp.
    pub fn start(&self) -> i64 {
        self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beatmeter_core::EventKind;
    use beatmeter_test_utils::{deltas_to_timestamps, NANOS_PER_MS};

    fn recap() -> EventFlags {
        EventFlags::of(EventKind::INCLUDE | EventKind::RECAP)
    }

    fn tracker_with(start: i64, capacity: usize, times: &[i64]) -> LoopTracker {
        let mut tracker = LoopTracker::new(start, capacity, false);
        for &t in times {
            tracker.record(t, recap());
        }
        tracker
    }

    // ── index mapping ─────────────────────────────────────────────

    #[test]
    fn mapping_is_identity_before_wrap() {
        for i in 0..3 {
            assert_eq!(logical_to_physical(i, 3, 3, 5), i);
        }
    }

    #[test]
    fn mapping_starts_at_cursor_when_full() {
        // capacity 4, cursor 1: oldest in slot 1, newest in slot 0.
        let slots: Vec<usize> = (0..4).map(|i| logical_to_physical(i, 1, 4, 4)).collect();
        assert_eq!(slots, vec![1, 2, 3, 0]);
    }

    #[test]
    fn mapping_full_with_cursor_at_zero() {
        let slots: Vec<usize> = (0..3).map(|i| logical_to_physical(i, 0, 3, 3)).collect();
        assert_eq!(slots, vec![0, 1, 2]);
    }

    // ── statistics ────────────────────────────────────────────────

    #[test]
    fn trimmed_mean_drops_single_min_and_max() {
        let ms = NANOS_PER_MS;
        let deltas = [10 * ms, 20 * ms, 30 * ms, 40 * ms, 50 * ms];
        let times = deltas_to_timestamps(0, &deltas);
        let stats = tracker_with(0, 5, &times).statistics();
        assert_eq!(stats.avg, 30 * ms);
        assert_eq!(stats.min, 10 * ms);
        assert_eq!(stats.max, 50 * ms);
        assert_eq!(stats.total_span, 150 * ms);
        assert_eq!(stats.call_count, 5);
    }

    #[test]
    fn total_span_is_relative_to_loop_start() {
        let stats = tracker_with(1_000, 3, &[1_010, 1_030, 1_060]).statistics();
        assert_eq!(stats.total_span, 60);
    }

    #[test]
    fn empty_endless_loop_reports_zeros() {
        let tracker = LoopTracker::new(500, 1000, true);
        assert!(tracker.is_endless());
        assert_eq!(tracker.statistics(), LoopStats::default());
        assert_eq!(tracker.last(), None);
    }

    #[test]
    fn short_loops_trim_everything() {
        let one = tracker_with(0, 4, &[8]).statistics();
        assert_eq!((one.avg, one.min, one.max), (-8, 8, 8));

        let two = tracker_with(0, 4, &[4, 16]).statistics();
        assert_eq!(two.avg, 0);
        assert_eq!((two.min, two.max), (4, 12));
    }

    // ── overwrite ─────────────────────────────────────────────────

    #[test]
    fn overwrite_keeps_last_three_chronologically() {
        let tracker = tracker_with(0, 3, &[10, 20, 30, 40, 50]);
        assert_eq!(tracker.total_captured(), 5);
        assert_eq!(tracker.retained(), 3);
        let kept: Vec<i64> = tracker.iterations().map(|(t, _)| t).collect();
        assert_eq!(kept, vec![30, 40, 50]);
        assert_eq!(tracker.last(), Some(50));
    }

    #[test]
    fn wrapped_durations_measure_from_evicted_entry() {
        let tracker = tracker_with(0, 3, &[10, 30, 60, 100, 150]);
        let durations: Vec<i64> = tracker.durations().collect();
        assert_eq!(durations, vec![30, 40, 50]);
        let stats = tracker.statistics();
        assert_eq!(stats.avg, 40);
        assert_eq!(stats.total_span, 150);
        assert_eq!(stats.call_count, 5);
    }

    #[test]
    fn exact_fill_does_not_wrap_order() {
        let tracker = tracker_with(0, 3, &[1, 2, 3]);
        let kept: Vec<i64> = tracker.iterations().map(|(t, _)| t).collect();
        assert_eq!(kept, vec![1, 2, 3]);
    }

    #[test]
    fn iteration_flags_are_kept() {
        let tracker = tracker_with(0, 2, &[1]);
        let (_, flags) = tracker.iterations().next().unwrap();
        assert!(flags.is_recap());
    }

    #[test]
    fn display_renders_millis() {
        let stats = LoopStats {
            avg: 1_500_000,
            min: 1_000_000,
            max: 2_000_000,
            total_span: 4_500_000,
            call_count: 3,
        };
        assert_eq!(
            stats.to_string(),
            "avg/min/max/total: 1.500/1.000/2.000/4.500 ms - calls:3"
        );
    }

    #[test]
    #[should_panic(expected = "capacity must be >= 1")]
    fn zero_capacity_panics() {
        LoopTracker::new(0, 0, false);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn retains_most_recent_window(
                capacity in 1usize..16,
                deltas in proptest::collection::vec(0i64..1_000, 0..64),
            ) {
                let times = deltas_to_timestamps(0, &deltas);
                let tracker = tracker_with(0, capacity, &times);
                let kept: Vec<i64> = tracker.iterations().map(|(t, _)| t).collect();
                let skip = times.len().saturating_sub(capacity);
                prop_assert_eq!(kept, times[skip..].to_vec());
                prop_assert_eq!(tracker.total_captured(), times.len() as u64);
                prop_assert!(tracker.retained() <= capacity);
            }

            #[test]
            fn durations_match_source_deltas(
                capacity in 1usize..16,
                deltas in proptest::collection::vec(0i64..1_000, 1..64),
            ) {
                let times = deltas_to_timestamps(0, &deltas);
                let tracker = tracker_with(0, capacity, &times);
                let got: Vec<i64> = tracker.durations().collect();
                let skip = deltas.len().saturating_sub(capacity);
                prop_assert_eq!(got, deltas[skip..].to_vec());
            }

            #[test]
            fn trimmed_mean_within_min_max(
                deltas in proptest::collection::vec(0i64..1_000_000, 3..32),
            ) {
                let times = deltas_to_timestamps(0, &deltas);
                let stats = tracker_with(0, deltas.len(), &times).statistics();
                prop_assert!(stats.min <= stats.avg);
                prop_assert!(stats.avg <= stats.max);
            }
        }
    }
}
