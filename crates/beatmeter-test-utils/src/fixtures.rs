//! Timestamp fixtures.
//!
//! Tests usually think in durations ("this step cost 9 ms"), while the
//! ledger stores absolute timestamps. These helpers convert one into the
//! other.

pub const NANOS_PER_MS: i64 = 1_000_000;

/// Absolute timestamps reached by accumulating `deltas` from `start`.
///
/// The result has one entry per delta; `start` itself is not included.
pub fn deltas_to_timestamps(start: i64, deltas: &[i64]) -> Vec<i64> {
    deltas
        .iter()
        .scan(start, |now, d| {
            *now += d;
            Some(*now)
        })
        .collect()
}

/// Timestamps for a run whose per-step costs are `costs`.
///
/// Step 0 is the START event and always costs zero, so the first entry
/// of `costs` belongs to step 1. The returned vector starts with `start`.
pub fn costs_to_timestamps(start: i64, costs: &[i64]) -> Vec<i64> {
    let mut out = Vec::with_capacity(costs.len() + 1);
    out.push(start);
    out.extend(deltas_to_timestamps(start, costs));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_accumulate() {
        assert_eq!(deltas_to_timestamps(10, &[1, 2, 3]), vec![11, 13, 16]);
        assert!(deltas_to_timestamps(0, &[]).is_empty());
    }

    #[test]
    fn costs_prepend_start() {
        assert_eq!(costs_to_timestamps(0, &[5, 1]), vec![0, 5, 6]);
    }
}
