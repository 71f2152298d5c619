//! Greedy interval-to-lane assignment for one week window.
//!
//! Lane occupancy is an explicit [`LaneAllocatorState`] value passed into and
//! returned from each call, so a month layout threads a single state through
//! its six weeks and multi-week items keep one lane for their whole run.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::TimeRange;

/// An item offered to the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneCandidate {
    /// Stable identity of the item across weeks (its upstream position).
    pub key: usize,
    /// The item's full, un-clipped range.
    pub range: TimeRange,
}

/// A lane granted to one item within one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneAssignment {
    /// The candidate key.
    pub key: usize,
    /// Zero-based lane index.
    pub lane: usize,
    /// The item's range clipped to the window.
    pub clipped: TimeRange,
}

/// Lane occupancy carried from one window to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneAllocatorState {
    occupied_until: Vec<NaiveDate>,
    assigned: BTreeMap<usize, usize>,
}

impl LaneAllocatorState {
    /// An empty state with no lanes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lanes opened so far.
    pub fn lane_count(&self) -> usize {
        self.occupied_until.len()
    }

    /// The lane previously granted to `key`, if any.
    pub fn lane_of(&self, key: usize) -> Option<usize> {
        self.assigned.get(&key).copied()
    }

    /// The last day lane `lane` is occupied.
    pub fn occupied_until(&self, lane: usize) -> Option<NaiveDate> {
        self.occupied_until.get(lane).copied()
    }
}

/// The outcome of allocating one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneAllocation {
    /// State to feed into the next window.
    pub state: LaneAllocatorState,
    /// Assignments in allocation order.
    pub assignments: Vec<LaneAssignment>,
}

/// Assigns lanes to the candidates overlapping `window`.
///
/// Candidates are ordered by ascending full-range start; ties keep their
/// input order. Each one reuses the lane it already holds from an earlier
/// window, otherwise takes the first lane whose occupancy ended before its
/// clipped start, otherwise opens a new lane. Occupancy is recorded up to
/// the item's full end, not its clipped end.
///
/// # Example
///
/// ```
/// use workshop_engine::calendar::{LaneAllocatorState, LaneCandidate, allocate_lanes};
/// use workshop_engine::models::TimeRange;
///
/// let week = TimeRange::parse("2024-03-04", "2024-03-10").unwrap();
/// let candidates = [
///     LaneCandidate { key: 0, range: TimeRange::parse("2024-03-04", "2024-03-06").unwrap() },
///     LaneCandidate { key: 1, range: TimeRange::parse("2024-03-05", "2024-03-07").unwrap() },
///     LaneCandidate { key: 2, range: TimeRange::parse("2024-03-06", "2024-03-06").unwrap() },
/// ];
///
/// let allocation = allocate_lanes(LaneAllocatorState::new(), &week, &candidates);
/// let lanes: Vec<_> = allocation.assignments.iter().map(|a| a.lane).collect();
/// assert_eq!(lanes, vec![0, 1, 2]);
/// ```
pub fn allocate_lanes(
    mut state: LaneAllocatorState,
    window: &TimeRange,
    candidates: &[LaneCandidate],
) -> LaneAllocation {
    let mut ordered: Vec<&LaneCandidate> = candidates.iter().collect();
    ordered.sort_by_key(|c| c.range.start);

    let mut assignments = Vec::with_capacity(ordered.len());
    for candidate in ordered {
        let Some(clipped) = candidate.range.clip(window) else {
            continue;
        };

        let lane = match state.assigned.get(&candidate.key) {
            Some(&lane) => lane,
            None => {
                let free = state
                    .occupied_until
                    .iter()
                    .position(|until| *until < clipped.start);
                let lane = match free {
                    Some(lane) => lane,
                    None => {
                        state.occupied_until.push(candidate.range.end);
                        state.occupied_until.len() - 1
                    }
                };
                state.assigned.insert(candidate.key, lane);
                lane
            }
        };
        state.occupied_until[lane] = candidate.range.end;

        assignments.push(LaneAssignment {
            key: candidate.key,
            lane,
            clipped,
        });
    }

    LaneAllocation { state, assignments }
}
