//! Calendar layout for the workshop month view.
//!
//! This module packs overlapping missions into lanes per week row
//! ([`allocate_lanes`]) and drives that allocator across the six rows of a
//! month grid ([`layout_month`]).

mod lane_allocator;
mod layout;

pub use lane_allocator::{
    LaneAllocation, LaneAllocatorState, LaneAssignment, LaneCandidate, allocate_lanes,
};
pub use layout::{
    LayoutSegment, MonthLayout, WEEKS_PER_GRID, WeekLayout, grid_bounds, layout_month,
    month_grid,
};
