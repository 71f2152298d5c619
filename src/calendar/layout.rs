//! Month grid layout.
//!
//! A rendered month is always six Monday-aligned weeks, starting on the
//! Monday on or before the 1st. Items are cut into one segment per week they
//! touch, and lanes are allocated with a single [`LaneAllocatorState`]
//! threaded through all six weeks.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::lane_allocator::{LaneAllocatorState, LaneCandidate, allocate_lanes};
use crate::error::{EngineError, EngineResult};
use crate::models::{ScheduledItem, WeekWindow};

/// Number of week rows in a rendered month.
pub const WEEKS_PER_GRID: usize = 6;

/// One item's slice of one week row, ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSegment {
    /// The item the segment belongs to.
    pub item_id: String,
    /// Zero-based row in the month grid.
    pub week_index: usize,
    /// Zero-based lane within the row.
    pub lane: usize,
    /// ISO weekday column of the first day, Monday = 1 through Sunday = 7.
    pub start_col: u32,
    /// Number of day columns covered.
    pub span: u32,
    /// True when the item's real start falls in this row.
    pub is_range_start: bool,
    /// True when the item's real end falls in this row.
    pub is_range_end: bool,
}

/// One week row of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekLayout {
    /// Zero-based row in the month grid.
    pub week_index: usize,
    /// The week the row covers.
    pub window: WeekWindow,
    /// Lanes needed to draw this row (highest used lane + 1).
    pub lane_count: usize,
    /// Segments in allocation order.
    pub segments: Vec<LayoutSegment>,
}

/// The full layout of one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthLayout {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// Exactly six rows, chronological.
    pub weeks: Vec<WeekLayout>,
}

impl MonthLayout {
    /// All segments, row by row.
    pub fn segments(&self) -> impl Iterator<Item = &LayoutSegment> {
        self.weeks.iter().flat_map(|w| w.segments.iter())
    }

    /// The segments of one item, row by row.
    pub fn segments_for<'a>(&'a self, item_id: &'a str) -> impl Iterator<Item = &'a LayoutSegment> {
        self.segments().filter(move |s| s.item_id == item_id)
    }

    /// The most lanes any row needs.
    pub fn max_lanes(&self) -> usize {
        self.weeks.iter().map(|w| w.lane_count).max().unwrap_or(0)
    }
}

/// The six week windows of a rendered month.
///
/// # Example
///
/// ```
/// use workshop_engine::calendar::month_grid;
/// use chrono::NaiveDate;
///
/// // March 2024 starts on a Friday, so the grid opens on Monday 26 February.
/// let grid = month_grid(2024, 3).unwrap();
/// assert_eq!(grid.len(), 6);
/// assert_eq!(grid[0].start(), NaiveDate::from_ymd_opt(2024, 2, 26).unwrap());
/// assert_eq!(grid[5].end(), NaiveDate::from_ymd_opt(2024, 4, 7).unwrap());
/// ```
pub fn month_grid(year: i32, month: u32) -> EngineResult<Vec<WeekWindow>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(EngineError::InvalidMonth { year, month })?;

    let mut windows = Vec::with_capacity(WEEKS_PER_GRID);
    let mut window = WeekWindow::containing(first);
    for _ in 0..WEEKS_PER_GRID {
        windows.push(window);
        window = window.next();
    }
    Ok(windows)
}

/// Lays out `items` on the grid of the given month.
///
/// Produces one [`LayoutSegment`] per item per week row it overlaps. Items
/// entirely outside the grid produce nothing. Output is deterministic for a
/// given input order: items sharing a start date keep the order they were
/// supplied in.
///
/// # Example
///
/// ```
/// use workshop_engine::calendar::layout_month;
/// use workshop_engine::models::{ScheduledItem, TimeRange};
///
/// let item = ScheduledItem {
///     id: "m1".to_string(),
///     range: TimeRange::parse("2024-03-08", "2024-03-12").unwrap(),
///     title: "Engine rebuild".to_string(),
///     participants: vec![],
///     payload: serde_json::Value::Null,
/// };
///
/// let layout = layout_month(2024, 3, &[item]).unwrap();
/// let segments: Vec<_> = layout.segments_for("m1").collect();
/// assert_eq!(segments.len(), 2);
/// assert_eq!((segments[0].start_col, segments[0].span), (5, 3));
/// assert_eq!((segments[1].start_col, segments[1].span), (1, 2));
/// assert!(segments[0].is_range_start && !segments[0].is_range_end);
/// assert!(!segments[1].is_range_start && segments[1].is_range_end);
/// assert_eq!(segments[0].lane, segments[1].lane);
/// ```
pub fn layout_month(year: i32, month: u32, items: &[ScheduledItem]) -> EngineResult<MonthLayout> {
    let grid = month_grid(year, month)?;

    let candidates: Vec<LaneCandidate> = items
        .iter()
        .enumerate()
        .map(|(key, item)| LaneCandidate {
            key,
            range: item.range,
        })
        .collect();

    let mut state = LaneAllocatorState::new();
    let mut weeks = Vec::with_capacity(grid.len());

    for (week_index, window) in grid.into_iter().enumerate() {
        let overlapping: Vec<LaneCandidate> = candidates
            .iter()
            .filter(|c| c.range.overlaps(window.range()))
            .copied()
            .collect();

        let allocation = allocate_lanes(state, window.range(), &overlapping);
        state = allocation.state;

        let mut segments = Vec::with_capacity(allocation.assignments.len());
        for assignment in allocation.assignments {
            let item = &items[assignment.key];
            let start_col = WeekWindow::column_of(assignment.clipped.start);
            let end_col = WeekWindow::column_of(assignment.clipped.end);
            let span = i64::from(end_col) - i64::from(start_col) + 1;
            if span <= 0 {
                warn!(
                    item_id = %item.id,
                    week_index,
                    span,
                    "Dropping segment with non-positive span"
                );
                continue;
            }

            segments.push(LayoutSegment {
                item_id: item.id.clone(),
                week_index,
                lane: assignment.lane,
                start_col,
                span: span as u32,
                is_range_start: assignment.clipped.start == item.range.start,
                is_range_end: assignment.clipped.end == item.range.end,
            });
        }

        let lane_count = segments.iter().map(|s| s.lane + 1).max().unwrap_or(0);
        weeks.push(WeekLayout {
            week_index,
            window,
            lane_count,
            segments,
        });
    }

    let layout = MonthLayout { year, month, weeks };
    debug!(
        year,
        month,
        items = items.len(),
        segments = layout.segments().count(),
        lanes = state.lane_count(),
        "Laid out month grid"
    );
    Ok(layout)
}

/// First and last day shown by the grid of a month.
pub fn grid_bounds(year: i32, month: u32) -> EngineResult<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(EngineError::InvalidMonth { year, month })?;
    let start = WeekWindow::containing(first).start();
    Ok((start, start + Duration::days(7 * WEEKS_PER_GRID as i64 - 1)))
}
