//! Scheduled work assignments ("missions") shown on the calendar.

use serde::{Deserialize, Serialize};

use super::TimeRange;

/// A mission occupying a date range on the workshop calendar.
///
/// Items are immutable once laid out and may overlap freely; the layout
/// engine is responsible for stacking them into lanes.
///
/// # Example
///
/// ```
/// use workshop_engine::models::{ScheduledItem, TimeRange};
///
/// let item = ScheduledItem {
///     id: "mission_042".to_string(),
///     range: TimeRange::parse("2024-03-04", "2024-03-06").unwrap(),
///     title: "Gearbox overhaul".to_string(),
///     participants: vec!["worker_1".to_string(), "worker_3".to_string()],
///     payload: serde_json::Value::Null,
/// };
/// assert_eq!(item.range.days(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledItem {
    /// Identifier assigned by the persistence collaborator.
    pub id: String,
    /// The full, un-clipped date range of the mission.
    pub range: TimeRange,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Ids of the workers assigned to the mission.
    #[serde(default)]
    pub participants: Vec<String>,
    /// Opaque data carried through to the display layer.
    #[serde(default)]
    pub payload: serde_json::Value,
}
