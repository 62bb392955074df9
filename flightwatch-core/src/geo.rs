//! Bounding-box trail filtering.

use crate::types::{BoundingBox, TrackPoint};

/// Keep only the trail points inside `bbox`, preserving their order.
///
/// The result is always a subsequence of `points`. No error conditions:
/// an all-outside trail simply filters to empty.
pub fn filter_inside(bbox: &BoundingBox, points: &[TrackPoint]) -> Vec<TrackPoint> {
    points
        .iter()
        .filter(|p| bbox.contains(p.lat, p.lon))
        .copied()
        .collect()
}
