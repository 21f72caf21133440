//! Narrow seam over the geometry engine.
//!
//! The matcher and region loader only ever need two capabilities: point
//! containment and topology repair. Keeping both behind this module means the
//! engine (`geo` today) can be swapped without touching matcher logic.

use geo::{BooleanOps, Contains, MultiPolygon, Point};

/// True when `point` lies inside `geometry`.
///
/// `geo`'s `Contains` is boundary-exclusive: a point exactly on a ring is
/// reported as outside. That convention is passed through unchanged.
pub fn contains(geometry: &MultiPolygon<f64>, point: &Point<f64>) -> bool {
    geometry.contains(point)
}

/// Repair minor topological defects (self-intersections, duplicate vertices)
/// by unioning the geometry with the empty set.
pub fn normalize(geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    geometry.union(&MultiPolygon::new(Vec::new()))
}
