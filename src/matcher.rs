//! Point-to-region matching with a last-hit shortcut.

use geo::Point;

use crate::geometry;
use crate::regions::RegionSet;

/// Find the region containing `point`.
///
/// When `hint` names a region that still contains the point, it is returned
/// without scanning — consecutive records from one capture session almost
/// always fall in the same region. Otherwise the set is scanned in input
/// order and the first containing region wins, which makes the result
/// deterministic even when polygons overlap. A hint naming no region in the
/// set simply falls through to the scan.
///
/// Pure function of its inputs: the hint only changes cost, never the result.
pub fn find_region<'r>(
    point: &Point<f64>,
    regions: &'r RegionSet,
    hint: Option<&str>,
) -> Option<&'r str> {
    if let Some(name) = hint {
        if let Some(region) = regions.get(name) {
            if geometry::contains(&region.geometry, point) {
                return Some(region.name.as_str());
            }
        }
    }

    regions
        .iter()
        .find(|region| geometry::contains(&region.geometry, point))
        .map(|region| region.name.as_str())
}
