//! Douglas-Peucker polyline simplification in plain (lat, lon) space.

use crate::gpx_types::GpxPoint;

/// Reduce `points` to the subsequence that stays within `tolerance` of the
/// original path.
///
/// The first and last points are always kept and relative order is
/// preserved. Distances are measured in degrees, without geodesic correction.
pub fn simplify(points: &[GpxPoint], tolerance: f64) -> Vec<GpxPoint> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    rdp_recursive(points, 0, points.len() - 1, tolerance, &mut keep);

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

fn rdp_recursive(points: &[GpxPoint], start: usize, end: usize, tolerance: f64, keep: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let line_start = &points[start];
    let line_end = &points[end];

    let mut max_dist = 0.0;
    let mut max_idx = start;

    for (i, point) in points.iter().enumerate().take(end).skip(start + 1) {
        let dist = perpendicular_distance(point, line_start, line_end);
        if dist > max_dist {
            max_dist = dist;
            max_idx = i;
        }
    }

    if max_dist > tolerance && max_idx > start {
        keep[max_idx] = true;
        rdp_recursive(points, start, max_idx, tolerance, keep);
        rdp_recursive(points, max_idx, end, tolerance, keep);
    }
}

/// Distance from `point` to the infinite line through `line_start` and
/// `line_end`; falls back to the distance to `line_start` when they coincide.
pub fn perpendicular_distance(point: &GpxPoint, line_start: &GpxPoint, line_end: &GpxPoint) -> f64 {
    let dx = line_end.lon - line_start.lon;
    let dy = line_end.lat - line_start.lat;

    let line_len = dx.hypot(dy);
    if line_len == 0.0 {
        return (point.lon - line_start.lon).hypot(point.lat - line_start.lat);
    }

    let cross = (point.lon - line_start.lon) * dy - (point.lat - line_start.lat) * dx;
    cross.abs() / line_len
}
