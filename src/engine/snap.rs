use crate::geometry::LineString;
use crate::math::distance_2d::closest_point_on_segment;
use crate::math::Point2;

/// Moves each vertex of `points` onto the nearest target vertex within
/// `tolerance`. The closing vertex of a ring follows the first one.
fn snap_vertices(points: &mut [Point2], targets: &[Point2], tolerance: f64) {
    let closed = points.len() > 1 && points.first() == points.last();
    for p in points.iter_mut() {
        let nearest = targets
            .iter()
            .map(|t| (t, (t - *p).norm()))
            .filter(|(_, d)| *d <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((t, _)) = nearest {
            *p = *t;
        }
    }
    if closed {
        if let Some(&first) = points.first() {
            if let Some(last) = points.last_mut() {
                *last = first;
            }
        }
    }
}

/// Inserts every target vertex lying within `tolerance` of a segment's
/// interior into that segment.
fn snap_segments(points: &mut Vec<Point2>, targets: &[Point2], tolerance: f64) {
    for t in targets {
        if points.contains(t) {
            continue;
        }
        let best = points
            .windows(2)
            .enumerate()
            .map(|(i, s)| {
                let (c, u) = closest_point_on_segment(t, &s[0], &s[1]);
                (i, u, (c - t).norm())
            })
            .filter(|(_, _, d)| *d <= tolerance)
            .min_by(|a, b| a.2.total_cmp(&b.2));
        if let Some((i, u, _)) = best {
            if u > 0.0 && u < 1.0 {
                points.insert(i + 1, *t);
            }
        }
    }
}

pub(super) fn snap_line(line: &LineString, targets: &[LineString], tolerance: f64) -> LineString {
    let target_pts: Vec<Point2> = targets.iter().flat_map(|t| t.points().iter().copied()).collect();
    if target_pts.is_empty() || tolerance < 0.0 {
        return line.clone();
    }
    let mut points = line.points().to_vec();
    let max_iterations = target_pts.len().max(1);
    for _ in 0..max_iterations {
        let before = points.len();
        snap_vertices(&mut points, &target_pts, tolerance);
        snap_segments(&mut points, &target_pts, tolerance);
        if points.len() == before {
            break;
        }
    }
    LineString::new(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(coords: &[(f64, f64)]) -> LineString {
        LineString::from_coords(coords)
    }

    #[test]
    fn vertex_moves_to_nearby_target() {
        let l = line(&[(0.0, 0.0), (10.0, 0.1)]);
        let t = line(&[(10.0, 0.0), (20.0, 0.0)]);
        let out = snap_line(&l, &[t], 0.5);
        assert_eq!(out, line(&[(0.0, 0.0), (10.0, 0.0)]));
    }

    #[test]
    fn target_vertex_inserted_into_segment() {
        let l = line(&[(0.0, 0.0), (10.0, 0.0)]);
        let t = line(&[(5.0, 0.2)]);
        let out = snap_line(&l, &[t], 0.5);
        assert_eq!(out, line(&[(0.0, 0.0), (5.0, 0.2), (10.0, 0.0)]));
    }

    #[test]
    fn ring_closing_vertex_follows_first() {
        let ring = line(&[(0.1, 0.1), (10.0, 0.0), (10.0, 10.0), (0.1, 0.1)]);
        let t = line(&[(0.0, 0.0), (-5.0, 0.0)]);
        let out = snap_line(&ring, &[t], 0.5);
        assert!(out.is_closed());
        assert_eq!(out.first(), Some(&Point2::new(0.0, 0.0)));
    }

    #[test]
    fn nothing_within_tolerance() {
        let l = line(&[(0.0, 0.0), (10.0, 0.0)]);
        let t = line(&[(5.0, 3.0)]);
        assert_eq!(snap_line(&l, &[t], 0.5), l);
    }
}
