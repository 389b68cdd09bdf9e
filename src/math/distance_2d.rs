use super::intersect_2d::{segment_intersection, SegmentIntersection};
use super::Point2;

/// Projection of a point on a polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineProjection {
    /// Closest point on the polyline.
    pub point: Point2,
    /// Index of the segment holding the closest point.
    pub segment: usize,
    /// Parameter of the closest point along that segment.
    pub t: f64,
    /// Distance from the query point.
    pub distance: f64,
}

/// Returns the closest point on the segment `a → b` to `p` and its
/// parameter in `[0, 1]`.
///
/// Endpoint parameters return the exact endpoint coordinates.
#[must_use]
pub fn closest_point_on_segment(p: &Point2, a: &Point2, b: &Point2) -> (Point2, f64) {
    let d = b - a;
    let len_sq = d.norm_squared();

    if len_sq < 1e-20 {
        // Degenerate segment (zero length).
        return (*a, 0.0);
    }

    // Project point onto the infinite line, clamp to [0, 1].
    let t = ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    if t == 0.0 {
        (*a, t)
    } else if t == 1.0 {
        (*b, t)
    } else {
        (a + d * t, t)
    }
}

/// Returns the minimum distance from `p` to the segment `a → b`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let (c, _) = closest_point_on_segment(p, a, b);
    (p - c).norm()
}

/// Projects `p` on a polyline, picking the first closest segment.
///
/// A single-point polyline projects onto that point. Returns `None` for an
/// empty polyline.
#[must_use]
pub fn project_on_linestring(p: &Point2, points: &[Point2]) -> Option<LineProjection> {
    match points {
        [] => None,
        [only] => Some(LineProjection {
            point: *only,
            segment: 0,
            t: 0.0,
            distance: (p - only).norm(),
        }),
        _ => {
            let mut best: Option<LineProjection> = None;
            for (i, seg) in points.windows(2).enumerate() {
                let (c, t) = closest_point_on_segment(p, &seg[0], &seg[1]);
                let distance = (p - c).norm();
                if best.map_or(true, |b| distance < b.distance) {
                    best = Some(LineProjection {
                        point: c,
                        segment: i,
                        t,
                        distance,
                    });
                }
            }
            best
        }
    }
}

/// Minimum distance from `p` to a polyline (`f64::INFINITY` when empty).
#[must_use]
pub fn point_to_linestring_dist(p: &Point2, points: &[Point2]) -> f64 {
    project_on_linestring(p, points).map_or(f64::INFINITY, |pr| pr.distance)
}

/// Minimum distance between the segments `a0 → a1` and `b0 → b1`.
#[must_use]
pub fn segment_segment_dist(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2) -> f64 {
    if segment_intersection(a0, a1, b0, b1) != SegmentIntersection::None {
        return 0.0;
    }
    point_to_segment_dist(a0, b0, b1)
        .min(point_to_segment_dist(a1, b0, b1))
        .min(point_to_segment_dist(b0, a0, a1))
        .min(point_to_segment_dist(b1, a0, a1))
}

/// Minimum distance between two polylines (`f64::INFINITY` if either is empty).
#[must_use]
pub fn linestring_linestring_dist(a: &[Point2], b: &[Point2]) -> f64 {
    match (a, b) {
        ([], _) | (_, []) => f64::INFINITY,
        ([pa], _) => point_to_linestring_dist(pa, b),
        (_, [pb]) => point_to_linestring_dist(pb, a),
        _ => {
            let mut best = f64::INFINITY;
            for sa in a.windows(2) {
                for sb in b.windows(2) {
                    best = best.min(segment_segment_dist(&sa[0], &sa[1], &sb[0], &sb[1]));
                    if best == 0.0 {
                        return 0.0;
                    }
                }
            }
            best
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    // ── point_to_segment_dist tests ──

    #[test]
    fn segment_dist_perpendicular_projection() {
        // Point (1, 1) to segment (0,0)→(2,0). Closest at (1,0), dist = 1.
        let d = point_to_segment_dist(&p(1.0, 1.0), &p(0.0, 0.0), &p(2.0, 0.0));
        assert!((d - 1.0).abs() < TOL, "d={d}");
    }

    #[test]
    fn segment_dist_endpoint_closest() {
        let d = point_to_segment_dist(&p(-1.0, 0.0), &p(0.0, 0.0), &p(2.0, 0.0));
        assert!((d - 1.0).abs() < TOL, "d={d}");
    }

    #[test]
    fn segment_dist_degenerate() {
        // Zero-length segment: distance is point-to-point.
        let d = point_to_segment_dist(&p(3.0, 4.0), &p(0.0, 0.0), &p(0.0, 0.0));
        assert!((d - 5.0).abs() < TOL, "d={d}");
    }

    // ── polyline projection tests ──

    #[test]
    fn projection_picks_closest_segment() {
        let line = [p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0)];
        let pr = project_on_linestring(&p(11.0, 4.0), &line);
        let pr = pr.map(|pr| (pr.segment, pr.point, pr.distance));
        assert_eq!(pr.map(|x| x.0), Some(1));
        assert_eq!(pr.map(|x| x.1), Some(p(10.0, 4.0)));
        assert!(pr.is_some_and(|x| (x.2 - 1.0).abs() < TOL));
    }

    #[test]
    fn projection_at_vertex_is_exact() {
        let line = [p(0.0, 0.0), p(0.1, 0.3), p(1.0, 0.0)];
        let pr = project_on_linestring(&p(0.1, 5.0), &line);
        assert_eq!(pr.map(|x| x.point), Some(p(0.1, 0.3)));
    }

    #[test]
    fn empty_line_has_infinite_distance() {
        assert!(point_to_linestring_dist(&p(0.0, 0.0), &[]).is_infinite());
    }

    // ── polyline/polyline tests ──

    #[test]
    fn crossing_lines_have_zero_distance() {
        let a = [p(0.0, 0.0), p(2.0, 2.0)];
        let b = [p(0.0, 2.0), p(2.0, 0.0)];
        assert!(linestring_linestring_dist(&a, &b).abs() < TOL);
    }

    #[test]
    fn parallel_lines_distance() {
        let a = [p(0.0, 0.0), p(2.0, 0.0)];
        let b = [p(0.0, 3.0), p(1.0, 3.0), p(2.0, 3.0)];
        let d = linestring_linestring_dist(&a, &b);
        assert!((d - 3.0).abs() < TOL, "d={d}");
    }
}
