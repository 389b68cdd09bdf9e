use super::distance_2d::point_to_segment_dist;
use super::{Point2, TOLERANCE};

/// Location of a point relative to an areal geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Inside,
    Boundary,
    Outside,
}

/// Computes the signed area of a ring (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise. The ring may or
/// may not repeat its first vertex at the end.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Returns `true` if the ring winds counter-clockwise.
#[must_use]
pub fn is_ccw(points: &[Point2]) -> bool {
    signed_area_2d(points) > 0.0
}

/// Number of crossings of the ray from `p` towards +X with a closed ring.
#[must_use]
pub fn crossing_number(p: &Point2, ring: &[Point2]) -> usize {
    let mut cn = 0;
    for seg in ring.windows(2) {
        let (v1, v2) = (&seg[0], &seg[1]);
        // An upward or a downward crossing.
        if (v1.y <= p.y && v2.y > p.y) || (v1.y > p.y && v2.y <= p.y) {
            let vt = (p.y - v1.y) / (v2.y - v1.y);
            if p.x < v1.x + vt * (v2.x - v1.x) {
                cn += 1;
            }
        }
    }
    cn
}

/// Locates a point relative to a closed ring (first vertex repeated last).
#[must_use]
pub fn locate_in_ring(p: &Point2, ring: &[Point2]) -> Location {
    if ring
        .windows(2)
        .any(|s| point_to_segment_dist(p, &s[0], &s[1]) <= TOLERANCE)
    {
        return Location::Boundary;
    }
    if crossing_number(p, ring) % 2 == 1 {
        Location::Inside
    } else {
        Location::Outside
    }
}

/// Locates a point relative to a polygon given as shell and holes.
#[must_use]
pub fn locate_in_polygon(p: &Point2, shell: &[Point2], holes: &[Vec<Point2>]) -> Location {
    match locate_in_ring(p, shell) {
        Location::Inside => {}
        other => return other,
    }
    for hole in holes {
        match locate_in_ring(p, hole) {
            Location::Outside => {}
            Location::Inside => return Location::Outside,
            Location::Boundary => return Location::Boundary,
        }
    }
    Location::Inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Point2> {
        vec![
            p(x0, y0),
            p(x0 + size, y0),
            p(x0 + size, y0 + size),
            p(x0, y0 + size),
            p(x0, y0),
        ]
    }

    #[test]
    fn signed_area_ccw_square() {
        let area = signed_area_2d(&square(0.0, 0.0, 1.0));
        assert!((area - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_cw_square() {
        let mut ring = square(0.0, 0.0, 1.0);
        ring.reverse();
        let area = signed_area_2d(&ring);
        assert!((area + 1.0).abs() < TOLERANCE);
        assert!(!is_ccw(&ring));
    }

    #[test]
    fn signed_area_degenerate() {
        assert!((signed_area_2d(&[p(0.0, 0.0)])).abs() < TOLERANCE);
        assert!((signed_area_2d(&[])).abs() < TOLERANCE);
    }

    #[test]
    fn ring_location() {
        let ring = square(0.0, 0.0, 10.0);
        assert_eq!(locate_in_ring(&p(5.0, 5.0), &ring), Location::Inside);
        assert_eq!(locate_in_ring(&p(15.0, 5.0), &ring), Location::Outside);
        assert_eq!(locate_in_ring(&p(10.0, 5.0), &ring), Location::Boundary);
        assert_eq!(locate_in_ring(&p(0.0, 0.0), &ring), Location::Boundary);
    }

    #[test]
    fn polygon_hole_excludes_point() {
        let shell = square(0.0, 0.0, 10.0);
        let holes = vec![square(2.0, 2.0, 2.0)];
        assert_eq!(locate_in_polygon(&p(3.0, 3.0), &shell, &holes), Location::Outside);
        assert_eq!(locate_in_polygon(&p(6.0, 6.0), &shell, &holes), Location::Inside);
        assert_eq!(locate_in_polygon(&p(2.0, 3.0), &shell, &holes), Location::Boundary);
    }

    #[test]
    fn crossing_number_counts_vertex_once() {
        // Ray passes exactly through the vertex at (10, 5).
        let ring = vec![p(0.0, 0.0), p(10.0, 5.0), p(0.0, 10.0), p(0.0, 0.0)];
        assert_eq!(crossing_number(&p(1.0, 5.0), &ring), 1);
    }
}
