use crate::geometry::LineString;
use crate::math::distance_2d::point_to_linestring_dist;
use crate::math::intersect_2d::{segment_intersection, SegmentIntersection};
use crate::math::Point2;

use super::LineRelation;

/// Returns `true` if `p` is on the boundary of `line`: one of its endpoints.
/// The closing vertex of a closed line counts as boundary too.
fn on_boundary(line: &LineString, p: &Point2, epsilon: f64) -> bool {
    let near = |q: Option<&Point2>| q.is_some_and(|q| (q - p).norm() <= epsilon);
    near(line.first()) || near(line.last())
}

/// Every vertex and segment midpoint of `a` lies on `b`.
fn covered_by(a: &LineString, b: &LineString, epsilon: f64) -> bool {
    let pts = a.points();
    pts.iter()
        .all(|p| point_to_linestring_dist(p, b.points()) <= epsilon)
        && pts.windows(2).all(|s| {
            let mid = Point2::from((s[0].coords + s[1].coords) * 0.5);
            point_to_linestring_dist(&mid, b.points()) <= epsilon
        })
}

pub(super) fn lines_equal(a: &LineString, b: &LineString, epsilon: f64) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    covered_by(a, b, epsilon) && covered_by(b, a, epsilon)
}

pub(super) fn relate_lines(a: &LineString, b: &LineString, epsilon: f64) -> LineRelation {
    if lines_equal(a, b, epsilon) {
        return LineRelation::Equal;
    }
    let mut crosses = false;
    for sa in a.points().windows(2) {
        for sb in b.points().windows(2) {
            match segment_intersection(&sa[0], &sa[1], &sb[0], &sb[1]) {
                SegmentIntersection::None => {}
                SegmentIntersection::Overlap(..) => return LineRelation::Overlap,
                SegmentIntersection::Point(c) => {
                    if !on_boundary(a, &c.point, epsilon) && !on_boundary(b, &c.point, epsilon) {
                        crosses = true;
                    }
                }
            }
        }
    }
    if crosses {
        LineRelation::Cross
    } else {
        LineRelation::Disjoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-10;

    fn line(coords: &[(f64, f64)]) -> LineString {
        LineString::from_coords(coords)
    }

    #[test]
    fn endpoint_contact_is_disjoint() {
        let a = line(&[(0.0, 0.0), (10.0, 0.0)]);
        let b = line(&[(10.0, 0.0), (10.0, 10.0)]);
        assert_eq!(relate_lines(&a, &b, EPS), LineRelation::Disjoint);
    }

    #[test]
    fn t_junction_on_interior_crosses() {
        // b ends on a's interior: a's interior meets b's boundary only.
        let a = line(&[(0.0, 0.0), (10.0, 0.0)]);
        let b = line(&[(5.0, 0.0), (5.0, 10.0)]);
        assert_eq!(relate_lines(&a, &b, EPS), LineRelation::Disjoint);
        let c = line(&[(5.0, -5.0), (5.0, 5.0)]);
        assert_eq!(relate_lines(&a, &c, EPS), LineRelation::Cross);
    }

    #[test]
    fn collinear_overlap() {
        let a = line(&[(0.0, 0.0), (10.0, 0.0)]);
        let b = line(&[(5.0, 0.0), (15.0, 0.0)]);
        assert_eq!(relate_lines(&a, &b, EPS), LineRelation::Overlap);
    }

    #[test]
    fn equal_regardless_of_direction_and_vertices() {
        let a = line(&[(0.0, 0.0), (10.0, 0.0)]);
        let b = line(&[(10.0, 0.0), (4.0, 0.0), (0.0, 0.0)]);
        assert_eq!(relate_lines(&a, &b, EPS), LineRelation::Equal);
        assert!(lines_equal(&a, &b, EPS));
        let c = line(&[(0.0, 0.0), (9.0, 0.0)]);
        assert!(!lines_equal(&a, &c, EPS));
    }

    #[test]
    fn closing_vertex_is_boundary() {
        let ring = line(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 0.0)]);
        let spoke = line(&[(0.0, 0.0), (-5.0, -5.0)]);
        assert_eq!(relate_lines(&ring, &spoke, EPS), LineRelation::Disjoint);
        // Touching only the closing vertex is boundary contact.
        let touch = line(&[(-1.0, 1.0), (1.0, -1.0)]);
        assert_eq!(relate_lines(&ring, &touch, EPS), LineRelation::Disjoint);
        let through = line(&[(5.0, -1.0), (5.0, 1.0)]);
        assert_eq!(relate_lines(&ring, &through, EPS), LineRelation::Cross);
    }

    #[test]
    fn loops_sharing_their_node_are_disjoint() {
        let a = line(&[(0.0, 0.0), (5.0, 0.0), (5.0, 5.0), (0.0, 0.0)]);
        let b = line(&[(0.0, 0.0), (-5.0, 0.0), (-5.0, -5.0), (0.0, 0.0)]);
        assert_eq!(relate_lines(&a, &b, EPS), LineRelation::Disjoint);
    }
}
