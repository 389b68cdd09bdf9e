use crate::error::Result;
use crate::geometry::{LineString, Polygon};
use crate::math::distance_2d::{
    linestring_linestring_dist, point_to_linestring_dist, project_on_linestring, LineProjection,
};
use crate::math::intersect_2d::linestring_is_simple;
use crate::math::polygon_2d::{locate_in_ring, Location};
use crate::math::{Point2, TOLERANCE};

use super::{noding, relate, snap, surface, GeometryEngine, LineRelation};

/// Geometry kernel over linear 2D geometry with `f64` coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarEngine {
    /// Distance under which a point counts as lying on a line.
    pub epsilon: f64,
}

impl PlanarEngine {
    #[must_use]
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }
}

impl Default for PlanarEngine {
    fn default() -> Self {
        Self { epsilon: TOLERANCE }
    }
}

impl GeometryEngine for PlanarEngine {
    fn is_simple(&self, line: &LineString) -> bool {
        linestring_is_simple(line.points())
    }

    fn relate_lines(&self, a: &LineString, b: &LineString) -> LineRelation {
        relate::relate_lines(a, b, self.epsilon)
    }

    fn lines_equal(&self, a: &LineString, b: &LineString) -> bool {
        relate::lines_equal(a, b, self.epsilon)
    }

    fn line_interior_contains(&self, line: &LineString, p: &Point2) -> bool {
        if point_to_linestring_dist(p, line.points()) > self.epsilon {
            return false;
        }
        let on_end = |q: Option<&Point2>| q.is_some_and(|q| (q - p).norm() <= self.epsilon);
        !on_end(line.first()) && !on_end(line.last())
    }

    fn distance_point_line(&self, p: &Point2, line: &LineString) -> f64 {
        point_to_linestring_dist(p, line.points())
    }

    fn distance_line_line(&self, a: &LineString, b: &LineString) -> f64 {
        linestring_linestring_dist(a.points(), b.points())
    }

    fn closest_point_on_line(&self, p: &Point2, line: &LineString) -> Option<LineProjection> {
        project_on_linestring(p, line.points())
    }

    fn split_line(&self, line: &LineString, p: &Point2) -> Option<(LineString, LineString)> {
        let pr = project_on_linestring(p, line.points())?;
        if pr.distance > self.epsilon {
            return None;
        }
        let pts = line.points();
        let n = pts.len();
        if n < 2 || pts.first() == Some(p) || pts.last() == Some(p) {
            return None;
        }
        let (head_len, tail_from) = if pr.t == 0.0 || pr.t == 1.0 {
            // On a vertex: `p` takes its place.
            let v = if pr.t == 0.0 { pr.segment } else { pr.segment + 1 };
            if v == 0 || v == n - 1 {
                return None;
            }
            (v, v + 1)
        } else {
            (pr.segment + 1, pr.segment + 1)
        };
        let mut head = pts[..head_len].to_vec();
        head.push(*p);
        let mut tail = vec![*p];
        tail.extend_from_slice(&pts[tail_from..]);
        Some((LineString::new(head), LineString::new(tail)))
    }

    fn locate_in_ring(&self, p: &Point2, ring: &[Point2]) -> Location {
        locate_in_ring(p, ring)
    }

    fn locate_in_polygon(&self, p: &Point2, polygon: &Polygon) -> Location {
        polygon.locate(p)
    }

    fn point_on_surface(&self, polygon: &Polygon) -> Result<Option<Point2>> {
        surface::point_on_surface(polygon)
    }

    fn node_lines(
        &self,
        lines: &[LineString],
        cutters: &[LineString],
        cut_points: &[Point2],
    ) -> Vec<LineString> {
        noding::node_lines(lines, cutters, cut_points)
    }

    fn snap_line(&self, line: &LineString, targets: &[LineString], tolerance: f64) -> LineString {
        snap::snap_line(line, targets, tolerance)
    }
}
