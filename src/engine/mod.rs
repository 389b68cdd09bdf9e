//! Geometry kernel used by the topology operations.
//!
//! Operations never compute geometric predicates directly: they go through a
//! [`GeometryEngine`] injected into the [`Topology`](crate::topology::Topology)
//! handle. [`PlanarEngine`] is the native implementation over linear 2D
//! geometry.

mod noding;
mod planar;
mod relate;
mod snap;
mod surface;

pub use planar::PlanarEngine;

use crate::error::Result;
use crate::geometry::{LineString, Polygon};
use crate::math::distance_2d::LineProjection;
use crate::math::polygon_2d::Location;
use crate::math::Point2;

/// How the interiors of two lines meet, under the endpoint boundary rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRelation {
    /// Interiors do not meet; the lines may still touch at endpoints.
    Disjoint,
    /// Same point set.
    Equal,
    /// Interiors share a stretch of positive length.
    Overlap,
    /// Interiors meet at isolated points.
    Cross,
}

/// Capability set of the geometry kernel.
pub trait GeometryEngine {
    /// Returns `true` if `line` has no self-intersection other than a closed
    /// line's shared endpoint.
    fn is_simple(&self, line: &LineString) -> bool;

    /// Relates the interiors of two lines.
    fn relate_lines(&self, a: &LineString, b: &LineString) -> LineRelation;

    /// Returns `true` if both lines cover the same point set.
    fn lines_equal(&self, a: &LineString, b: &LineString) -> bool;

    /// Returns `true` if `p` lies on `line` but is not one of its boundary
    /// endpoints. The closing vertex of a closed line is boundary.
    fn line_interior_contains(&self, line: &LineString, p: &Point2) -> bool;

    fn distance_point_line(&self, p: &Point2, line: &LineString) -> f64;

    fn distance_line_line(&self, a: &LineString, b: &LineString) -> f64;

    /// Projects `p` on `line`.
    fn closest_point_on_line(&self, p: &Point2, line: &LineString) -> Option<LineProjection>;

    /// Splits `line` at `p`, which becomes the last vertex of the first part
    /// and the first vertex of the second.
    ///
    /// Returns `None` when `p` is not on the line or lies on one of its
    /// endpoints.
    fn split_line(&self, line: &LineString, p: &Point2) -> Option<(LineString, LineString)>;

    /// Locates `p` relative to a closed ring.
    fn locate_in_ring(&self, p: &Point2, ring: &[Point2]) -> Location;

    /// Locates `p` relative to a polygon.
    fn locate_in_polygon(&self, p: &Point2, polygon: &Polygon) -> Location;

    /// A point guaranteed to lie in the interior of `polygon`, `None` for an
    /// empty or collapsed polygon.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon cannot be triangulated.
    fn point_on_surface(&self, polygon: &Polygon) -> Result<Option<Point2>>;

    /// Nodes `lines` against each other and against `cutters`.
    ///
    /// Returns the linework of `lines` only, split wherever it meets itself,
    /// another input line, a cutter or one of `cut_points`. Pieces shared by
    /// several input lines appear once.
    fn node_lines(
        &self,
        lines: &[LineString],
        cutters: &[LineString],
        cut_points: &[Point2],
    ) -> Vec<LineString>;

    /// Snaps `line` to the vertices of `targets` within `tolerance`, then
    /// inserts target vertices lying within `tolerance` of a segment. Repeats
    /// until the vertex count is stable.
    fn snap_line(&self, line: &LineString, targets: &[LineString], tolerance: f64) -> LineString;
}
