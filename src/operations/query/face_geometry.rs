use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use crate::backend::TopologyBackend;
use crate::engine::GeometryEngine;
use crate::error::{Result, TopologyError};
use crate::geometry::Polygon;
use crate::math::polygon_2d::signed_area_2d;
use crate::math::Point2;
use crate::topology::{Edge, EdgeFields, ElementId, FaceFields, OrientedEdge, Topology, UNIVERSE_FACE};

/// One boundary ring of a face: the oriented edges walked with the face on
/// their left, and the closed vertex ring they trace.
#[derive(Debug, Clone)]
pub(crate) struct FaceRing {
    pub edges: Vec<OrientedEdge>,
    pub points: Vec<Point2>,
}

impl FaceRing {
    fn area(&self) -> f64 {
        signed_area_2d(&self.points)
    }

    /// Rotates the edge list so the smallest edge id comes first.
    fn canonical_edges(&self) -> Vec<OrientedEdge> {
        let mut out = self.edges.clone();
        if let Some(idx) = (0..out.len()).min_by_key(|&i| out[i].edge) {
            out.rotate_left(idx);
        }
        out
    }
}

/// Appends the vertices of `edge` walked in the given direction, sharing the
/// joint vertex with what is already there.
pub(crate) fn append_oriented(points: &mut Vec<Point2>, edge: &Edge, forward: bool) {
    let pts = edge.geom.points();
    let skip = usize::from(!points.is_empty());
    if forward {
        points.extend(pts.iter().skip(skip).copied());
    } else {
        points.extend(pts.iter().rev().skip(skip).copied());
    }
}

/// Walks every boundary ring of `face` through the next links of `edges`.
///
/// `edges` must hold every edge with `face` on a side. Edges with `face` on
/// both sides are walked through but do not show up in the rings.
pub(crate) fn face_rings(edges: &[Edge], face: ElementId) -> Result<Vec<FaceRing>> {
    let by_id: FxHashMap<ElementId, &Edge> = edges.iter().map(|e| (e.id, e)).collect();
    let mut ordered: Vec<&Edge> = edges.iter().collect();
    ordered.sort_by_key(|e| e.id);

    let limit = edges.len() * 2;
    let mut visited: FxHashSet<OrientedEdge> = FxHashSet::default();
    let mut rings = Vec::new();
    for e in ordered {
        if e.is_dangling() {
            continue;
        }
        for forward in [true, false] {
            let start = OrientedEdge::new(e.id, forward);
            if e.face_on(forward) != face || visited.contains(&start) {
                continue;
            }
            rings.push(walk_face_ring(&by_id, start, limit, &mut visited)?);
        }
    }
    Ok(rings)
}

fn walk_face_ring(
    by_id: &FxHashMap<ElementId, &Edge>,
    start: OrientedEdge,
    limit: usize,
    visited: &mut FxHashSet<OrientedEdge>,
) -> Result<FaceRing> {
    let mut edges = Vec::new();
    let mut points = Vec::new();
    let mut cur = start;
    for _ in 0..limit {
        let edge = by_id
            .get(&cur.edge)
            .ok_or(TopologyError::CouldNotFindEdge(cur.edge))?;
        if !edge.is_dangling() {
            visited.insert(cur);
            edges.push(cur);
            append_oriented(&mut points, edge, cur.forward);
        }
        cur = edge.next(cur.forward);
        if cur == start {
            if points.first() != points.last() {
                if let Some(&first) = points.first() {
                    points.push(first);
                }
            }
            return Ok(FaceRing { edges, points });
        }
    }
    Err(TopologyError::RingWalkLimit {
        start: start.signed(),
        limit,
    }
    .into())
}

/// Separates the shell of a face from its holes.
///
/// Rings keep the face on their left, so the shell winds counterclockwise and
/// holes clockwise. Of several counterclockwise rings the largest wins.
pub(crate) fn shell_and_holes(mut rings: Vec<FaceRing>) -> (Option<FaceRing>, Vec<FaceRing>) {
    let mut shell: Option<FaceRing> = None;
    let mut holes = Vec::new();
    for ring in rings.drain(..) {
        let area = ring.area();
        if area > 0.0 {
            match &shell {
                Some(s) if s.area() >= area => {
                    warn!(edges = ring.edges.len(), "dropping extra shell ring");
                }
                _ => {
                    if let Some(old) = shell.replace(ring) {
                        warn!(edges = old.edges.len(), "dropping extra shell ring");
                    }
                }
            }
        } else {
            holes.push(ring);
        }
    }
    holes.sort_by_key(|r| r.edges.iter().map(|oe| oe.edge).min());
    (shell, holes)
}

/// Assembles the polygon of `face` from the edges bounding it.
///
/// Returns the empty polygon when no ring can be walked.
///
/// # Errors
///
/// Returns an error if a linked edge is missing from `edges` or a ring walk
/// does not close.
pub fn build_face_polygon(edges: &[Edge], face: ElementId) -> Result<Polygon> {
    let (shell, holes) = shell_and_holes(face_rings(edges, face)?);
    let Some(shell) = shell else {
        if !edges.is_empty() {
            warn!(face, "face has edges but no shell ring");
        }
        return Ok(Polygon::empty());
    };
    Ok(Polygon::new(
        shell.points,
        holes.into_iter().map(|h| h.points).collect(),
    ))
}

const FACE_EDGE_FIELDS: EdgeFields = EdgeFields::ALL;

/// Returns the polygon of a face.
pub struct GetFaceGeometry {
    face: ElementId,
}

impl GetFaceGeometry {
    /// Creates a new `GetFaceGeometry` query.
    #[must_use]
    pub fn new(face: ElementId) -> Self {
        Self { face }
    }

    /// Executes the query.
    ///
    /// A face record without boundary edges yields the empty polygon.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::UniversalFaceHasNoGeometry`] for face 0,
    /// [`TopologyError::NonExistentFace`] for an unknown face, or an error if
    /// the boundary cannot be walked.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &Topology<B, G>,
    ) -> Result<Polygon> {
        if self.face == UNIVERSE_FACE {
            return Err(TopologyError::UniversalFaceHasNoGeometry.into());
        }
        let edges = topo
            .backend()
            .get_edge_by_face(&[self.face], FACE_EDGE_FIELDS, None)?;
        if edges.is_empty() {
            let faces = topo.backend().get_face_by_id(&[self.face], FaceFields::ID)?;
            return match faces.len() {
                0 => Err(TopologyError::NonExistentFace(self.face).into()),
                1 => Ok(Polygon::empty()),
                n => Err(TopologyError::UnexpectedCount {
                    what: "face",
                    count: n,
                    expected: 1,
                }
                .into()),
            };
        }
        build_face_polygon(&edges, self.face)
    }
}

/// Lists the oriented edges bounding a face.
///
/// The shell comes first, then each hole. Every ring starts at its smallest
/// edge id, and edges are oriented with the face on their left.
pub struct GetFaceEdges {
    face: ElementId,
}

impl GetFaceEdges {
    /// Creates a new `GetFaceEdges` query.
    #[must_use]
    pub fn new(face: ElementId) -> Self {
        Self { face }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::FaceWithoutEdges`] if edges reference the
    /// face but none of them bounds it, or an error if the boundary cannot be
    /// walked.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &Topology<B, G>,
    ) -> Result<Vec<OrientedEdge>> {
        let edges = topo
            .backend()
            .get_edge_by_face(&[self.face], FACE_EDGE_FIELDS, None)?;
        if edges.is_empty() {
            return Ok(Vec::new());
        }
        let (shell, holes) = shell_and_holes(face_rings(&edges, self.face)?);
        if shell.is_none() && holes.is_empty() {
            return Err(TopologyError::FaceWithoutEdges(self.face).into());
        }
        let out: Vec<OrientedEdge> = shell
            .iter()
            .chain(holes.iter())
            .flat_map(FaceRing::canonical_edges)
            .collect();
        debug!(face = self.face, edges = out.len(), "collected face edges");
        Ok(out)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::LineString;
    use crate::math::polygon_2d::Location;

    fn edge(id: ElementId, coords: &[(f64, f64)], fl: ElementId, fr: ElementId, nl: i64, nr: i64) -> Edge {
        Edge {
            id,
            start_node: 0,
            end_node: 0,
            face_left: fl,
            face_right: fr,
            next_left: nl,
            next_right: nr,
            geom: LineString::from_coords(coords),
        }
    }

    /// Square 0..10 split in two edges, face 1 inside, with a dangling
    /// spike (edge 3) from (0,0) into the face.
    fn square_with_spike() -> Vec<Edge> {
        vec![
            edge(1, &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)], 1, 0, 2, -2),
            edge(2, &[(10.0, 10.0), (0.0, 10.0), (0.0, 0.0)], 1, 0, 3, -1),
            edge(3, &[(0.0, 0.0), (2.0, 2.0)], 1, 1, -3, 1),
        ]
    }

    #[test]
    fn ring_walk_skips_dangling_edges() {
        let edges = square_with_spike();
        let rings = face_rings(&edges, 1).unwrap();
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].edges, vec![OrientedEdge::forward(1), OrientedEdge::forward(2)]);
        assert_eq!(rings[0].points.len(), 5);
    }

    #[test]
    fn polygon_of_square() {
        let poly = build_face_polygon(&square_with_spike(), 1).unwrap();
        assert!((poly.area() - 100.0).abs() < 1e-9);
        assert!(poly.interiors.is_empty());
        assert_eq!(poly.locate(&Point2::new(5.0, 5.0)), Location::Inside);
    }

    #[test]
    fn universe_rings_are_holes_only() {
        let edges = square_with_spike();
        let outside: Vec<Edge> = edges.into_iter().filter(|e| e.id != 3).collect();
        let (shell, holes) = shell_and_holes(face_rings(&outside, 0).unwrap());
        assert!(shell.is_none());
        assert_eq!(holes.len(), 1);
        assert_eq!(holes[0].edges, vec![OrientedEdge::backward(1), OrientedEdge::backward(2)]);
        assert!(holes[0].area() < 0.0);
    }

    #[test]
    fn canonical_ring_starts_at_smallest_id() {
        let ring = FaceRing {
            edges: vec![
                OrientedEdge::forward(7),
                OrientedEdge::backward(3),
                OrientedEdge::forward(5),
            ],
            points: Vec::new(),
        };
        assert_eq!(
            ring.canonical_edges(),
            vec![
                OrientedEdge::backward(3),
                OrientedEdge::forward(5),
                OrientedEdge::forward(7)
            ]
        );
    }

    #[test]
    fn broken_link_is_reported() {
        let mut edges = square_with_spike();
        edges[1].next_left = 9;
        assert!(face_rings(&edges, 1).is_err());
    }
}
