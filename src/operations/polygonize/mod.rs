//! Bulk face construction over linked edges.
//!
//! [`Polygonize`] walks every edge side once, registering a face for each
//! counter-clockwise ring and attaching each clockwise ring (a hole) to the
//! smallest shell around it, or to the universal face.

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, trace};

use crate::backend::TopologyBackend;
use crate::engine::GeometryEngine;
use crate::error::{GeometryError, Result, TopologyError};
use crate::geometry::Aabb;
use crate::math::polygon_2d::{is_ccw, Location};
use crate::math::Point2;
use crate::operations::query::append_oriented;
use crate::topology::{
    Edge, EdgeFields, ElementId, Face, FaceFields, OrientedEdge, Topology, UNIVERSE_FACE,
};

new_key_type! {
    struct RingKey;
}

/// A closed walk of edge sides.
struct EdgeRing {
    sides: Vec<OrientedEdge>,
    points: Vec<Point2>,
    bbox: Aabb,
    /// Face registered for a shell; `None` for a hole.
    face: Option<ElementId>,
}

impl EdgeRing {
    /// First vertex of the first edge, as stored.
    fn sample(&self, edges: &[Edge], index: &FxHashMap<ElementId, usize>) -> Option<Point2> {
        let first = self.sides.first()?;
        let edge = &edges[*index.get(&first.edge)?];
        edge.geom.first().copied()
    }
}

/// Walks the ring on the left of `start` through the in-memory edges.
fn build_ring(
    edges: &[Edge],
    index: &FxHashMap<ElementId, usize>,
    start: OrientedEdge,
) -> Result<(Vec<OrientedEdge>, Vec<Point2>)> {
    let limit = edges.len() * 2;
    let mut sides = Vec::new();
    let mut points = Vec::new();
    let mut cur = start;
    loop {
        let edge = index
            .get(&cur.edge)
            .map(|&i| &edges[i])
            .ok_or(TopologyError::CouldNotFindEdge(cur.edge))?;
        sides.push(cur);
        append_oriented(&mut points, edge, cur.forward);
        cur = edge.next(cur.forward);
        if cur == start {
            return Ok((sides, points));
        }
        if sides.len() >= limit {
            return Err(TopologyError::RingWalkLimit {
                start: start.signed(),
                limit,
            }
            .into());
        }
    }
}

/// Sets the face of every side of `ring`.
fn assign_ring_face<B: TopologyBackend>(
    backend: &mut B,
    ring: &EdgeRing,
    face: ElementId,
) -> Result<()> {
    let updates = |forward: bool| -> Vec<Edge> {
        ring.sides
            .iter()
            .filter(|s| s.forward == forward)
            .map(|s| Edge {
                id: s.edge,
                face_left: face,
                face_right: face,
                ..Edge::default()
            })
            .collect()
    };
    let left = updates(true);
    if !left.is_empty() {
        backend.update_edges_by_id(&left, EdgeFields::FACE_LEFT)?;
    }
    let right = updates(false);
    if !right.is_empty() {
        backend.update_edges_by_id(&right, EdgeFields::FACE_RIGHT)?;
    }
    Ok(())
}

/// Creates every face of a topology whose edges are linked but carry no
/// face yet.
///
/// Isolated nodes keep their containing face; existing face records are
/// never removed.
pub struct Polygonize;

impl Polygonize {
    /// Creates a new `Polygonize` operation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the operation, returning the number of faces created.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::FacesAlreadyExist`] if any face exists,
    /// [`TopologyError::CouldNotFindEdge`] if a link points at a missing
    /// edge, or [`TopologyError::RingWalkLimit`] if a ring never closes.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &mut Topology<B, G>,
    ) -> Result<usize> {
        let backend = topo.backend();
        if !backend
            .get_face_within_box(None, FaceFields::ID, Some(1))?
            .is_empty()
        {
            return Err(TopologyError::FacesAlreadyExist.into());
        }
        let mut edges = backend.get_edge_within_box(None, EdgeFields::ALL, None)?;
        if edges.is_empty() {
            return Ok(0);
        }
        edges.sort_unstable_by_key(|e| e.id);
        let index: FxHashMap<ElementId, usize> =
            edges.iter().enumerate().map(|(i, e)| (e.id, i)).collect();

        // ── rings ──
        let mut rings: SlotMap<RingKey, EdgeRing> = SlotMap::with_key();
        let mut visited: FxHashSet<OrientedEdge> = FxHashSet::default();
        let mut created = 0;
        for edge in &edges {
            for side in [OrientedEdge::forward(edge.id), OrientedEdge::backward(edge.id)] {
                if visited.contains(&side) {
                    continue;
                }
                let (sides, points) = build_ring(&edges, &index, side)?;
                visited.extend(sides.iter().copied());
                let bbox = Aabb::from_points(&points).ok_or(GeometryError::Empty("edge ring"))?;
                let mut ring = EdgeRing {
                    sides,
                    points,
                    bbox,
                    face: None,
                };
                if is_ccw(&ring.points) {
                    let mut face = [Face::new(Some(bbox))];
                    topo.backend_mut().insert_faces(&mut face)?;
                    assign_ring_face(topo.backend_mut(), &ring, face[0].id)?;
                    ring.face = Some(face[0].id);
                    created += 1;
                }
                trace!(start = %side, face = ?ring.face, "registered ring");
                rings.insert(ring);
            }
        }

        // ── holes ──
        let engine = topo.engine();
        let mut assignments = Vec::new();
        for (_, hole) in rings.iter().filter(|(_, r)| r.face.is_none()) {
            let Some(sample) = hole.sample(&edges, &index) else {
                continue;
            };
            let hole_edge = hole.sides.first().map(|s| s.edge);
            let mut found: Option<(ElementId, &Aabb)> = None;
            for (_, shell) in rings.iter() {
                let Some(face) = shell.face else { continue };
                if shell.sides.first().map(|s| s.edge) == hole_edge
                    || shell.bbox == hole.bbox
                    || !shell.bbox.contains(&hole.bbox)
                {
                    continue;
                }
                if found.is_some_and(|(_, env)| !env.contains(&shell.bbox)) {
                    continue;
                }
                if engine.locate_in_ring(&sample, &shell.points) != Location::Outside {
                    found = Some((face, &shell.bbox));
                }
            }
            let face = found.map_or(UNIVERSE_FACE, |(f, _)| f);
            assignments.push((hole, face));
        }
        let holes = assignments.len();
        for (hole, face) in assignments {
            assign_ring_face(topo.backend_mut(), hole, face)?;
        }

        debug!(faces = created, holes, "polygonized");
        Ok(created)
    }
}

impl Default for Polygonize {
    fn default() -> Self {
        Self::new()
    }
}
