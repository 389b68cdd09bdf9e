use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::backend::TopologyBackend;
use crate::engine::GeometryEngine;
use crate::error::{GeometryError, Result, TopologyError};
use crate::geometry::{Aabb, LineString};
use crate::math::polygon_2d::{is_ccw, Location};
use crate::math::Point2;
use crate::operations::query::{append_oriented, GetRingEdges};
use crate::topology::{
    Edge, EdgeFields, ElementId, Face, Node, NodeFields, OrientedEdge, Topology,
    UNIVERSE_FACE,
};

/// Result of trying to close a face on one side of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FaceSplit {
    /// The walk came back along the other side of the edge: no ring.
    NoRing,
    /// No face was created: the side is the universe, or only the bounding
    /// box was refreshed.
    Skipped,
    /// A face was created with this id.
    Created(ElementId),
}

/// A vertex of `edge` that is neither endpoint, or the midpoint of a
/// straight edge.
pub(crate) fn interior_edge_point(edge: &LineString) -> Option<Point2> {
    let (first, last) = (edge.first()?, edge.last()?);
    if edge.len() < 2 {
        return None;
    }
    let pts = edge.points();
    if let Some(p) = pts[1..pts.len() - 1]
        .iter()
        .find(|p| *p != first && *p != last)
    {
        return Some(*p);
    }
    if first == last {
        return None;
    }
    Some(Point2::new(
        first.x + (last.x - first.x) * 0.5,
        first.y + (last.y - first.y) * 0.5,
    ))
}

/// Creates a face on the left of `side` when its ring closes, taking over
/// from `face` the edges and isolated nodes that end up inside it.
///
/// With `mbr_only`, no face is created; the bounding box of `face` is
/// refreshed from the ring instead.
pub(crate) fn add_face_split<B: TopologyBackend, G: GeometryEngine>(
    topo: &mut Topology<B, G>,
    side: OrientedEdge,
    face: ElementId,
    mbr_only: bool,
) -> Result<FaceSplit> {
    let ring = GetRingEdges::new(side, None).execute(topo)?;
    if ring.contains(&side.reversed()) {
        trace!(edge = %side, "edge does not close a ring");
        return Ok(FaceSplit::NoRing);
    }

    let mut ids: Vec<ElementId> = ring.iter().map(|o| o.edge).collect();
    ids.sort_unstable();
    ids.dedup();
    let ring_edges = topo.edges_by_id(&ids, EdgeFields::ID | EdgeFields::GEOM)?;
    if ring_edges.len() != ids.len() {
        return Err(TopologyError::UnexpectedCount {
            what: "ring edge",
            count: ring_edges.len(),
            expected: ids.len(),
        }
        .into());
    }

    let mut shell: Vec<Point2> = Vec::new();
    for o in &ring {
        let edge = ring_edges
            .iter()
            .find(|e| e.id == o.edge)
            .ok_or(TopologyError::CouldNotFindEdge(o.edge))?;
        append_oriented(&mut shell, edge, o.forward);
    }
    let ccw = is_ccw(&shell);
    let shell_box = Aabb::from_points(&shell).ok_or(GeometryError::Empty("face ring"))?;

    if face == UNIVERSE_FACE && !ccw {
        trace!(edge = %side, "left of ring is the universe");
        return Ok(FaceSplit::Skipped);
    }

    if mbr_only && face != UNIVERSE_FACE {
        if ccw {
            let n = topo.backend_mut().update_faces_by_id(&[Face {
                id: face,
                mbr: Some(shell_box),
            }])?;
            if n != 1 {
                return Err(TopologyError::UnexpectedCount {
                    what: "updated face",
                    count: n,
                    expected: 1,
                }
                .into());
            }
        }
        return Ok(FaceSplit::Skipped);
    }

    // A clockwise ring inside a real face cuts a hole: the new face is
    // what lies outside it.
    let new_outside = face != UNIVERSE_FACE && !ccw;
    let mbr = if new_outside {
        topo.face(face)?.mbr
    } else {
        Some(shell_box)
    };
    let mut inserted = [Face::new(mbr)];
    topo.backend_mut().insert_faces(&mut inserted)?;
    let new_face = inserted[0].id;

    let engine = topo.engine();
    let moves_over = |p: &Point2| {
        let inside = engine.locate_in_ring(p, &shell) == Location::Inside;
        inside != new_outside
    };

    let ring_set: FxHashSet<OrientedEdge> = ring.iter().copied().collect();
    let candidates = topo.backend().get_edge_by_face(
        &[face],
        EdgeFields::ID | EdgeFields::FACE_LEFT | EdgeFields::FACE_RIGHT | EdgeFields::GEOM,
        mbr.as_ref(),
    )?;
    let mut left_updates = Vec::new();
    let mut right_updates = Vec::new();
    for e in &candidates {
        let fwd = ring_set.contains(&OrientedEdge::forward(e.id));
        let bwd = ring_set.contains(&OrientedEdge::backward(e.id));
        if fwd || bwd {
            if fwd {
                left_updates.push(e.id);
            }
            if bwd {
                right_updates.push(e.id);
            }
            continue;
        }
        let sample = interior_edge_point(&e.geom).ok_or_else(|| {
            GeometryError::Degenerate(format!("no interior point for edge {}", e.id))
        })?;
        if !moves_over(&sample) {
            continue;
        }
        if e.face_left == face {
            left_updates.push(e.id);
        }
        if e.face_right == face {
            right_updates.push(e.id);
        }
    }

    let isolated = topo
        .backend()
        .get_node_by_face(&[face], NodeFields::ID | NodeFields::GEOM, mbr.as_ref())?;
    let moved_nodes: Vec<Node> = isolated
        .iter()
        .filter(|n| moves_over(&n.geom))
        .map(|n| Node {
            id: n.id,
            containing_face: Some(new_face),
            geom: n.geom,
        })
        .collect();

    let backend = topo.backend_mut();
    for (ids, field) in [
        (&left_updates, EdgeFields::FACE_LEFT),
        (&right_updates, EdgeFields::FACE_RIGHT),
    ] {
        if ids.is_empty() {
            continue;
        }
        let updates: Vec<Edge> = ids
            .iter()
            .map(|&id| Edge {
                id,
                face_left: new_face,
                face_right: new_face,
                ..Edge::default()
            })
            .collect();
        let n = backend.update_edges_by_id(&updates, field)?;
        if n != updates.len() {
            return Err(TopologyError::UnexpectedCount {
                what: "updated edge",
                count: n,
                expected: updates.len(),
            }
            .into());
        }
    }
    if !moved_nodes.is_empty() {
        backend.update_nodes_by_id(&moved_nodes, NodeFields::CONTAINING_FACE)?;
    }

    debug!(
        edge = %side,
        face,
        new_face,
        outside = new_outside,
        left = left_updates.len(),
        right = right_updates.len(),
        nodes = moved_nodes.len(),
        "split face"
    );
    Ok(FaceSplit::Created(new_face))
}
