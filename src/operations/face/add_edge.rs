use tracing::debug;

use crate::backend::TopologyBackend;
use crate::engine::GeometryEngine;
use crate::error::{GeometryError, Result, TopologyError};
use crate::geometry::LineString;
use crate::operations::edit::checks::check_edge_crossing;
use crate::topology::{Edge, EdgeFields, ElementId, Node, NodeFields, OrientedEdge, Topology};

use super::adjacency::{edge_ends, find_adjacent_edges};
use super::split::{add_face_split, FaceSplit};
use super::FaceMode;

/// Makes `link` point at `to`, on whichever side of its edge `link` walks.
///
/// `link` is the oriented edge preceding the new edge around a node: a
/// forward link continues on its left side, a backward one on its right.
fn relink_previous<B: TopologyBackend>(
    backend: &mut B,
    link: ElementId,
    to: ElementId,
) -> Result<()> {
    let select = Edge {
        id: link.abs(),
        ..Edge::default()
    };
    let (update, field) = if link > 0 {
        (
            Edge {
                next_left: to,
                ..Edge::default()
            },
            EdgeFields::NEXT_LEFT,
        )
    } else {
        (
            Edge {
                next_right: to,
                ..Edge::default()
            },
            EdgeFields::NEXT_RIGHT,
        )
    };
    backend.update_edges(&select, EdgeFields::ID, &update, field, None)?;
    Ok(())
}

/// Inserts an edge between two existing nodes, linking it into the rings
/// at both ends and splitting the face it closes according to `mode`.
pub(crate) fn add_edge<B: TopologyBackend, G: GeometryEngine>(
    topo: &mut Topology<B, G>,
    start_node: ElementId,
    end_node: ElementId,
    geom: &LineString,
    skip_checks: bool,
    mode: FaceMode,
) -> Result<ElementId> {
    if !skip_checks && !topo.engine().is_simple(geom) {
        return Err(GeometryError::NotSimple("curve").into());
    }
    let (mut span, mut epan) = edge_ends(geom)?;

    let mut face_left: Option<ElementId> = None;
    let mut face_right: Option<ElementId> = None;

    let ids: &[ElementId] = if start_node == end_node {
        &[start_node]
    } else {
        &[start_node, end_node]
    };
    let endpoints = topo.nodes_by_id(ids, NodeFields::ALL)?;
    for node in &endpoints {
        if let Some(f) = node.containing_face {
            match face_left {
                None => {
                    face_left = Some(f);
                    face_right = Some(f);
                }
                Some(l) if l != f => {
                    return Err(TopologyError::EndNodesInDifferentFaces(l, f).into());
                }
                Some(_) => {}
            }
        }
    }

    if !skip_checks {
        let find = |id: ElementId| {
            endpoints
                .iter()
                .find(|n| n.id == id)
                .ok_or(TopologyError::NonExistentNode(id))
        };
        let start = find(start_node)?;
        let end = find(end_node)?;
        if geom.first() != Some(&start.geom) {
            return Err(TopologyError::StartNodeMismatch.into());
        }
        if geom.last() != Some(&end.geom) {
            return Err(TopologyError::EndNodeMismatch.into());
        }
        check_edge_crossing(topo, start_node, end_node, geom, None)?;
    }

    let id = topo.backend_mut().next_edge_id()?;
    let closed = start_node == end_node;

    let epan_copy = epan;
    let start_found =
        find_adjacent_edges(topo, start_node, &mut span, closed.then_some(&epan_copy), None)? > 0;
    let (next_right, prev_left) = if start_found {
        if face_right.is_none() {
            face_right = span.cw_face;
        }
        if face_left.is_none() {
            face_left = span.ccw_face;
        }
        (
            span.next_cw.map_or(-id, OrientedEdge::signed),
            span.next_ccw.map_or(id, |o| -o.signed()),
        )
    } else if closed {
        (-id, id)
    } else {
        (id, -id)
    };

    let span_copy = span;
    let end_found =
        find_adjacent_edges(topo, end_node, &mut epan, closed.then_some(&span_copy), None)? > 0;
    let (next_left, prev_right) = if end_found {
        match face_right {
            None => face_right = epan.ccw_face.or(span.ccw_face),
            Some(r) if mode != FaceMode::Ignore && Some(r) != epan.ccw_face => {
                return Err(TopologyError::SideLocationConflict {
                    start: r,
                    end: epan.ccw_face.unwrap_or(-1),
                }
                .into());
            }
            Some(_) => {}
        }
        match face_left {
            // A closed edge can hide the neighbour on this side of its end.
            None => face_left = epan.cw_face.or(span.cw_face),
            Some(l) if mode != FaceMode::Ignore && Some(l) != epan.cw_face => {
                return Err(TopologyError::SideLocationConflict {
                    start: l,
                    end: epan.cw_face.unwrap_or(-1),
                }
                .into());
            }
            Some(_) => {}
        }
        (
            epan.next_cw.map_or(id, OrientedEdge::signed),
            epan.next_ccw.map_or(-id, |o| -o.signed()),
        )
    } else if closed {
        (id, -id)
    } else {
        (-id, id)
    };

    if face_left != face_right {
        return Err(TopologyError::LeftRightFaceMismatch {
            edge: id,
            left: face_left.unwrap_or(-1),
            right: face_right.unwrap_or(-1),
        }
        .into());
    }
    let face = match face_left {
        Some(f) => f,
        None if mode != FaceMode::Ignore => {
            return Err(TopologyError::CouldNotDeriveEdgeFace.into());
        }
        None => -1,
    };

    let mut edge = Edge::new(start_node, end_node, geom.clone());
    edge.id = id;
    edge.face_left = face;
    edge.face_right = face;
    edge.next_left = next_left;
    edge.next_right = next_right;

    let backend = topo.backend_mut();
    backend.insert_edges(&mut [edge])?;
    if prev_left.abs() != id {
        relink_previous(backend, prev_left, id)?;
    }
    if prev_right.abs() != id {
        relink_previous(backend, prev_right, -id)?;
    }

    let mut attached = Vec::with_capacity(2);
    if !start_found {
        attached.push(Node {
            id: start_node,
            ..Node::default()
        });
    }
    if !end_found && !closed {
        attached.push(Node {
            id: end_node,
            ..Node::default()
        });
    }
    if !attached.is_empty() {
        backend.update_nodes_by_id(&attached, NodeFields::CONTAINING_FACE)?;
    }

    debug!(edge = id, start_node, end_node, face, "added edge");

    if mode == FaceMode::Ignore || (!closed && (!start_found || !end_found)) {
        return Ok(id);
    }

    let mut replaced_by = None;
    if mode == FaceMode::Replace {
        match add_face_split(topo, OrientedEdge::backward(id), face, false)? {
            FaceSplit::NoRing => return Ok(id),
            FaceSplit::Created(f) => replaced_by = Some(f),
            FaceSplit::Skipped => {}
        }
    }

    let mut created = add_face_split(topo, OrientedEdge::forward(id), face, false)?;
    if mode == FaceMode::Modify {
        match created {
            FaceSplit::NoRing => return Ok(id),
            FaceSplit::Skipped => {
                // The left side is the universe: close the face on the right.
                created = add_face_split(topo, OrientedEdge::backward(id), face, false)?;
                if !matches!(created, FaceSplit::Created(_)) {
                    return Ok(id);
                }
            }
            FaceSplit::Created(_) => {
                add_face_split(topo, OrientedEdge::backward(id), face, true)?;
            }
        }
    }

    if face != 0 {
        let new_face = match created {
            FaceSplit::Created(f) => f,
            _ => -1,
        };
        let backend = topo.backend_mut();
        backend.update_topo_geom_face_split(face, new_face, replaced_by)?;
        if mode == FaceMode::Replace {
            backend.delete_faces_by_id(&[face])?;
        }
    }
    Ok(id)
}

/// Adds an edge; when it closes a ring, the split face keeps its id on one
/// side and a new face is created on the other.
pub struct AddEdgeModFace {
    start: ElementId,
    end: ElementId,
    geom: LineString,
    skip_checks: bool,
}

impl AddEdgeModFace {
    /// Creates a new `AddEdgeModFace` operation.
    #[must_use]
    pub fn new(start: ElementId, end: ElementId, geom: LineString, skip_checks: bool) -> Self {
        Self {
            start,
            end,
            geom,
            skip_checks,
        }
    }

    /// Executes the operation, returning the new edge id.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve is invalid, does not join the nodes or
    /// crosses the topology, or if the faces around its ends disagree.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &mut Topology<B, G>,
    ) -> Result<ElementId> {
        add_edge(topo, self.start, self.end, &self.geom, self.skip_checks, FaceMode::Modify)
    }
}

/// Adds an edge; when it closes a ring, the split face is replaced by two
/// new faces.
pub struct AddEdgeNewFaces {
    start: ElementId,
    end: ElementId,
    geom: LineString,
    skip_checks: bool,
}

impl AddEdgeNewFaces {
    /// Creates a new `AddEdgeNewFaces` operation.
    #[must_use]
    pub fn new(start: ElementId, end: ElementId, geom: LineString, skip_checks: bool) -> Self {
        Self {
            start,
            end,
            geom,
            skip_checks,
        }
    }

    /// Executes the operation, returning the new edge id.
    ///
    /// # Errors
    ///
    /// Same as [`AddEdgeModFace::execute`].
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &mut Topology<B, G>,
    ) -> Result<ElementId> {
        add_edge(topo, self.start, self.end, &self.geom, self.skip_checks, FaceMode::Replace)
    }
}
