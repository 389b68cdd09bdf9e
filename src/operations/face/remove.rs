use tracing::debug;

use crate::backend::TopologyBackend;
use crate::engine::GeometryEngine;
use crate::error::{Result, TopologyError};
use crate::topology::{
    Edge, EdgeFields, ElementId, Face, FaceFields, Node, NodeFields, Topology, UNIVERSE_FACE,
};

/// Repoints every edge side and isolated node in face `from` to `to`.
fn replace_face_refs<B: TopologyBackend>(
    backend: &mut B,
    from: ElementId,
    to: ElementId,
) -> Result<()> {
    backend.update_edges(
        &Edge {
            face_left: from,
            ..Edge::default()
        },
        EdgeFields::FACE_LEFT,
        &Edge {
            face_left: to,
            ..Edge::default()
        },
        EdgeFields::FACE_LEFT,
        None,
    )?;
    backend.update_edges(
        &Edge {
            face_right: from,
            ..Edge::default()
        },
        EdgeFields::FACE_RIGHT,
        &Edge {
            face_right: to,
            ..Edge::default()
        },
        EdgeFields::FACE_RIGHT,
        None,
    )?;
    backend.update_nodes(
        &Node {
            containing_face: Some(from),
            ..Node::default()
        },
        NodeFields::CONTAINING_FACE,
        &Node {
            containing_face: Some(to),
            ..Node::default()
        },
        NodeFields::CONTAINING_FACE,
        None,
    )?;
    Ok(())
}

/// The link to follow instead of one that reached the removed edge.
///
/// `arrived_forward` tells whether the link reached `edge` walking it
/// forward.
fn bypass(edge: &Edge, arrived_forward: bool) -> ElementId {
    if arrived_forward {
        if edge.next_right != -edge.id {
            edge.next_right
        } else {
            edge.next_left
        }
    } else if edge.next_left != edge.id {
        edge.next_left
    } else {
        edge.next_right
    }
}

/// Removes an edge, merging the faces on its sides.
///
/// In place, the right face survives; otherwise both are replaced by a new
/// face. Returns the surviving face, or in replace mode the new face id
/// (0 when no face was created).
pub(crate) fn remove_edge<B: TopologyBackend, G: GeometryEngine>(
    topo: &mut Topology<B, G>,
    edge_id: ElementId,
    in_place: bool,
) -> Result<ElementId> {
    let edge = topo.edge(edge_id)?;
    topo.backend()
        .check_topo_geom_rem_edge(edge_id, edge.face_left, edge.face_right)?;

    let node_ids: &[ElementId] = if edge.is_closed() {
        &[edge.start_node]
    } else {
        &[edge.start_node, edge.end_node]
    };
    let incident = topo.backend().get_edge_by_node(
        node_ids,
        EdgeFields::ID
            | EdgeFields::START_NODE
            | EdgeFields::END_NODE
            | EdgeFields::NEXT_LEFT
            | EdgeFields::NEXT_RIGHT,
    )?;

    let mut start_degree = 0;
    let mut end_degree = 0;
    let mut left_updates = Vec::new();
    let mut right_updates = Vec::new();
    for e in incident.iter().filter(|e| e.id != edge_id) {
        if e.touches(edge.start_node) {
            start_degree += 1;
        }
        if e.touches(edge.end_node) {
            end_degree += 1;
        }
        if e.next_left == -edge_id || e.next_left == edge_id {
            left_updates.push(Edge {
                id: e.id,
                next_left: bypass(&edge, e.next_left == edge_id),
                ..Edge::default()
            });
        }
        if e.next_right == -edge_id || e.next_right == edge_id {
            right_updates.push(Edge {
                id: e.id,
                next_right: bypass(&edge, e.next_right == edge_id),
                ..Edge::default()
            });
        }
    }
    let backend = topo.backend_mut();
    if !left_updates.is_empty() {
        backend.update_edges_by_id(&left_updates, EdgeFields::NEXT_LEFT)?;
    }
    if !right_updates.is_empty() {
        backend.update_edges_by_id(&right_updates, EdgeFields::NEXT_RIGHT)?;
    }

    let mut new_face = UNIVERSE_FACE;
    let flood = if edge.is_dangling() {
        edge.face_right
    } else {
        let flood = if edge.face_left == UNIVERSE_FACE || edge.face_right == UNIVERSE_FACE {
            UNIVERSE_FACE
        } else {
            let faces = topo
                .backend()
                .get_face_by_id(&[edge.face_left, edge.face_right], FaceFields::ALL)?;
            let mbr_of = |id: ElementId| -> Result<_> {
                let mut found = faces.iter().filter(|f| f.id == id);
                let face = found.next().ok_or(TopologyError::NonExistentFace(id))?;
                if found.next().is_some() {
                    return Err(TopologyError::UnexpectedCount {
                        what: "face",
                        count: 2,
                        expected: 1,
                    }
                    .into());
                }
                Ok(face.mbr)
            };
            let union = match (mbr_of(edge.face_left)?, mbr_of(edge.face_right)?) {
                (Some(a), Some(b)) => Some(a.merged(&b)),
                (a, b) => a.or(b),
            };
            let backend = topo.backend_mut();
            if in_place {
                let n = backend.update_faces_by_id(&[Face {
                    id: edge.face_right,
                    mbr: union,
                }])?;
                if n != 1 {
                    return Err(TopologyError::UnexpectedCount {
                        what: "updated face",
                        count: n,
                        expected: 1,
                    }
                    .into());
                }
                edge.face_right
            } else {
                let mut inserted = [Face::new(union)];
                backend.insert_faces(&mut inserted)?;
                new_face = inserted[0].id;
                new_face
            }
        };

        let backend = topo.backend_mut();
        for side in [edge.face_left, edge.face_right] {
            if side != flood {
                replace_face_refs(backend, side, flood)?;
            }
        }
        backend.update_topo_geom_face_heal(edge.face_right, edge.face_left, flood)?;
        flood
    };

    let backend = topo.backend_mut();
    backend.delete_edges(&edge, EdgeFields::ID)?;

    let mut freed = Vec::with_capacity(2);
    if start_degree == 0 {
        freed.push(Node {
            id: edge.start_node,
            containing_face: Some(flood),
            ..Node::default()
        });
    }
    if !edge.is_closed() && end_degree == 0 {
        freed.push(Node {
            id: edge.end_node,
            containing_face: Some(flood),
            ..Node::default()
        });
    }
    if !freed.is_empty() {
        backend.update_nodes_by_id(&freed, NodeFields::CONTAINING_FACE)?;
    }

    if !edge.is_dangling() {
        let gone: Vec<ElementId> = [edge.face_right, edge.face_left]
            .into_iter()
            .filter(|&f| f != flood)
            .collect();
        backend.delete_faces_by_id(&gone)?;
    }

    debug!(edge = edge_id, flood, "removed edge");
    Ok(if in_place { flood } else { new_face })
}

/// Removes an edge; if two faces merge, the one on the right is kept.
pub struct RemEdgeModFace {
    edge: ElementId,
}

impl RemEdgeModFace {
    /// Creates a new `RemEdgeModFace` operation.
    #[must_use]
    pub fn new(edge: ElementId) -> Self {
        Self { edge }
    }

    /// Executes the operation, returning the id of the face now covering
    /// the edge's former location.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is missing, if the backend vetoes the
    /// removal, or if a face record is missing.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &mut Topology<B, G>,
    ) -> Result<ElementId> {
        remove_edge(topo, self.edge, true)
    }
}

/// Removes an edge; if two faces merge, both are replaced by a new face.
pub struct RemEdgeNewFace {
    edge: ElementId,
}

impl RemEdgeNewFace {
    /// Creates a new `RemEdgeNewFace` operation.
    #[must_use]
    pub fn new(edge: ElementId) -> Self {
        Self { edge }
    }

    /// Executes the operation, returning the id of the created face, or 0
    /// when no face was created.
    ///
    /// # Errors
    ///
    /// Same as [`RemEdgeModFace::execute`].
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &mut Topology<B, G>,
    ) -> Result<ElementId> {
        remove_edge(topo, self.edge, false)
    }
}
