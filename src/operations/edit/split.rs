use tracing::debug;

use crate::backend::TopologyBackend;
use crate::engine::GeometryEngine;
use crate::error::{Result, TopologyError};
use crate::geometry::LineString;
use crate::math::Point2;
use crate::topology::{Edge, EdgeFields, ElementId, Topology};

use super::checks::exists_coincident_node;
use super::iso_node::insert_node;

/// Loads the edge and cuts its geometry at `point`.
fn prepare_split<B: TopologyBackend, G: GeometryEngine>(
    topo: &Topology<B, G>,
    edge: ElementId,
    point: &Point2,
    skip_checks: bool,
) -> Result<(Edge, LineString, LineString)> {
    let old = topo.edge(edge)?;
    if !skip_checks && exists_coincident_node(topo, point)? {
        return Err(TopologyError::CoincidentNode.into());
    }
    let (first, second) = topo
        .engine()
        .split_line(&old.geom, point)
        .ok_or(TopologyError::PointNotOnEdge)?;
    Ok((old, first, second))
}

/// Rewrites `field` from `from` to `to` on edges matching `select_fields`
/// of `select`, leaving `keep` untouched.
fn relink<B: TopologyBackend>(
    backend: &mut B,
    select: &Edge,
    select_fields: EdgeFields,
    update: &Edge,
    field: EdgeFields,
    keep: ElementId,
) -> Result<usize> {
    let exclude = Edge {
        id: keep,
        ..Edge::default()
    };
    Ok(backend.update_edges(
        select,
        select_fields,
        update,
        field,
        Some((&exclude, EdgeFields::ID)),
    )?)
}

/// Splits an edge at a point, keeping the original edge for the first
/// half and adding a new edge for the second.
pub struct ModEdgeSplit {
    edge: ElementId,
    point: Point2,
    skip_checks: bool,
}

impl ModEdgeSplit {
    /// Creates a new `ModEdgeSplit` operation.
    #[must_use]
    pub fn new(edge: ElementId, point: Point2, skip_checks: bool) -> Self {
        Self {
            edge,
            point,
            skip_checks,
        }
    }

    /// Executes the operation, returning the id of the node created at the
    /// split point.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::NonExistentEdge`] if the edge is missing,
    /// [`TopologyError::CoincidentNode`] if a node already sits on the point,
    /// or [`TopologyError::PointNotOnEdge`] if the point is not on the edge.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &mut Topology<B, G>,
    ) -> Result<ElementId> {
        let (mut old, first, second) =
            prepare_split(topo, self.edge, &self.point, self.skip_checks)?;
        let node = insert_node(topo, None, self.point, true, false)?;

        let backend = topo.backend_mut();
        let new_id = backend.next_edge_id()?;
        let mut new_edge = Edge::new(node, old.end_node, second);
        new_edge.id = new_id;
        new_edge.face_left = old.face_left;
        new_edge.face_right = old.face_right;
        new_edge.next_left = if old.next_left == -old.id {
            -new_id
        } else {
            old.next_left
        };
        new_edge.next_right = -old.id;
        backend.insert_edges(&mut [new_edge])?;

        let old_end = old.end_node;
        old.geom = first;
        old.next_left = new_id;
        old.end_node = node;
        backend.update_edges_by_id(
            &[old.clone()],
            EdgeFields::GEOM | EdgeFields::NEXT_LEFT | EdgeFields::END_NODE,
        )?;

        // Edges that continued from the old end along its right side.
        relink(
            backend,
            &Edge {
                next_right: -old.id,
                start_node: old_end,
                ..Edge::default()
            },
            EdgeFields::NEXT_RIGHT | EdgeFields::START_NODE,
            &Edge {
                next_right: -new_id,
                ..Edge::default()
            },
            EdgeFields::NEXT_RIGHT,
            new_id,
        )?;
        relink(
            backend,
            &Edge {
                next_left: -old.id,
                end_node: old_end,
                ..Edge::default()
            },
            EdgeFields::NEXT_LEFT | EdgeFields::END_NODE,
            &Edge {
                next_left: -new_id,
                ..Edge::default()
            },
            EdgeFields::NEXT_LEFT,
            new_id,
        )?;

        backend.update_topo_geom_edge_split(old.id, new_id, None)?;
        debug!(edge = old.id, new_edge = new_id, node, "split edge in place");
        Ok(node)
    }
}

/// Splits an edge at a point, replacing it with two new edges.
pub struct NewEdgesSplit {
    edge: ElementId,
    point: Point2,
    skip_checks: bool,
}

impl NewEdgesSplit {
    /// Creates a new `NewEdgesSplit` operation.
    #[must_use]
    pub fn new(edge: ElementId, point: Point2, skip_checks: bool) -> Self {
        Self {
            edge,
            point,
            skip_checks,
        }
    }

    /// Executes the operation, returning the id of the node created at the
    /// split point.
    ///
    /// # Errors
    ///
    /// Same as [`ModEdgeSplit::execute`].
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &mut Topology<B, G>,
    ) -> Result<ElementId> {
        let (old, first, second) = prepare_split(topo, self.edge, &self.point, self.skip_checks)?;
        let node = insert_node(topo, None, self.point, true, false)?;

        let backend = topo.backend_mut();
        backend.delete_edges(
            &Edge {
                id: old.id,
                ..Edge::default()
            },
            EdgeFields::ID,
        )?;

        let n0 = backend.next_edge_id()?;
        let n1 = backend.next_edge_id()?;

        let mut e0 = Edge::new(old.start_node, node, first);
        e0.id = n0;
        e0.face_left = old.face_left;
        e0.face_right = old.face_right;
        e0.next_left = n1;
        e0.next_right = if old.next_right == old.id {
            n0
        } else if old.next_right == -old.id {
            -n1
        } else {
            old.next_right
        };

        let mut e1 = Edge::new(node, old.end_node, second);
        e1.id = n1;
        e1.face_left = old.face_left;
        e1.face_right = old.face_right;
        e1.next_right = -n0;
        e1.next_left = if old.next_left == -old.id {
            -n1
        } else if old.next_left == old.id {
            n0
        } else {
            old.next_left
        };
        backend.insert_edges(&mut [e0, e1])?;

        let renames = [
            (EdgeFields::NEXT_RIGHT, EdgeFields::START_NODE, old.id, old.start_node, n1),
            (EdgeFields::NEXT_RIGHT, EdgeFields::START_NODE, -old.id, old.end_node, -n0),
            (EdgeFields::NEXT_LEFT, EdgeFields::END_NODE, old.id, old.start_node, n0),
            (EdgeFields::NEXT_LEFT, EdgeFields::END_NODE, -old.id, old.end_node, -n1),
        ];
        for (link, at, from, node_id, to) in renames {
            let mut select = Edge::default();
            let mut update = Edge::default();
            if link == EdgeFields::NEXT_RIGHT {
                select.next_right = from;
                update.next_right = to;
            } else {
                select.next_left = from;
                update.next_left = to;
            }
            if at == EdgeFields::START_NODE {
                select.start_node = node_id;
            } else {
                select.end_node = node_id;
            }
            backend.update_edges(&select, link | at, &update, link, None)?;
        }

        backend.update_topo_geom_edge_split(old.id, n0, Some(n1))?;
        debug!(edge = old.id, n0, n1, node, "split edge into two new edges");
        Ok(node)
    }
}
