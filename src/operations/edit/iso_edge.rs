use tracing::debug;

use crate::backend::TopologyBackend;
use crate::engine::GeometryEngine;
use crate::error::{Result, TopologyError};
use crate::geometry::LineString;
use crate::topology::{Edge, EdgeFields, ElementId, Node, NodeFields, Topology};

use super::checks::{check_edge_crossing, check_endpoints, validate_curve};

/// Adds an edge between two isolated nodes lying in the same face.
pub struct AddIsoEdge {
    start: ElementId,
    end: ElementId,
    geom: LineString,
}

impl AddIsoEdge {
    /// Creates a new `AddIsoEdge` operation.
    #[must_use]
    pub fn new(start: ElementId, end: ElementId, geom: LineString) -> Self {
        Self { start, end, geom }
    }

    /// Executes the operation, returning the new edge id.
    ///
    /// # Errors
    ///
    /// Returns an error if the nodes are equal, missing, not isolated or in
    /// different faces, if the curve is invalid or does not join the nodes,
    /// or if it crosses existing nodes or edges.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &mut Topology<B, G>,
    ) -> Result<ElementId> {
        if self.start == self.end {
            return Err(TopologyError::ClosedEdgeNotIsolated.into());
        }
        validate_curve(topo.engine(), &self.geom)?;

        let nodes = topo.nodes_by_id(&[self.start, self.end], NodeFields::ALL)?;
        let find = |id: ElementId| {
            nodes
                .iter()
                .find(|n| n.id == id)
                .ok_or(TopologyError::NonExistentNode(id))
        };
        let start = find(self.start)?;
        let end = find(self.end)?;

        let face = match (start.containing_face, end.containing_face) {
            (None, _) => return Err(TopologyError::NotIsolatedNode(start.id).into()),
            (_, None) => return Err(TopologyError::NotIsolatedNode(end.id).into()),
            (Some(a), Some(b)) if a != b => {
                return Err(TopologyError::NodesInDifferentFaces.into())
            }
            (Some(a), Some(_)) => a,
        };

        check_endpoints(&self.geom, start, end)?;
        check_edge_crossing(topo, self.start, self.end, &self.geom, None)?;

        let id = topo.backend_mut().next_edge_id()?;
        let mut edge = Edge::new(self.start, self.end, self.geom.clone());
        edge.id = id;
        edge.face_left = face;
        edge.face_right = face;
        edge.next_left = -id;
        edge.next_right = id;
        topo.backend_mut().insert_edges(&mut [edge])?;

        let connected = [
            Node {
                id: self.start,
                ..Node::default()
            },
            Node {
                id: self.end,
                ..Node::default()
            },
        ];
        topo.backend_mut()
            .update_nodes_by_id(&connected, NodeFields::CONTAINING_FACE)?;

        debug!(edge = id, face, "added isolated edge");
        Ok(id)
    }
}

/// Removes an isolated edge, leaving its end nodes isolated.
pub struct RemIsoEdge {
    edge: ElementId,
}

impl RemIsoEdge {
    /// Creates a new `RemIsoEdge` operation.
    #[must_use]
    pub fn new(edge: ElementId) -> Self {
        Self { edge }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::NonExistentEdge`] if the edge is missing, or
    /// [`TopologyError::NotIsolatedEdge`] if it bounds a face or shares a node
    /// with another edge.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &mut Topology<B, G>,
    ) -> Result<()> {
        let edge = topo.edge(self.edge)?;
        if edge.face_left != edge.face_right {
            return Err(TopologyError::NotIsolatedEdge(self.edge).into());
        }
        let incident = topo
            .backend()
            .get_edge_by_node(&[edge.start_node, edge.end_node], EdgeFields::ID)?;
        if incident.iter().any(|e| e.id != self.edge) {
            return Err(TopologyError::NotIsolatedEdge(self.edge).into());
        }

        let select = Edge {
            id: self.edge,
            ..Edge::default()
        };
        topo.backend_mut().delete_edges(&select, EdgeFields::ID)?;

        let face = Some(edge.face_left);
        let freed = [
            Node {
                id: edge.start_node,
                containing_face: face,
                ..Node::default()
            },
            Node {
                id: edge.end_node,
                containing_face: face,
                ..Node::default()
            },
        ];
        topo.backend_mut()
            .update_nodes_by_id(&freed, NodeFields::CONTAINING_FACE)?;

        debug!(edge = self.edge, face = edge.face_left, "removed isolated edge");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::edit::AddIsoNode;
    use crate::operations::testing::{line, pt, topology};
    use crate::TopolisError;

    fn two_nodes(
        topo: &mut crate::topology::Topology<crate::backend::MemoryBackend>,
    ) -> (ElementId, ElementId) {
        let a = AddIsoNode::new(None, pt(0.0, 0.0), false).execute(topo).unwrap();
        let b = AddIsoNode::new(None, pt(10.0, 0.0), false).execute(topo).unwrap();
        (a, b)
    }

    #[test]
    fn iso_edge_links_to_itself() {
        let mut topo = topology();
        let (a, b) = two_nodes(&mut topo);
        let id = AddIsoEdge::new(a, b, line(&[(0.0, 0.0), (5.0, 2.0), (10.0, 0.0)]))
            .execute(&mut topo)
            .unwrap();
        let e = topo.edge(id).unwrap();
        assert_eq!((e.face_left, e.face_right), (0, 0));
        assert_eq!((e.next_left, e.next_right), (-id, id));
        assert!(!topo.node(a).unwrap().is_isolated());
        assert!(!topo.node(b).unwrap().is_isolated());
    }

    #[test]
    fn closed_iso_edge_rejected() {
        let mut topo = topology();
        let (a, _) = two_nodes(&mut topo);
        let err = AddIsoEdge::new(a, a, line(&[(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]))
            .execute(&mut topo)
            .unwrap_err();
        assert!(matches!(err, TopolisError::Topology(TopologyError::ClosedEdgeNotIsolated)));
    }

    #[test]
    fn endpoint_mismatch_rejected() {
        let mut topo = topology();
        let (a, b) = two_nodes(&mut topo);
        let err = AddIsoEdge::new(a, b, line(&[(0.0, 1.0), (10.0, 0.0)]))
            .execute(&mut topo)
            .unwrap_err();
        assert!(matches!(err, TopolisError::Topology(TopologyError::StartNodeMismatch)));
        let err = AddIsoEdge::new(a, b, line(&[(0.0, 0.0), (10.0, 1.0)]))
            .execute(&mut topo)
            .unwrap_err();
        assert!(matches!(err, TopolisError::Topology(TopologyError::EndNodeMismatch)));
    }

    #[test]
    fn crossing_edge_rejected() {
        let mut topo = topology();
        let (a, b) = two_nodes(&mut topo);
        AddIsoEdge::new(a, b, line(&[(0.0, 0.0), (10.0, 0.0)]))
            .execute(&mut topo)
            .unwrap();
        let c = AddIsoNode::new(None, pt(5.0, -5.0), false).execute(&mut topo).unwrap();
        let d = AddIsoNode::new(None, pt(5.0, 5.0), false).execute(&mut topo).unwrap();
        let err = AddIsoEdge::new(c, d, line(&[(5.0, -5.0), (5.0, 5.0)]))
            .execute(&mut topo)
            .unwrap_err();
        assert!(matches!(err, TopolisError::Topology(TopologyError::EdgeCrossesEdge(_))));
    }

    #[test]
    fn second_edge_on_node_rejected() {
        let mut topo = topology();
        let (a, b) = two_nodes(&mut topo);
        AddIsoEdge::new(a, b, line(&[(0.0, 0.0), (10.0, 0.0)]))
            .execute(&mut topo)
            .unwrap();
        let c = AddIsoNode::new(None, pt(0.0, 10.0), false).execute(&mut topo).unwrap();
        let err = AddIsoEdge::new(a, c, line(&[(0.0, 0.0), (0.0, 10.0)]))
            .execute(&mut topo)
            .unwrap_err();
        assert!(matches!(err, TopolisError::Topology(TopologyError::NotIsolatedNode(_))));
    }

    #[test]
    fn remove_restores_isolated_nodes() {
        let mut topo = topology();
        let (a, b) = two_nodes(&mut topo);
        let id = AddIsoEdge::new(a, b, line(&[(0.0, 0.0), (10.0, 0.0)]))
            .execute(&mut topo)
            .unwrap();
        RemIsoEdge::new(id).execute(&mut topo).unwrap();
        assert!(topo.edge(id).is_err());
        assert_eq!(topo.node(a).unwrap().containing_face, Some(0));
        assert_eq!(topo.node(b).unwrap().containing_face, Some(0));
        let err = RemIsoEdge::new(id).execute(&mut topo).unwrap_err();
        assert!(matches!(err, TopolisError::Topology(TopologyError::NonExistentEdge(_))));
    }
}
