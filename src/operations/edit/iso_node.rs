use tracing::debug;

use crate::backend::TopologyBackend;
use crate::engine::GeometryEngine;
use crate::error::{Result, TopologyError};
use crate::math::Point2;
use crate::topology::{ElementId, Node, NodeFields, Topology, UNIVERSE_FACE};

use super::checks::{exists_coincident_node, exists_edge_intersecting_point};

/// Inserts a node, optionally looking up or verifying its containing face.
///
/// With `check_face` unset and no `face`, the node is stored as not isolated,
/// ready for an edge to be attached.
pub(crate) fn insert_node<B: TopologyBackend, G: GeometryEngine>(
    topo: &mut Topology<B, G>,
    face: Option<ElementId>,
    point: Point2,
    skip_checks: bool,
    check_face: bool,
) -> Result<ElementId> {
    if !skip_checks {
        if exists_coincident_node(topo, &point)? {
            return Err(TopologyError::CoincidentNode.into());
        }
        if exists_edge_intersecting_point(topo, &point)? {
            return Err(TopologyError::EdgeCrossesNode.into());
        }
    }

    let found = if check_face && (face.is_none() || !skip_checks) {
        Some(
            topo.backend()
                .get_face_containing_point(&point)?
                .unwrap_or(UNIVERSE_FACE),
        )
    } else {
        None
    };
    let face = match face {
        None => found,
        Some(f) if !skip_checks && found != Some(f) => {
            return Err(TopologyError::NotWithinFace.into());
        }
        Some(f) => Some(f),
    };

    let mut nodes = [Node::new(point, face)];
    topo.backend_mut().insert_nodes(&mut nodes)?;
    debug!(node = nodes[0].id, face = ?face, "added node");
    Ok(nodes[0].id)
}

/// Fetches a node and checks it has no incident edge.
fn isolated_node<B: TopologyBackend, G: GeometryEngine>(
    topo: &Topology<B, G>,
    id: ElementId,
) -> Result<Node> {
    let node = topo.node(id)?;
    if !node.is_isolated() {
        return Err(TopologyError::NotIsolatedNode(id).into());
    }
    Ok(node)
}

/// Adds an isolated node.
pub struct AddIsoNode {
    face: Option<ElementId>,
    point: Point2,
    skip_checks: bool,
}

impl AddIsoNode {
    /// Creates a new `AddIsoNode` operation. Without a `face` the containing
    /// face is looked up.
    #[must_use]
    pub fn new(face: Option<ElementId>, point: Point2, skip_checks: bool) -> Self {
        Self {
            face,
            point,
            skip_checks,
        }
    }

    /// Executes the operation, returning the new node id.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::CoincidentNode`] if a node already sits on the
    /// point, [`TopologyError::EdgeCrossesNode`] if an edge passes through it,
    /// or [`TopologyError::NotWithinFace`] if the given face does not contain
    /// it. Checks are skipped with `skip_checks`.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &mut Topology<B, G>,
    ) -> Result<ElementId> {
        insert_node(topo, self.face, self.point, self.skip_checks, true)
    }
}

/// Moves an isolated node within its face.
pub struct MoveIsoNode {
    node: ElementId,
    point: Point2,
}

impl MoveIsoNode {
    /// Creates a new `MoveIsoNode` operation.
    #[must_use]
    pub fn new(node: ElementId, point: Point2) -> Self {
        Self { node, point }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist or is not isolated, if the
    /// target point is taken by a node or an edge, or if it lies outside the
    /// node's containing face.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &mut Topology<B, G>,
    ) -> Result<()> {
        let mut node = isolated_node(topo, self.node)?;
        if exists_coincident_node(topo, &self.point)? {
            return Err(TopologyError::CoincidentNode.into());
        }
        if exists_edge_intersecting_point(topo, &self.point)? {
            return Err(TopologyError::EdgeCrossesNode.into());
        }
        let face = topo
            .backend()
            .get_face_containing_point(&self.point)?
            .unwrap_or(UNIVERSE_FACE);
        if node.containing_face != Some(face) {
            return Err(TopologyError::NotWithinFace.into());
        }
        node.geom = self.point;
        topo.backend_mut()
            .update_nodes_by_id(&[node], NodeFields::GEOM)?;
        debug!(node = self.node, "moved isolated node");
        Ok(())
    }
}

/// Removes an isolated node.
pub struct RemoveIsoNode {
    node: ElementId,
}

impl RemoveIsoNode {
    /// Creates a new `RemoveIsoNode` operation.
    #[must_use]
    pub fn new(node: ElementId) -> Self {
        Self { node }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist or has incident edges.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &mut Topology<B, G>,
    ) -> Result<()> {
        isolated_node(topo, self.node)?;
        let n = topo.backend_mut().delete_nodes_by_id(&[self.node])?;
        if n != 1 {
            return Err(TopologyError::UnexpectedCount {
                what: "deleted node",
                count: n,
                expected: 1,
            }
            .into());
        }
        debug!(node = self.node, "removed isolated node");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::edit::AddIsoEdge;
    use crate::operations::testing::{line, pt, topology};
    use crate::TopolisError;

    #[test]
    fn iso_node_in_universe() {
        let mut topo = topology();
        let id = AddIsoNode::new(None, pt(5.0, 5.0), false).execute(&mut topo).unwrap();
        let node = topo.node(id).unwrap();
        assert_eq!(node.containing_face, Some(0));
        assert!(node.is_isolated());
    }

    #[test]
    fn coincident_node_rejected() {
        let mut topo = topology();
        AddIsoNode::new(None, pt(1.0, 1.0), false).execute(&mut topo).unwrap();
        let err = AddIsoNode::new(None, pt(1.0, 1.0), false).execute(&mut topo).unwrap_err();
        assert!(matches!(err, TopolisError::Topology(TopologyError::CoincidentNode)));
        // Skipping checks lets it through.
        assert!(AddIsoNode::new(None, pt(1.0, 1.0), true).execute(&mut topo).is_ok());
    }

    #[test]
    fn node_on_edge_rejected() {
        let mut topo = topology();
        let a = AddIsoNode::new(None, pt(0.0, 0.0), false).execute(&mut topo).unwrap();
        let b = AddIsoNode::new(None, pt(10.0, 0.0), false).execute(&mut topo).unwrap();
        AddIsoEdge::new(a, b, line(&[(0.0, 0.0), (10.0, 0.0)]))
            .execute(&mut topo)
            .unwrap();
        let err = AddIsoNode::new(None, pt(5.0, 0.0), false).execute(&mut topo).unwrap_err();
        assert!(matches!(err, TopolisError::Topology(TopologyError::EdgeCrossesNode)));
    }

    #[test]
    fn explicit_face_must_contain_point() {
        let mut topo = topology();
        let err = AddIsoNode::new(Some(3), pt(1.0, 1.0), false).execute(&mut topo).unwrap_err();
        assert!(matches!(err, TopolisError::Topology(TopologyError::NotWithinFace)));
        let id = AddIsoNode::new(Some(0), pt(1.0, 1.0), false).execute(&mut topo).unwrap();
        assert_eq!(topo.node(id).unwrap().containing_face, Some(0));
    }

    #[test]
    fn move_and_remove() {
        let mut topo = topology();
        let id = AddIsoNode::new(None, pt(1.0, 1.0), false).execute(&mut topo).unwrap();
        MoveIsoNode::new(id, pt(2.0, 3.0)).execute(&mut topo).unwrap();
        assert_eq!(topo.node(id).unwrap().geom, pt(2.0, 3.0));
        RemoveIsoNode::new(id).execute(&mut topo).unwrap();
        assert!(topo.node(id).is_err());
        assert!(RemoveIsoNode::new(id).execute(&mut topo).is_err());
    }

    #[test]
    fn connected_node_is_not_isolated() {
        let mut topo = topology();
        let a = AddIsoNode::new(None, pt(0.0, 0.0), false).execute(&mut topo).unwrap();
        let b = AddIsoNode::new(None, pt(10.0, 0.0), false).execute(&mut topo).unwrap();
        AddIsoEdge::new(a, b, line(&[(0.0, 0.0), (10.0, 0.0)]))
            .execute(&mut topo)
            .unwrap();
        let err = RemoveIsoNode::new(a).execute(&mut topo).unwrap_err();
        assert!(matches!(err, TopolisError::Topology(TopologyError::NotIsolatedNode(_))));
        assert!(MoveIsoNode::new(b, pt(20.0, 0.0)).execute(&mut topo).is_err());
    }
}
