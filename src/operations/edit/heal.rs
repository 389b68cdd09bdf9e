use tracing::debug;

use crate::backend::TopologyBackend;
use crate::engine::GeometryEngine;
use crate::error::{Result, TopologyError};
use crate::topology::{Edge, EdgeFields, ElementId, Topology};

/// How two edges meet at the node they share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Junction {
    /// e1 ends where e2 starts.
    EndStart,
    /// Both edges end on the node.
    EndEnd,
    /// Both edges start on the node.
    StartStart,
    /// e1 starts where e2 ends.
    StartEnd,
}

impl Junction {
    fn common_node(self, e1: &Edge) -> ElementId {
        match self {
            Self::EndStart | Self::EndEnd => e1.end_node,
            Self::StartStart | Self::StartEnd => e1.start_node,
        }
    }
}

/// Finds a shared endpoint that no third edge touches.
///
/// The end of `e1` is tried first.
fn find_junction<B: TopologyBackend, G: GeometryEngine>(
    topo: &Topology<B, G>,
    e1: &Edge,
    e2: &Edge,
) -> Result<Junction> {
    let mut others: Vec<ElementId> = Vec::new();
    let candidates = [
        if e1.end_node == e2.start_node {
            Some(Junction::EndStart)
        } else if e1.end_node == e2.end_node {
            Some(Junction::EndEnd)
        } else {
            None
        },
        if e1.start_node == e2.start_node {
            Some(Junction::StartStart)
        } else if e1.start_node == e2.end_node {
            Some(Junction::StartEnd)
        } else {
            None
        },
    ];
    for junction in candidates.into_iter().flatten() {
        let node = junction.common_node(e1);
        let incident = topo.backend().get_edge_by_node(&[node], EdgeFields::ID)?;
        let extra: Vec<ElementId> = incident
            .iter()
            .map(|e| e.id)
            .filter(|&id| id != e1.id && id != e2.id)
            .collect();
        if extra.is_empty() {
            return Ok(junction);
        }
        others.extend(extra);
    }
    if others.is_empty() {
        Err(TopologyError::NonConnectedEdges.into())
    } else {
        let list: Vec<String> = others.iter().map(ToString::to_string).collect();
        Err(TopologyError::OtherEdgesConnected(list.join(",")).into())
    }
}

/// Merges two edges sharing a degree-2 node into one, dropping the node.
///
/// Returns the common node id in place mode, the new edge id otherwise.
fn heal_edges<B: TopologyBackend, G: GeometryEngine>(
    topo: &mut Topology<B, G>,
    eid1: ElementId,
    eid2: ElementId,
    in_place: bool,
) -> Result<ElementId> {
    if eid1 == eid2 {
        return Err(TopologyError::HealWithItself(eid1).into());
    }
    let e1 = topo.edge(eid1)?;
    let e2 = topo.edge(eid2)?;
    if e1.is_closed() {
        return Err(TopologyError::ClosedEdgeHeal(eid1).into());
    }
    if e2.is_closed() {
        return Err(TopologyError::ClosedEdgeHeal(eid2).into());
    }

    let junction = find_junction(topo, &e1, &e2)?;
    let common = junction.common_node(&e1);
    topo.backend().check_topo_geom_rem_node(common, eid1, eid2)?;

    // Free-node signs give the orientation of links reaching each edge's
    // unshared end; `e2_sign` is negative when the edges run opposite ways.
    let (mut merged, e1_free, e2_free, e2_sign) = match junction {
        Junction::EndStart => {
            let mut geom = e1.geom.clone();
            geom.append(e2.geom.points());
            let mut m = Edge::new(e1.start_node, e2.end_node, geom);
            m.next_left = e2.next_left;
            m.next_right = e1.next_right;
            (m, 1, -1, 1)
        }
        Junction::EndEnd => {
            let mut geom = e1.geom.clone();
            geom.append(e2.geom.reversed().points());
            let mut m = Edge::new(e1.start_node, e2.start_node, geom);
            m.next_left = e2.next_right;
            m.next_right = e1.next_right;
            (m, 1, 1, -1)
        }
        Junction::StartStart => {
            let mut geom = e2.geom.reversed();
            geom.append(e1.geom.points());
            let mut m = Edge::new(e2.end_node, e1.end_node, geom);
            m.next_left = e1.next_left;
            m.next_right = e2.next_left;
            (m, -1, -1, -1)
        }
        Junction::StartEnd => {
            let mut geom = e2.geom.clone();
            geom.append(e1.geom.points());
            let mut m = Edge::new(e2.start_node, e1.end_node, geom);
            m.next_left = e1.next_left;
            m.next_right = e2.next_right;
            (m, -1, 1, 1)
        }
    };

    let backend = topo.backend_mut();
    if in_place {
        merged.id = eid1;
        let n = backend.update_edges_by_id(
            &[merged.clone()],
            EdgeFields::NEXT_LEFT
                | EdgeFields::NEXT_RIGHT
                | EdgeFields::START_NODE
                | EdgeFields::END_NODE
                | EdgeFields::GEOM,
        )?;
        if n != 1 {
            return Err(TopologyError::UnexpectedCount {
                what: "updated edge",
                count: n,
                expected: 1,
            }
            .into());
        }
    } else {
        merged.face_left = e1.face_left;
        merged.face_right = e1.face_right;
        let mut inserted = [merged];
        backend.insert_edges(&mut inserted)?;
        let [m] = inserted;
        merged = m;
    }
    let new_id = merged.id;

    let mut relinks = vec![(eid2, e2_free, e2_sign)];
    if !in_place {
        relinks.push((eid1, e1_free, 1));
    }
    for (old, free, sign) in relinks {
        for field in [EdgeFields::NEXT_LEFT, EdgeFields::NEXT_RIGHT] {
            let mut select = Edge::default();
            let mut update = Edge::default();
            if field == EdgeFields::NEXT_LEFT {
                select.next_left = free * old;
                update.next_left = free * new_id * sign;
            } else {
                select.next_right = free * old;
                update.next_right = free * new_id * sign;
            }
            backend.update_edges(&select, field, &update, field, None)?;
        }
    }

    backend.delete_edges(&e2, EdgeFields::ID)?;
    if !in_place {
        backend.delete_edges(&e1, EdgeFields::ID)?;
    }
    backend.delete_nodes_by_id(&[common])?;
    backend.update_topo_geom_edge_heal(eid1, eid2, new_id)?;

    debug!(e1 = eid1, e2 = eid2, edge = new_id, node = common, "healed edges");
    Ok(if in_place { common } else { new_id })
}

/// Heals two edges into the first one, removing the node they share.
pub struct ModEdgeHeal {
    e1: ElementId,
    e2: ElementId,
}

impl ModEdgeHeal {
    /// Creates a new `ModEdgeHeal` operation.
    #[must_use]
    pub fn new(e1: ElementId, e2: ElementId) -> Self {
        Self { e1, e2 }
    }

    /// Executes the operation, returning the id of the removed node.
    ///
    /// # Errors
    ///
    /// Returns an error if the edges are the same, missing or closed, if they
    /// do not share a node, if other edges touch the shared node, or if the
    /// backend vetoes removing the node.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &mut Topology<B, G>,
    ) -> Result<ElementId> {
        heal_edges(topo, self.e1, self.e2, true)
    }
}

/// Heals two edges into a newly created edge, removing both.
pub struct NewEdgeHeal {
    e1: ElementId,
    e2: ElementId,
}

impl NewEdgeHeal {
    /// Creates a new `NewEdgeHeal` operation.
    #[must_use]
    pub fn new(e1: ElementId, e2: ElementId) -> Self {
        Self { e1, e2 }
    }

    /// Executes the operation, returning the id of the new edge.
    ///
    /// # Errors
    ///
    /// Same as [`ModEdgeHeal::execute`].
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &mut Topology<B, G>,
    ) -> Result<ElementId> {
        heal_edges(topo, self.e1, self.e2, false)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, TopoGeomEvent};
    use crate::error::BackendError;
    use crate::operations::edit::{AddIsoEdge, AddIsoNode, ModEdgeSplit};
    use crate::operations::testing::{line, pt, topology};
    use crate::TopolisError;

    fn split_line(topo: &mut Topology<MemoryBackend>) -> ElementId {
        let a = AddIsoNode::new(None, pt(0.0, 0.0), false).execute(topo).unwrap();
        let b = AddIsoNode::new(None, pt(10.0, 0.0), false).execute(topo).unwrap();
        let e = AddIsoEdge::new(a, b, line(&[(0.0, 0.0), (10.0, 0.0)]))
            .execute(topo)
            .unwrap();
        ModEdgeSplit::new(e, pt(4.0, 0.0), false).execute(topo).unwrap()
    }

    // ── inverse of split ──

    #[test]
    fn mod_heal_undoes_split() {
        let mut topo = topology();
        let node = split_line(&mut topo);
        let removed = ModEdgeHeal::new(1, 2).execute(&mut topo).unwrap();
        assert_eq!(removed, node);
        assert!(topo.node(node).is_err());
        assert!(topo.edge(2).is_err());

        let e = topo.edge(1).unwrap();
        assert_eq!((e.start_node, e.end_node), (1, 2));
        assert_eq!(e.geom, line(&[(0.0, 0.0), (4.0, 0.0), (10.0, 0.0)]));
        assert_eq!((e.next_left, e.next_right), (-1, 1));
    }

    #[test]
    fn new_heal_replaces_both() {
        let mut topo = topology();
        split_line(&mut topo);
        let id = NewEdgeHeal::new(1, 2).execute(&mut topo).unwrap();
        assert_eq!(id, 3);
        assert!(topo.edge(1).is_err());
        assert!(topo.edge(2).is_err());
        let e = topo.edge(id).unwrap();
        assert_eq!((e.start_node, e.end_node), (1, 2));
        assert_eq!((e.next_left, e.next_right), (-3, 3));
        assert_eq!((e.face_left, e.face_right), (0, 0));
        assert!(topo
            .backend()
            .events()
            .contains(&TopoGeomEvent::EdgeHeal {
                edge1: 1,
                edge2: 2,
                new_edge: 3
            }));
    }

    #[test]
    fn heal_opposite_directions() {
        // Both edges end on the shared node.
        let mut topo = topology();
        let a = AddIsoNode::new(None, pt(0.0, 0.0), false).execute(&mut topo).unwrap();
        let m = AddIsoNode::new(None, pt(5.0, 0.0), false).execute(&mut topo).unwrap();
        let e1 = AddIsoEdge::new(a, m, line(&[(0.0, 0.0), (5.0, 0.0)]))
            .execute(&mut topo)
            .unwrap();
        let b = AddIsoNode::new(None, pt(10.0, 0.0), false).execute(&mut topo).unwrap();
        // Attach the second edge without face bookkeeping.
        let mut e2 = Edge::new(b, m, line(&[(10.0, 0.0), (5.0, 0.0)]));
        e2.face_left = 0;
        e2.face_right = 0;
        e2.next_left = -e1;
        e2.next_right = 2;
        topo.backend_mut().insert_edges(&mut [e2]).unwrap();
        let mut fixed = topo.edge(e1).unwrap();
        fixed.next_left = -2;
        topo.backend_mut()
            .update_edges_by_id(&[fixed], EdgeFields::NEXT_LEFT)
            .unwrap();

        ModEdgeHeal::new(e1, 2).execute(&mut topo).unwrap();
        let e = topo.edge(e1).unwrap();
        assert_eq!((e.start_node, e.end_node), (a, b));
        assert_eq!(e.geom, line(&[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0)]));
        assert_eq!((e.next_left, e.next_right), (-1, 1));
    }

    // ── preconditions ──

    #[test]
    fn heal_preconditions() {
        let mut topo = topology();
        split_line(&mut topo);
        let err = ModEdgeHeal::new(1, 1).execute(&mut topo).unwrap_err();
        assert!(matches!(err, TopolisError::Topology(TopologyError::HealWithItself(1))));
        let err = ModEdgeHeal::new(1, 7).execute(&mut topo).unwrap_err();
        assert!(matches!(err, TopolisError::Topology(TopologyError::NonExistentEdge(7))));

        let c = AddIsoNode::new(None, pt(0.0, 5.0), false).execute(&mut topo).unwrap();
        let d = AddIsoNode::new(None, pt(3.0, 5.0), false).execute(&mut topo).unwrap();
        let far = AddIsoEdge::new(c, d, line(&[(0.0, 5.0), (3.0, 5.0)]))
            .execute(&mut topo)
            .unwrap();
        let err = ModEdgeHeal::new(1, far).execute(&mut topo).unwrap_err();
        assert!(matches!(err, TopolisError::Topology(TopologyError::NonConnectedEdges)));
    }

    #[test]
    fn vetoed_node_removal() {
        let mut topo = topology();
        let node = split_line(&mut topo);
        topo.backend_mut().protect_node(node);
        let err = ModEdgeHeal::new(1, 2).execute(&mut topo).unwrap_err();
        assert!(matches!(err, TopolisError::Backend(BackendError::Forbidden(_))));
        assert!(topo.edge(2).is_ok());
    }
}
