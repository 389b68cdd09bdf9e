//! Edge insertion and removal with face split and heal.

mod add_edge;
pub(crate) mod adjacency;
mod remove;
pub(crate) mod split;

pub use add_edge::{AddEdgeModFace, AddEdgeNewFaces};
pub use remove::{RemEdgeModFace, RemEdgeNewFace};

pub(crate) use add_edge::add_edge;

/// What happens to a face split by a new edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FaceMode {
    /// Keep the split face on one side, add a face on the other.
    Modify,
    /// Replace the split face with two new faces.
    Replace,
    /// Leave faces alone.
    Ignore,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, TopoGeomEvent};
    use crate::error::{BackendError, TopologyError};
    use crate::operations::edit::AddIsoNode;
    use crate::operations::query::{GetFaceEdges, GetFaceGeometry};
    use crate::operations::testing::{line, pt, topology};
    use crate::topology::{ElementId, OrientedEdge, Topology};
    use crate::TopolisError;

    /// Builds the 10x10 square edge by edge, returning its corner nodes.
    fn square(topo: &mut Topology<MemoryBackend>) -> [ElementId; 4] {
        let corners = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let nodes = corners.map(|(x, y)| {
            AddIsoNode::new(None, pt(x, y), false).execute(topo).unwrap()
        });
        for i in 0..4 {
            let j = (i + 1) % 4;
            AddEdgeModFace::new(nodes[i], nodes[j], line(&[corners[i], corners[j]]), false)
                .execute(topo)
                .unwrap();
        }
        nodes
    }

    // ── edge insertion ──

    #[test]
    fn square_links() {
        let mut topo = topology();
        square(&mut topo);
        let links: Vec<_> = (1..=4)
            .map(|id| {
                let e = topo.edge(id).unwrap();
                (e.next_left, e.next_right)
            })
            .collect();
        assert_eq!(links, vec![(2, -4), (3, -1), (4, -2), (1, -3)]);
    }

    #[test]
    fn closing_square_creates_face() {
        let mut topo = topology();
        square(&mut topo);
        assert_eq!(topo.backend().faces().count(), 1);
        for id in 1..=4 {
            let e = topo.edge(id).unwrap();
            assert_eq!((e.face_left, e.face_right), (1, 0));
        }
        let poly = GetFaceGeometry::new(1).execute(&topo).unwrap();
        assert!((poly.area() - 100.0).abs() < 1e-9);
        let ring = GetFaceEdges::new(1).execute(&topo).unwrap();
        assert_eq!(ring, (1..=4).map(OrientedEdge::forward).collect::<Vec<_>>());
    }

    #[test]
    fn isolated_node_follows_new_face() {
        let mut topo = topology();
        let inner = AddIsoNode::new(None, pt(2.0, 8.0), false).execute(&mut topo).unwrap();
        let outer = AddIsoNode::new(None, pt(20.0, 8.0), false).execute(&mut topo).unwrap();
        square(&mut topo);
        assert_eq!(topo.node(inner).unwrap().containing_face, Some(1));
        assert_eq!(topo.node(outer).unwrap().containing_face, Some(0));
    }

    #[test]
    fn diagonal_modifies_face() {
        let mut topo = topology();
        let n = square(&mut topo);
        let diag = AddEdgeModFace::new(n[0], n[2], line(&[(0.0, 0.0), (10.0, 10.0)]), false)
            .execute(&mut topo)
            .unwrap();
        let d = topo.edge(diag).unwrap();
        assert_eq!((d.face_left, d.face_right), (2, 1));
        assert_eq!(topo.edge(1).unwrap().face_left, 1);
        assert_eq!(topo.edge(2).unwrap().face_left, 1);
        assert_eq!(topo.edge(3).unwrap().face_left, 2);
        assert_eq!(topo.edge(4).unwrap().face_left, 2);
        assert!(topo.backend().events().contains(&TopoGeomEvent::FaceSplit {
            face: 1,
            new1: 2,
            new2: None
        }));
        let kept = GetFaceGeometry::new(1).execute(&topo).unwrap();
        assert!((kept.area() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn diagonal_replaces_face() {
        let mut topo = topology();
        let n = square(&mut topo);
        let diag = AddEdgeNewFaces::new(n[0], n[2], line(&[(0.0, 0.0), (10.0, 10.0)]), false)
            .execute(&mut topo)
            .unwrap();
        let d = topo.edge(diag).unwrap();
        assert_eq!((d.face_left, d.face_right), (3, 2));
        assert!(topo.face(1).is_err());
        assert_eq!(topo.backend().faces().count(), 2);
    }

    #[test]
    fn edge_into_other_face_conflicts() {
        let mut topo = topology();
        let n = square(&mut topo);
        let outside = AddIsoNode::new(None, pt(20.0, 5.0), false).execute(&mut topo).unwrap();
        // Leaves the square's corner through its interior side.
        let err = AddEdgeModFace::new(
            n[0],
            outside,
            line(&[(0.0, 0.0), (5.0, 5.0), (20.0, 5.0)]),
            false,
        )
        .execute(&mut topo)
        .unwrap_err();
        assert!(matches!(err, TopolisError::Topology(TopologyError::EdgeCrossesEdge(_))));
    }

    #[test]
    fn second_loop_at_shared_node() {
        let mut topo = topology();
        let n = AddIsoNode::new(None, pt(0.0, 0.0), false).execute(&mut topo).unwrap();
        let east = line(&[(0.0, 0.0), (5.0, 0.0), (5.0, 5.0), (0.0, 0.0)]);
        let west = line(&[(0.0, 0.0), (-5.0, 0.0), (-5.0, -5.0), (0.0, 0.0)]);
        AddEdgeModFace::new(n, n, east, false).execute(&mut topo).unwrap();
        let second = AddEdgeModFace::new(n, n, west, false).execute(&mut topo).unwrap();

        assert_eq!(topo.backend().faces().count(), 2);
        let e = topo.edge(second).unwrap();
        assert_eq!((e.face_left, e.face_right), (2, 0));
        let poly = GetFaceGeometry::new(2).execute(&topo).unwrap();
        assert!((poly.area() - 12.5).abs() < 1e-9);
    }

    // ── edge removal ──

    #[test]
    fn removing_side_heals_into_universe() {
        let mut topo = topology();
        let inner = AddIsoNode::new(None, pt(2.0, 8.0), false).execute(&mut topo).unwrap();
        square(&mut topo);
        let face = RemEdgeModFace::new(1).execute(&mut topo).unwrap();
        assert_eq!(face, 0);
        assert_eq!(topo.backend().faces().count(), 0);
        for id in 2..=4 {
            let e = topo.edge(id).unwrap();
            assert_eq!((e.face_left, e.face_right), (0, 0));
        }
        assert_eq!(topo.node(inner).unwrap().containing_face, Some(0));
        assert_eq!(topo.edge(2).unwrap().next_right, 2);
        assert_eq!(topo.edge(4).unwrap().next_left, -4);
    }

    #[test]
    fn removing_diagonal_keeps_right_face() {
        let mut topo = topology();
        let n = square(&mut topo);
        let diag = AddEdgeModFace::new(n[0], n[2], line(&[(0.0, 0.0), (10.0, 10.0)]), false)
            .execute(&mut topo)
            .unwrap();
        let face = RemEdgeModFace::new(diag).execute(&mut topo).unwrap();
        assert_eq!(face, 1);
        assert!(topo.face(2).is_err());
        for id in 1..=4 {
            assert_eq!(topo.edge(id).unwrap().face_left, 1);
        }
        assert_eq!(topo.edge(1).unwrap().next_left, 2);
        let poly = GetFaceGeometry::new(1).execute(&topo).unwrap();
        assert!((poly.area() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn removing_diagonal_with_new_face() {
        let mut topo = topology();
        let n = square(&mut topo);
        let diag = AddEdgeModFace::new(n[0], n[2], line(&[(0.0, 0.0), (10.0, 10.0)]), false)
            .execute(&mut topo)
            .unwrap();
        let face = RemEdgeNewFace::new(diag).execute(&mut topo).unwrap();
        assert_eq!(face, 3);
        assert_eq!(topo.backend().faces().map(|f| f.id).collect::<Vec<_>>(), vec![3]);
        assert!(topo.backend().events().contains(&TopoGeomEvent::FaceHeal {
            face1: 1,
            face2: 2,
            new_face: 3
        }));
    }

    #[test]
    fn vetoed_edge_removal() {
        let mut topo = topology();
        square(&mut topo);
        topo.backend_mut().protect_edge(1);
        let err = RemEdgeModFace::new(1).execute(&mut topo).unwrap_err();
        assert!(matches!(err, TopolisError::Backend(BackendError::Forbidden(_))));
        assert_eq!(topo.backend().faces().count(), 1);
    }

    #[test]
    fn dangling_edge_removal_frees_node() {
        let mut topo = topology();
        let n = square(&mut topo);
        let tip = AddIsoNode::new(None, pt(5.0, 5.0), false).execute(&mut topo).unwrap();
        let spike = AddEdgeModFace::new(n[0], tip, line(&[(0.0, 0.0), (5.0, 5.0)]), false)
            .execute(&mut topo)
            .unwrap();
        let e = topo.edge(spike).unwrap();
        assert_eq!((e.face_left, e.face_right), (1, 1));
        assert_eq!(RemEdgeModFace::new(spike).execute(&mut topo).unwrap(), 1);
        assert_eq!(topo.node(tip).unwrap().containing_face, Some(1));
        assert_eq!(topo.edge(1).unwrap().next_right, -4);
    }
}
