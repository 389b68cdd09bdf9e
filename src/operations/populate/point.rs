use tracing::debug;

use crate::backend::TopologyBackend;
use crate::engine::GeometryEngine;
use crate::error::Result;
use crate::geometry::Aabb;
use crate::math::Point2;
use crate::operations::edit::{insert_node, ModEdgeSplit};
use crate::topology::{EdgeFields, ElementId, NodeFields, Topology};

/// Within tolerance, unless the distance is exactly zero.
fn within(dist: f64, tol: f64) -> bool {
    dist == 0.0 || dist < tol
}

/// Returns the node at `point`, reusing a node or splitting an edge within
/// `tol` before creating an isolated node.
///
/// With `find_face` unset a created node is left without containing face.
pub(crate) fn add_point<B: TopologyBackend, G: GeometryEngine>(
    topo: &mut Topology<B, G>,
    point: Point2,
    tol: f64,
    find_face: bool,
) -> Result<ElementId> {
    let nodes = topo.backend().get_node_within_distance(
        &point,
        tol,
        NodeFields::ID | NodeFields::GEOM,
        None,
    )?;
    let closest = nodes
        .iter()
        .map(|n| (n.id, (n.geom - point).norm()))
        .filter(|&(_, d)| within(d, tol))
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((id, dist)) = closest {
        debug!(node = id, dist, "point snapped to node");
        return Ok(id);
    }

    let engine = topo.engine();
    let mut edges: Vec<_> = topo
        .backend()
        .get_edge_within_distance(&point, tol, EdgeFields::ID | EdgeFields::GEOM, None)?
        .into_iter()
        .filter_map(|e| {
            let proj = engine.closest_point_on_line(&point, &e.geom)?;
            Some((e, proj))
        })
        .collect();
    edges.sort_by(|a, b| a.1.distance.total_cmp(&b.1.distance));

    if let Some((edge, proj)) = edges.into_iter().next() {
        // A projection landing on an endpoint means that node is the answer.
        if edge.geom.first() == Some(&proj.point) || edge.geom.last() == Some(&proj.point) {
            let hit = topo.backend().get_node_within_box(
                Some(&Aabb::from_point(&proj.point)),
                NodeFields::ID,
                Some(1),
            )?;
            if let Some(n) = hit.first() {
                return Ok(n.id);
            }
        }
        debug!(edge = edge.id, dist = proj.distance, "point splits edge");
        return ModEdgeSplit::new(edge.id, proj.point, false).execute(topo);
    }

    insert_node(topo, None, point, false, find_face)
}

/// Adds a point to the topology, returning the id of the node that
/// represents it.
///
/// An existing node within tolerance is reused; otherwise the closest edge
/// within tolerance is split at the projected point; otherwise an isolated
/// node is created in the face containing the point.
pub struct AddPoint {
    point: Point2,
    tolerance: Option<f64>,
}

impl AddPoint {
    /// Creates a new `AddPoint` operation. Without a tolerance the topology
    /// precision is used, or the minimum tolerance for the point.
    #[must_use]
    pub fn new(point: Point2, tolerance: Option<f64>) -> Self {
        Self { point, tolerance }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if splitting the edge or inserting the node fails.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &mut Topology<B, G>,
    ) -> Result<ElementId> {
        let tol = topo.tolerance(self.tolerance, Some(&Aabb::from_point(&self.point)));
        add_point(topo, self.point, tol, true)
    }
}
