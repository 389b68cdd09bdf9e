use tracing::debug;

use crate::backend::TopologyBackend;
use crate::engine::GeometryEngine;
use crate::error::{GeometryError, Result, TopologyError};
use crate::geometry::LineString;
use crate::math::polygon_2d::{is_ccw, Location};
use crate::math::Point2;
use crate::operations::face::adjacency::{edge_ends, find_adjacent_edges, EdgeEnd};
use crate::operations::query::GetFaceGeometry;
use crate::topology::{Edge, EdgeFields, ElementId, Face, NodeFields, Topology};

use super::checks::check_edge_crossing;

/// Ring swept by an edge: the edge closed back onto its first vertex.
fn motion_ring(geom: &LineString) -> Vec<Point2> {
    let mut ring = geom.points().to_vec();
    if !geom.is_closed() {
        if let Some(first) = geom.first() {
            ring.push(*first);
        }
    }
    ring
}

/// Neighbours of both ends of an edge shaped like `geom`.
fn disposition<B: TopologyBackend, G: GeometryEngine>(
    topo: &Topology<B, G>,
    edge: &Edge,
    geom: &LineString,
) -> Result<(EdgeEnd, EdgeEnd)> {
    let (mut start, mut end) = edge_ends(geom)?;
    let closed = edge.is_closed();
    let end_copy = end;
    find_adjacent_edges(
        topo,
        edge.start_node,
        &mut start,
        closed.then_some(&end_copy),
        Some(edge.id),
    )?;
    let start_copy = start;
    find_adjacent_edges(
        topo,
        edge.end_node,
        &mut end,
        closed.then_some(&start_copy),
        Some(edge.id),
    )?;
    Ok((start, end))
}

/// Replaces the geometry of an edge without changing the topology.
pub struct ChangeEdgeGeom {
    edge: ElementId,
    geom: LineString,
}

impl ChangeEdgeGeom {
    /// Creates a new `ChangeEdgeGeom` operation.
    #[must_use]
    pub fn new(edge: ElementId, geom: LineString) -> Self {
        Self { edge, geom }
    }

    /// Executes the operation.
    ///
    /// The new curve must keep the end points, cross nothing, sweep over no
    /// node, and leave the edge in the same angular position at both ends.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first violated condition; the
    /// topology is left untouched in that case.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &mut Topology<B, G>,
    ) -> Result<()> {
        if !topo.engine().is_simple(&self.geom) {
            return Err(GeometryError::NotSimple("curve").into());
        }
        let old = topo.edge(self.edge)?;

        if self.geom.first() != old.geom.first() {
            return Err(TopologyError::StartNodeMismatch.into());
        }
        if old.geom.len() < 2 {
            return Err(GeometryError::Degenerate(format!(
                "edge {} has less than 2 vertices",
                old.id
            ))
            .into());
        }
        if self.geom.len() < 2 {
            return Err(GeometryError::Degenerate("less than 2 vertices".into()).into());
        }
        if self.geom.last() != old.geom.last() {
            return Err(TopologyError::EndNodeMismatch.into());
        }

        let closed = old.is_closed();
        if closed {
            if self.geom.distinct_len() < 2 {
                return Err(
                    GeometryError::Degenerate("no two distinct vertices exist".into()).into(),
                );
            }
            if is_ccw(old.geom.points()) != is_ccw(self.geom.points()) {
                return Err(TopologyError::EdgeTwist(old.id).into());
            }
        }

        check_edge_crossing(topo, old.start_node, old.end_node, &self.geom, Some(old.id))?;

        // No node may change side of the area swept by the edge.
        let (Some(old_box), Some(new_box)) = (old.geom.bbox(), self.geom.bbox()) else {
            return Err(GeometryError::Empty("edge geometry").into());
        };
        let motion_box = old_box.merged(&new_box);
        let nodes = topo
            .backend()
            .get_node_within_box(Some(&motion_box), NodeFields::ID | NodeFields::GEOM, None)?;
        let old_ring = motion_ring(&old.geom);
        let new_ring = motion_ring(&self.geom);
        for node in nodes.iter().filter(|n| !old.touches(n.id)) {
            let engine = topo.engine();
            let was_inside = engine.locate_in_ring(&node.geom, &old_ring) == Location::Inside;
            let is_inside = engine.locate_in_ring(&node.geom, &new_ring) == Location::Inside;
            if was_inside != is_inside {
                return Err(TopologyError::EdgeMotionCollision(node.id).into());
            }
        }

        let (start_pre, end_pre) = disposition(topo, &old, &old.geom)?;
        let (start_post, end_post) = disposition(topo, &old, &self.geom)?;
        if start_pre.next_cw != start_post.next_cw || start_pre.next_ccw != start_post.next_ccw {
            return Err(TopologyError::EdgeChangedDisposition("start").into());
        }
        if end_pre.next_cw != end_post.next_cw || end_pre.next_ccw != end_post.next_ccw {
            return Err(TopologyError::EdgeChangedDisposition("end").into());
        }

        let updated = Edge {
            id: old.id,
            geom: self.geom.clone(),
            ..Edge::default()
        };
        let n = topo
            .backend_mut()
            .update_edges_by_id(&[updated], EdgeFields::GEOM)?;
        if n != 1 {
            return Err(TopologyError::UnexpectedCount {
                what: "updated edge",
                count: n,
                expected: 1,
            }
            .into());
        }

        let mut faces = Vec::with_capacity(2);
        for face in [old.face_left, old.face_right] {
            if face > 0 && !faces.iter().any(|f: &Face| f.id == face) {
                let polygon = GetFaceGeometry::new(face).execute(topo)?;
                faces.push(Face {
                    id: face,
                    mbr: polygon.bbox(),
                });
            }
        }
        if !faces.is_empty() {
            topo.backend_mut().update_faces_by_id(&faces)?;
        }

        debug!(edge = old.id, faces = faces.len(), "changed edge geometry");
        Ok(())
    }
}
