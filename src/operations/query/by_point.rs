use crate::backend::TopologyBackend;
use crate::engine::GeometryEngine;
use crate::error::{Result, TopologyError};
use crate::math::Point2;
use crate::topology::{EdgeFields, ElementId, NodeFields, Topology, UNIVERSE_FACE};

/// Finds the node within a distance of a point.
pub struct GetNodeByPoint {
    point: Point2,
    tolerance: f64,
}

impl GetNodeByPoint {
    /// Creates a new `GetNodeByPoint` query.
    #[must_use]
    pub fn new(point: Point2, tolerance: f64) -> Self {
        Self { point, tolerance }
    }

    /// Executes the query, returning `None` when no node is close enough.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::MultipleFound`] if more than one node is
    /// within the tolerance.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &Topology<B, G>,
    ) -> Result<Option<ElementId>> {
        let nodes = topo.backend().get_node_within_distance(
            &self.point,
            self.tolerance,
            NodeFields::ID,
            None,
        )?;
        match nodes.as_slice() {
            [] => Ok(None),
            [n] => Ok(Some(n.id)),
            _ => Err(TopologyError::MultipleFound("nodes").into()),
        }
    }
}

/// Finds the edge within a distance of a point.
pub struct GetEdgeByPoint {
    point: Point2,
    tolerance: f64,
}

impl GetEdgeByPoint {
    /// Creates a new `GetEdgeByPoint` query.
    #[must_use]
    pub fn new(point: Point2, tolerance: f64) -> Self {
        Self { point, tolerance }
    }

    /// Executes the query, returning `None` when no edge is close enough.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::MultipleFound`] if more than one edge is
    /// within the tolerance.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &Topology<B, G>,
    ) -> Result<Option<ElementId>> {
        let edges = topo.backend().get_edge_within_distance(
            &self.point,
            self.tolerance,
            EdgeFields::ID,
            None,
        )?;
        match edges.as_slice() {
            [] => Ok(None),
            [e] => Ok(Some(e.id)),
            _ => Err(TopologyError::MultipleFound("edges").into()),
        }
    }
}

/// Finds the face containing a point, or bounded by an edge near it.
pub struct GetFaceByPoint {
    point: Point2,
    tolerance: f64,
}

impl GetFaceByPoint {
    /// Creates a new `GetFaceByPoint` query.
    #[must_use]
    pub fn new(point: Point2, tolerance: f64) -> Self {
        Self { point, tolerance }
    }

    /// Executes the query.
    ///
    /// A point strictly inside a face returns that face. Otherwise edges
    /// within the tolerance name the face: dangling edges are ignored, and an
    /// edge bounding the universal face on one side names the other side.
    /// Returns 0 when nothing is found.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::MultipleFound`] if the nearby edges name
    /// different faces or bound two real faces.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &Topology<B, G>,
    ) -> Result<ElementId> {
        if let Some(face) = topo.backend().get_face_containing_point(&self.point)? {
            return Ok(face);
        }
        let fields = EdgeFields::ID | EdgeFields::FACE_LEFT | EdgeFields::FACE_RIGHT;
        let edges =
            topo.backend()
                .get_edge_within_distance(&self.point, self.tolerance, fields, None)?;
        let mut found = UNIVERSE_FACE;
        for e in edges.iter().filter(|e| !e.is_dangling()) {
            let face = if e.face_left == UNIVERSE_FACE {
                e.face_right
            } else if e.face_right == UNIVERSE_FACE {
                e.face_left
            } else {
                return Err(TopologyError::MultipleFound("faces").into());
            };
            if found != UNIVERSE_FACE && found != face {
                return Err(TopologyError::MultipleFound("faces").into());
            }
            found = face;
        }
        Ok(found)
    }
}
