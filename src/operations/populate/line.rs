use tracing::{debug, warn};

use crate::backend::TopologyBackend;
use crate::engine::GeometryEngine;
use crate::error::{Result, TopologyError};
use crate::geometry::LineString;
use crate::operations::face::{add_edge, FaceMode};
use crate::topology::{EdgeFields, ElementId, FaceFields, NodeFields, Topology};

use super::point::add_point;

/// Id of a stored edge covering the same point set as `line`.
fn equal_edge<B: TopologyBackend, G: GeometryEngine>(
    topo: &Topology<B, G>,
    line: &LineString,
) -> Result<Option<ElementId>> {
    let Some(bbox) = line.bbox() else {
        return Ok(None);
    };
    let candidates = topo.backend().get_edge_within_box(
        Some(&bbox),
        EdgeFields::ID | EdgeFields::GEOM,
        None,
    )?;
    Ok(candidates
        .iter()
        .find(|e| topo.engine().lines_equal(&e.geom, line))
        .map(|e| e.id))
}

/// Adds one piece of already noded linework as an edge, reusing an equal
/// stored edge. Returns `None` when the piece collapses once its ends are
/// snapped to their nodes.
fn add_line_edge<B: TopologyBackend, G: GeometryEngine>(
    topo: &mut Topology<B, G>,
    piece: &LineString,
    tol: f64,
    split_faces: bool,
) -> Result<Option<ElementId>> {
    let (Some(&first), Some(&last)) = (piece.first(), piece.last()) else {
        warn!("empty component of noded line");
        return Ok(None);
    };
    let start = add_point(topo, first, tol, split_faces)?;
    let end = add_point(topo, last, tol, split_faces)?;

    let ids: &[ElementId] = if start == end { &[start] } else { &[start, end] };
    let nodes = topo.nodes_by_id(ids, NodeFields::ID | NodeFields::GEOM)?;
    let geom_of = |id: ElementId| {
        nodes
            .iter()
            .find(|n| n.id == id)
            .map(|n| n.geom)
            .ok_or(TopologyError::NonExistentNode(id))
    };
    let (start_pt, end_pt) = (geom_of(start)?, geom_of(end)?);

    // Node snapping may have moved the ends.
    let mut points = piece.points().to_vec();
    let n = points.len();
    points[0] = start_pt;
    points[n - 1] = end_pt;
    let mut edge = LineString::new(points).remove_repeated_points(0.0);
    if edge.distinct_len() < 2 || (edge.is_closed() && edge.distinct_len() < 3) {
        warn!(start, end, "noded piece collapsed");
        return Ok(None);
    }

    if let Some(id) = equal_edge(topo, &edge)? {
        return Ok(Some(id));
    }
    if tol > 0.0 {
        edge = edge.remove_repeated_points(tol);
        if let Some(id) = equal_edge(topo, &edge)? {
            return Ok(Some(id));
        }
    }

    let mode = if split_faces {
        FaceMode::Modify
    } else {
        FaceMode::Ignore
    };
    add_edge(topo, start, end, &edge, false, mode).map(Some)
}

/// Nodes `line` against itself and the topology and stores every piece as
/// an edge, returning the ids of the edges it now consists of.
pub(crate) fn add_line<B: TopologyBackend, G: GeometryEngine>(
    topo: &mut Topology<B, G>,
    line: &LineString,
    tolerance: Option<f64>,
    split_faces: bool,
) -> Result<Vec<ElementId>> {
    let Some(bbox) = line.bbox() else {
        return Ok(Vec::new());
    };
    let tol = topo.tolerance(tolerance, Some(&bbox));
    let clean = if tol > 0.0 {
        line.remove_repeated_points(tol)
    } else {
        line.clone()
    };

    let engine = topo.engine();
    let mut noded = engine.node_lines(&[clean], &[], &[]);
    let query = bbox.expanded(tol);
    let close = |d: f64| d == 0.0 || d < tol;

    let nearby: Vec<LineString> = topo
        .backend()
        .get_edge_within_box(Some(&query), EdgeFields::ID | EdgeFields::GEOM, None)?
        .into_iter()
        .filter(|e| {
            noded
                .iter()
                .any(|piece| close(engine.distance_line_line(&e.geom, piece)))
        })
        .map(|e| e.geom)
        .collect();
    if !nearby.is_empty() {
        debug!(edges = nearby.len(), tol, "snapping line to edges");
        let snapped: Vec<LineString> = noded
            .iter()
            .map(|piece| engine.snap_line(piece, &nearby, tol))
            .collect();
        noded = engine.node_lines(&snapped, &nearby, &[]);
    }

    let nodes = topo.backend().get_node_within_box(
        Some(&query),
        NodeFields::ID | NodeFields::GEOM,
        None,
    )?;
    let near_nodes: Vec<LineString> = nodes
        .iter()
        .filter(|n| {
            noded
                .iter()
                .any(|piece| close(engine.distance_point_line(&n.geom, piece)))
        })
        .map(|n| LineString::new(vec![n.geom]))
        .collect();
    if !near_nodes.is_empty() {
        debug!(nodes = near_nodes.len(), tol, "snapping line to nodes");
        let snapped: Vec<LineString> = noded
            .iter()
            .map(|piece| engine.snap_line(piece, &near_nodes, tol))
            .collect();
        let cut_points: Vec<_> = near_nodes.iter().filter_map(|n| n.first().copied()).collect();
        noded = engine.node_lines(&snapped, &[], &cut_points);
    }

    let mut ids = Vec::with_capacity(noded.len());
    for piece in &noded {
        if let Some(id) = add_line_edge(topo, piece, tol, split_faces)? {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    debug!(pieces = noded.len(), edges = ids.len(), "added line");
    Ok(ids)
}

/// Adds a line to the topology, splitting faces as it closes rings.
///
/// Returns the ids of the edges that make up the line, new or existing.
pub struct AddLine {
    line: LineString,
    tolerance: Option<f64>,
}

impl AddLine {
    /// Creates a new `AddLine` operation.
    #[must_use]
    pub fn new(line: LineString, tolerance: Option<f64>) -> Self {
        Self { line, tolerance }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if a piece of the line cannot be added as an edge.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &mut Topology<B, G>,
    ) -> Result<Vec<ElementId>> {
        add_line(topo, &self.line, self.tolerance, true)
    }
}

/// Adds a line without maintaining faces. The topology must have no face
/// yet; run [`Polygonize`](crate::operations::polygonize::Polygonize)
/// once all lines are in.
pub struct AddLineNoFace {
    line: LineString,
    tolerance: Option<f64>,
}

impl AddLineNoFace {
    /// Creates a new `AddLineNoFace` operation.
    #[must_use]
    pub fn new(line: LineString, tolerance: Option<f64>) -> Self {
        Self { line, tolerance }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::FacesAlreadyExist`] if the topology has a
    /// face, or any error from adding the edges.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &mut Topology<B, G>,
    ) -> Result<Vec<ElementId>> {
        if !topo
            .backend()
            .get_face_within_box(None, FaceFields::ID, Some(1))?
            .is_empty()
        {
            return Err(TopologyError::FacesAlreadyExist.into());
        }
        add_line(topo, &self.line, self.tolerance, false)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::query::GetFaceGeometry;
    use crate::operations::testing::{line, topology};
    use crate::TopolisError;

    #[test]
    fn open_line_becomes_one_edge() {
        let mut topo = topology();
        let ids = AddLine::new(line(&[(0.0, 0.0), (5.0, 0.0), (5.0, 5.0)]), Some(0.0))
            .execute(&mut topo)
            .unwrap();
        assert_eq!(ids, vec![1]);
        assert_eq!(topo.backend().nodes().count(), 2);
        assert_eq!(topo.backend().faces().count(), 0);
    }

    #[test]
    fn closed_line_creates_face() {
        let mut topo = topology();
        let ring = line(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]);
        let ids = AddLine::new(ring, Some(0.0)).execute(&mut topo).unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(topo.backend().faces().count(), 1);
        let poly = GetFaceGeometry::new(1).execute(&topo).unwrap();
        assert!((poly.area() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn repeated_line_reuses_edges() {
        let mut topo = topology();
        let l = line(&[(0.0, 0.0), (5.0, 0.0), (5.0, 5.0)]);
        let first = AddLine::new(l.clone(), Some(0.0)).execute(&mut topo).unwrap();
        let again = AddLine::new(l.reversed(), Some(0.0)).execute(&mut topo).unwrap();
        assert_eq!(first, again);
        assert_eq!(topo.backend().edges().count(), 1);
    }

    #[test]
    fn crossing_lines_are_noded() {
        let mut topo = topology();
        AddLine::new(line(&[(0.0, 5.0), (10.0, 5.0)]), Some(0.0))
            .execute(&mut topo)
            .unwrap();
        let ids = AddLine::new(line(&[(5.0, 0.0), (5.0, 10.0)]), Some(0.0))
            .execute(&mut topo)
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(topo.backend().edges().count(), 4);
        assert_eq!(topo.backend().nodes().count(), 5);
    }

    #[test]
    fn line_snaps_to_nearby_node() {
        let mut topo = topology();
        AddLine::new(line(&[(0.0, 0.0), (10.0, 0.0)]), Some(0.0))
            .execute(&mut topo)
            .unwrap();
        AddLine::new(line(&[(10.2, 0.1), (10.0, 10.0)]), Some(0.5))
            .execute(&mut topo)
            .unwrap();
        assert_eq!(topo.backend().nodes().count(), 3);
        let e = topo.edge(2).unwrap();
        assert_eq!(e.start_node, topo.edge(1).unwrap().end_node);
    }

    #[test]
    fn no_face_mode_refuses_existing_faces() {
        let mut topo = topology();
        let ring = line(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 0.0)]);
        AddLine::new(ring, Some(0.0)).execute(&mut topo).unwrap();
        let err = AddLineNoFace::new(line(&[(20.0, 0.0), (30.0, 0.0)]), Some(0.0))
            .execute(&mut topo)
            .unwrap_err();
        assert!(matches!(err, TopolisError::Topology(TopologyError::FacesAlreadyExist)));
    }

    #[test]
    fn no_face_mode_leaves_faces_unset() {
        let mut topo = topology();
        let ring = line(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 0.0)]);
        let ids = AddLineNoFace::new(ring, Some(0.0)).execute(&mut topo).unwrap();
        let e = topo.edge(ids[0]).unwrap();
        assert_eq!((e.face_left, e.face_right), (-1, -1));
        assert_eq!(topo.backend().faces().count(), 0);
    }
}
