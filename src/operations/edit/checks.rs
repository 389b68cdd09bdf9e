use tracing::trace;

use crate::backend::TopologyBackend;
use crate::engine::{GeometryEngine, LineRelation};
use crate::error::{GeometryError, Result, TopologyError};
use crate::geometry::LineString;
use crate::math::Point2;
use crate::topology::{EdgeFields, ElementId, Node, NodeFields, Topology};

/// Rejects curves that cannot become an edge: collapsed or self-intersecting.
pub(crate) fn validate_curve<G: GeometryEngine>(engine: &G, geom: &LineString) -> Result<()> {
    if geom.distinct_len() < 2 {
        return Err(GeometryError::Degenerate("no two distinct vertices exist".into()).into());
    }
    if !engine.is_simple(geom) {
        return Err(GeometryError::NotSimple("curve").into());
    }
    Ok(())
}

/// Checks that the curve starts on `start` and ends on `end`.
pub(crate) fn check_endpoints(geom: &LineString, start: &Node, end: &Node) -> Result<()> {
    if geom.first() != Some(&start.geom) {
        return Err(TopologyError::StartNodeMismatch.into());
    }
    if geom.last() != Some(&end.geom) {
        return Err(TopologyError::EndNodeMismatch.into());
    }
    Ok(())
}

pub(crate) fn exists_coincident_node<B: TopologyBackend, G: GeometryEngine>(
    topo: &Topology<B, G>,
    pt: &Point2,
) -> Result<bool> {
    let nodes = topo
        .backend()
        .get_node_within_distance(pt, 0.0, NodeFields::ID, Some(1))?;
    Ok(!nodes.is_empty())
}

pub(crate) fn exists_edge_intersecting_point<B: TopologyBackend, G: GeometryEngine>(
    topo: &Topology<B, G>,
    pt: &Point2,
) -> Result<bool> {
    let edges = topo
        .backend()
        .get_edge_within_distance(pt, 0.0, EdgeFields::ID, Some(1))?;
    Ok(!edges.is_empty())
}

/// Checks that a candidate curve neither passes through a node other than
/// its endpoints nor meets the interior of an existing edge.
///
/// `myself` names an edge to leave out, for in-place geometry changes.
pub(crate) fn check_edge_crossing<B: TopologyBackend, G: GeometryEngine>(
    topo: &Topology<B, G>,
    start_node: ElementId,
    end_node: ElementId,
    geom: &LineString,
    myself: Option<ElementId>,
) -> Result<()> {
    let bbox = geom.bbox().ok_or(GeometryError::Empty("edge geometry"))?;
    let engine = topo.engine();

    let nodes = topo
        .backend()
        .get_node_within_box(Some(&bbox), NodeFields::ID | NodeFields::GEOM, None)?;
    for node in &nodes {
        if node.id == start_node || node.id == end_node {
            continue;
        }
        if engine.line_interior_contains(geom, &node.geom) {
            return Err(TopologyError::GeometryCrossesNode(node.id).into());
        }
    }

    let edges = topo
        .backend()
        .get_edge_within_box(Some(&bbox), EdgeFields::ID | EdgeFields::GEOM, None)?;
    for edge in &edges {
        if Some(edge.id) == myself {
            continue;
        }
        match engine.relate_lines(&edge.geom, geom) {
            LineRelation::Disjoint => {}
            LineRelation::Equal => return Err(TopologyError::CoincidentEdge(edge.id).into()),
            LineRelation::Overlap => {
                return Err(TopologyError::EdgeIntersectsEdge(edge.id).into())
            }
            LineRelation::Cross => return Err(TopologyError::EdgeCrossesEdge(edge.id).into()),
        }
    }
    trace!(nodes = nodes.len(), edges = edges.len(), "edge crossing check passed");
    Ok(())
}
