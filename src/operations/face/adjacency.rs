//! Angular ordering of edge ends around a node.

use std::f64::consts::TAU;

use tracing::trace;

use crate::backend::TopologyBackend;
use crate::engine::GeometryEngine;
use crate::error::{GeometryError, Result, TopologyError};
use crate::geometry::LineString;
use crate::math::azimuth::azimuth;
use crate::math::Point2;
use crate::topology::{EdgeFields, ElementId, OrientedEdge, Topology};

/// One end of an edge at a node, with the incident edges found on either
/// side of it.
///
/// Links are oriented as seen from the node: forward for edges starting
/// there, backward for edges ending there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EdgeEnd {
    /// Azimuth of the edge leaving the node.
    pub azimuth: f64,
    /// First edge met turning clockwise.
    pub next_cw: Option<OrientedEdge>,
    /// First edge met turning counterclockwise.
    pub next_ccw: Option<OrientedEdge>,
    /// Face between this end and `next_cw`.
    pub cw_face: Option<ElementId>,
    /// Face between this end and `next_ccw`.
    pub ccw_face: Option<ElementId>,
}

impl EdgeEnd {
    fn new(azimuth: f64) -> Self {
        Self {
            azimuth,
            next_cw: None,
            next_ccw: None,
            cw_face: None,
            ccw_face: None,
        }
    }
}

/// Azimuth from `from` to the first vertex of `points` distinct from it.
fn first_distinct_azimuth<'a>(
    from: &Point2,
    points: impl Iterator<Item = &'a Point2>,
) -> Result<f64> {
    points
        .filter(|p| *p != from)
        .find_map(|p| azimuth(from, p))
        .ok_or_else(|| GeometryError::Degenerate("no two distinct vertices exist".into()).into())
}

/// Builds the start and end edge ends of a curve.
pub(crate) fn edge_ends(line: &LineString) -> Result<(EdgeEnd, EdgeEnd)> {
    let (Some(first), Some(last)) = (line.first(), line.last()) else {
        return Err(GeometryError::Empty("edge geometry").into());
    };
    let start = first_distinct_azimuth(first, line.points().iter())?;
    let end = first_distinct_azimuth(last, line.points().iter().rev())?;
    Ok((EdgeEnd::new(start), EdgeEnd::new(end)))
}

fn clockwise_gap(az: f64, reference: f64) -> f64 {
    let d = az - reference;
    if d < 0.0 {
        d + TAU
    } else {
        d
    }
}

/// Fills in the edges adjacent to `end` around `node`.
///
/// `other` is the opposite end of the same edge when it is closed on
/// `node`. `myself` is left out of the scan; with `None` the edge is new
/// and the faces on both sides must agree. Returns the number of incident
/// edges found.
pub(crate) fn find_adjacent_edges<B: TopologyBackend, G: GeometryEngine>(
    topo: &Topology<B, G>,
    node: ElementId,
    end: &mut EdgeEnd,
    other: Option<&EdgeEnd>,
    myself: Option<ElementId>,
) -> Result<usize> {
    end.next_cw = None;
    end.next_ccw = None;
    end.cw_face = None;
    end.ccw_face = None;

    let mut bounds = other.map(|o| {
        let d = clockwise_gap(o.azimuth, end.azimuth);
        (d, d)
    });

    let mut edges = topo.backend().get_edge_by_node(&[node], EdgeFields::ALL)?;
    edges.sort_by_key(|e| e.id);

    for edge in &edges {
        if Some(edge.id) == myself {
            continue;
        }
        let clean = edge.geom.remove_repeated_points(0.0);
        let pts = clean.points();
        if pts.len() < 2 {
            return Err(GeometryError::Degenerate(format!(
                "edge {} does not have two distinct points",
                edge.id
            ))
            .into());
        }

        let mut ends = Vec::with_capacity(2);
        if edge.start_node == node {
            // Outgoing: the left face lies clockwise of it.
            ends.push((&pts[0], &pts[1], OrientedEdge::forward(edge.id), edge.face_left, edge.face_right));
        }
        if edge.end_node == node {
            let n = pts.len();
            ends.push((&pts[n - 1], &pts[n - 2], OrientedEdge::backward(edge.id), edge.face_right, edge.face_left));
        }

        for (p1, p2, link, cw_face, ccw_face) in ends {
            let az = azimuth(p1, p2).ok_or_else(|| {
                GeometryError::Degenerate(format!("edge {} has a zero-length end segment", edge.id))
            })?;
            let gap = clockwise_gap(az, end.azimuth);
            match bounds {
                None => {
                    bounds = Some((gap, gap));
                    end.next_cw = Some(link);
                    end.next_ccw = Some(link);
                    end.cw_face = Some(cw_face);
                    end.ccw_face = Some(ccw_face);
                }
                Some((min, max)) => {
                    if gap < min {
                        end.next_cw = Some(link);
                        end.cw_face = Some(cw_face);
                        bounds = Some((gap, max));
                    } else if gap > max {
                        end.next_ccw = Some(link);
                        end.ccw_face = Some(ccw_face);
                        bounds = Some((min, gap));
                    }
                }
            }
        }
    }

    trace!(
        node,
        azimuth = end.azimuth,
        cw = ?end.next_cw,
        ccw = ?end.next_ccw,
        "found adjacent edges"
    );

    if myself.is_none() && !edges.is_empty() {
        if let (Some(cw), Some(ccw)) = (end.cw_face, end.ccw_face) {
            if cw != ccw {
                let signed = |l: Option<OrientedEdge>| l.map_or(0, OrientedEdge::signed);
                return Err(TopologyError::AdjacentEdgesBindDifferentFace(
                    signed(end.next_cw),
                    signed(end.next_ccw),
                    cw,
                    ccw,
                )
                .into());
            }
        }
    }
    Ok(edges.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::edit::{AddIsoEdge, AddIsoNode};
    use crate::operations::testing::{line, pt, topology};
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn ends_skip_repeated_vertices() {
        let l = line(&[(0.0, 0.0), (0.0, 0.0), (0.0, 5.0), (5.0, 5.0), (5.0, 5.0)]);
        let (s, e) = edge_ends(&l).unwrap();
        assert_relative_eq!(s.azimuth, 0.0);
        assert_relative_eq!(e.azimuth, 3.0 * FRAC_PI_2);
        assert!(edge_ends(&line(&[(1.0, 1.0), (1.0, 1.0)])).is_err());
    }

    #[test]
    fn lone_edge_is_both_neighbours() {
        let mut topo = topology();
        let a = AddIsoNode::new(None, pt(0.0, 0.0), false).execute(&mut topo).unwrap();
        let b = AddIsoNode::new(None, pt(10.0, 0.0), false).execute(&mut topo).unwrap();
        let e = AddIsoEdge::new(a, b, line(&[(0.0, 0.0), (10.0, 0.0)]))
            .execute(&mut topo)
            .unwrap();

        // A new end pointing north from `a`.
        let mut end = EdgeEnd::new(0.0);
        let n = find_adjacent_edges(&topo, a, &mut end, None, None).unwrap();
        assert_eq!(n, 1);
        assert_eq!(end.next_cw, Some(OrientedEdge::forward(e)));
        assert_eq!(end.next_ccw, Some(OrientedEdge::forward(e)));
        assert_eq!((end.cw_face, end.ccw_face), (Some(0), Some(0)));

        // Seen from `b` the edge arrives, pointing west.
        let mut end = EdgeEnd::new(PI);
        find_adjacent_edges(&topo, b, &mut end, None, None).unwrap();
        assert_eq!(end.next_cw, Some(OrientedEdge::backward(e)));
    }

    #[test]
    fn picks_nearest_on_each_side() {
        let mut topo = topology();
        let c = AddIsoNode::new(None, pt(0.0, 0.0), false).execute(&mut topo).unwrap();
        let mut ids = Vec::new();
        for (x, y) in [(10.0, 0.0), (0.0, -10.0), (-10.0, 0.0)] {
            let n = AddIsoNode::new(None, pt(x, y), false).execute(&mut topo).unwrap();
            // Attach spokes directly: only geometry and nodes matter here.
            let mut edge = crate::topology::Edge::new(c, n, line(&[(0.0, 0.0), (x, y)]));
            edge.face_left = 0;
            edge.face_right = 0;
            topo.backend_mut().insert_edges(std::slice::from_mut(&mut edge)).unwrap();
            ids.push(edge.id);
        }
        // North-east: east spoke is clockwise, west spoke counterclockwise.
        let mut end = EdgeEnd::new(PI / 4.0);
        find_adjacent_edges(&topo, c, &mut end, None, None).unwrap();
        assert_eq!(end.next_cw, Some(OrientedEdge::forward(ids[0])));
        assert_eq!(end.next_ccw, Some(OrientedEdge::forward(ids[2])));
    }

    #[test]
    fn equal_azimuths_resolve_to_lowest_id() {
        let mut topo = topology();
        let c = AddIsoNode::new(None, pt(0.0, 0.0), false).execute(&mut topo).unwrap();
        let far = AddIsoNode::new(None, pt(10.0, 0.0), false).execute(&mut topo).unwrap();
        let bend = AddIsoNode::new(None, pt(5.0, 5.0), false).execute(&mut topo).unwrap();
        // Both leave `c` due east; the higher id is stored first.
        let mut edges = [
            crate::topology::Edge::new(c, far, line(&[(0.0, 0.0), (10.0, 0.0)])),
            crate::topology::Edge::new(c, bend, line(&[(0.0, 0.0), (5.0, 0.0), (5.0, 5.0)])),
        ];
        for (edge, id) in edges.iter_mut().zip([7, 3]) {
            edge.id = id;
            edge.face_left = 0;
            edge.face_right = 0;
        }
        topo.backend_mut().insert_edges(&mut edges).unwrap();

        let mut end = EdgeEnd::new(0.0);
        assert_eq!(find_adjacent_edges(&topo, c, &mut end, None, None).unwrap(), 2);
        assert_eq!(end.next_cw, Some(OrientedEdge::forward(3)));
        assert_eq!(end.next_ccw, Some(OrientedEdge::forward(3)));
    }

    #[test]
    fn empty_node_has_no_neighbours() {
        let mut topo = topology();
        let a = AddIsoNode::new(None, pt(0.0, 0.0), false).execute(&mut topo).unwrap();
        let mut end = EdgeEnd::new(1.0);
        assert_eq!(find_adjacent_edges(&topo, a, &mut end, None, None).unwrap(), 0);
        assert_eq!(end.next_cw, None);
        assert_eq!(end.cw_face, None);
    }
}
