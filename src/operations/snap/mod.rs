//! Snapping free geometry to the edges of a topology.
//!
//! Vertices of nearby edges are added to the input linework where they fall
//! within the snap tolerance of a segment not already lying on an edge;
//! optionally, input vertices close to an edge segment interior are then
//! removed. The two phases repeat until nothing changes when iterating.

use tracing::{debug, trace};

use crate::backend::TopologyBackend;
use crate::engine::GeometryEngine;
use crate::error::Result;
use crate::geometry::{Aabb, LineString, Polygon};
use crate::math::distance_2d::closest_point_on_segment;
use crate::math::{Point2, TOLERANCE};
use crate::topology::{Edge, EdgeFields, Topology};

/// Tuning for [`TopoSnap`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapParams {
    /// Distance within which edge vertices are added to the input.
    pub tolerance_snap: f64,
    /// Distance within which input vertices are dropped onto edges; `None`
    /// skips vertex removal.
    pub tolerance_removal: Option<f64>,
    /// Repeat each phase until it no longer changes the input.
    pub iterate: bool,
}

impl Default for SnapParams {
    fn default() -> Self {
        Self {
            tolerance_snap: 0.0,
            tolerance_removal: None,
            iterate: true,
        }
    }
}

/// Linear geometry accepted by [`TopoSnap`].
#[derive(Debug, Clone, PartialEq)]
pub enum SnapGeometry {
    Line(LineString),
    MultiLine(Vec<LineString>),
    /// Every ring is snapped on its own.
    Polygon(Polygon),
}

impl From<LineString> for SnapGeometry {
    fn from(line: LineString) -> Self {
        Self::Line(line)
    }
}

impl From<Polygon> for SnapGeometry {
    fn from(polygon: Polygon) -> Self {
        Self::Polygon(polygon)
    }
}

/// A topology edge vertex close to a segment of the input.
#[derive(Debug, Clone, Copy)]
struct SnapVertex {
    point: Point2,
    segment: usize,
    dist: f64,
}

/// Closest segment of `points` to `p`, with its distance.
fn closest_segment(p: &Point2, points: &[Point2]) -> Option<(usize, f64)> {
    points
        .windows(2)
        .enumerate()
        .map(|(i, s)| {
            let (c, _) = closest_point_on_segment(p, &s[0], &s[1]);
            (i, (c - p).norm())
        })
        .fold(None, |best: Option<(usize, f64)>, cur| match best {
            Some(b) if b.1 <= cur.1 => Some(b),
            _ => Some(cur),
        })
}

/// Returns `true` if the segment `a → b` lies along `edge`.
fn segment_covered(a: &Point2, b: &Point2, edge: &LineString) -> bool {
    let on_edge = |p: &Point2| {
        closest_segment(p, edge.points()).is_some_and(|(_, d)| d <= TOLERANCE)
    };
    if !on_edge(a) || !on_edge(b) {
        return false;
    }
    // Cut the segment at every edge vertex lying on it and test each piece.
    let mut cuts: Vec<f64> = edge
        .points()
        .iter()
        .filter_map(|v| {
            let (c, t) = closest_point_on_segment(v, a, b);
            ((c - v).norm() <= TOLERANCE && t > 0.0 && t < 1.0).then_some(t)
        })
        .collect();
    cuts.push(0.0);
    cuts.push(1.0);
    cuts.sort_by(f64::total_cmp);
    cuts.windows(2).all(|w| {
        let t = (w[0] + w[1]) * 0.5;
        on_edge(&(*a + (*b - *a) * t))
    })
}

/// Topology edges around the linework being snapped, fetched again only
/// when the linework leaves the last queried box.
struct WorkEdges {
    query: Option<Aabb>,
    edges: Vec<Edge>,
}

impl WorkEdges {
    fn new() -> Self {
        Self {
            query: None,
            edges: Vec::new(),
        }
    }

    fn covering<B: TopologyBackend, G: GeometryEngine>(
        &mut self,
        topo: &Topology<B, G>,
        wanted: &Aabb,
    ) -> Result<&[Edge]> {
        if !self.query.is_some_and(|q| q.contains(wanted)) {
            let query = self.query.map_or(*wanted, |q| q.merged(wanted));
            self.edges = topo.backend().get_edge_within_box(
                Some(&query),
                EdgeFields::ID | EdgeFields::GEOM,
                None,
            )?;
            trace!(edges = self.edges.len(), "refreshed snap work edges");
            self.query = Some(query);
        }
        Ok(&self.edges)
    }
}

struct Snapper<'a, B, G> {
    topo: &'a Topology<B, G>,
    params: SnapParams,
    work: WorkEdges,
}

impl<B: TopologyBackend, G: GeometryEngine> Snapper<'_, B, G> {
    /// Adds one edge vertex to `points`, returning whether it did.
    fn add_one(&mut self, points: &mut Vec<Point2>, extent: &Aabb) -> Result<bool> {
        let ts = self.params.tolerance_snap;
        let edges = self.work.covering(self.topo, extent)?;
        let mut candidates: Vec<SnapVertex> = edges
            .iter()
            .flat_map(|e| e.geom.points().iter())
            .filter(|v| extent.contains_point(v))
            .filter_map(|v| {
                let (segment, dist) = closest_segment(v, points)?;
                (dist <= ts).then_some(SnapVertex {
                    point: *v,
                    segment,
                    dist,
                })
            })
            .collect();
        candidates.sort_by(|a, b| {
            a.dist
                .total_cmp(&b.dist)
                .then(a.point.x.total_cmp(&b.point.x))
                .then(a.point.y.total_cmp(&b.point.y))
        });

        for v in &candidates {
            let (s0, s1) = (points[v.segment], points[v.segment + 1]);
            let (proj, _) = closest_point_on_segment(&v.point, &s0, &s1);
            if proj == s0 || proj == s1 {
                continue;
            }
            if edges.iter().any(|e| segment_covered(&s0, &s1, &e.geom)) {
                continue;
            }
            trace!(x = v.point.x, y = v.point.y, segment = v.segment, "snapped vertex in");
            points.insert(v.segment + 1, v.point);
            return Ok(true);
        }
        Ok(false)
    }

    /// Drops interior vertices close to the interior of an edge segment,
    /// returning how many were removed.
    fn remove(&mut self, points: &mut Vec<Point2>, extent: &Aabb, tr: f64) -> Result<usize> {
        let edges = self.work.covering(self.topo, extent)?;
        let mut removed = 0;
        let mut i = 1;
        while i + 1 < points.len() {
            let v = points[i];
            let closest = edges
                .iter()
                .filter_map(|e| {
                    let (segment, dist) = closest_segment(&v, e.geom.points())?;
                    (dist <= tr).then_some((e, segment, dist))
                })
                .fold(None, |best: Option<(&Edge, usize, f64)>, cur| match best {
                    Some(b) if b.2 <= cur.2 => Some(b),
                    _ => Some(cur),
                });
            if let Some((edge, segment, _)) = closest {
                let pts = edge.geom.points();
                let (e0, e1) = (pts[segment], pts[segment + 1]);
                let (proj, _) = closest_point_on_segment(&v, &e0, &e1);
                if proj != e0 && proj != e1 {
                    trace!(x = v.x, y = v.y, "snapped vertex out");
                    points.remove(i);
                    removed += 1;
                    continue;
                }
            }
            i += 1;
        }
        Ok(removed)
    }

    /// Envelope of `points` grown by the snap tolerance.
    fn extent(&self, points: &[Point2]) -> Option<Aabb> {
        Aabb::from_points(points).map(|b| b.expanded(self.params.tolerance_snap))
    }

    fn snap_points(&mut self, points: &mut Vec<Point2>) -> Result<()> {
        loop {
            while let Some(extent) = self.extent(points) {
                if !self.add_one(points, &extent)? || !self.params.iterate {
                    break;
                }
            }
            let removed = match (self.params.tolerance_removal, self.extent(points)) {
                (Some(tr), Some(extent)) if tr >= 0.0 => self.remove(points, &extent, tr)?,
                _ => 0,
            };
            if removed == 0 || !self.params.iterate {
                return Ok(());
            }
        }
    }

    fn snap_line(&mut self, line: &LineString) -> Result<LineString> {
        let mut points = line.points().to_vec();
        self.snap_points(&mut points)?;
        Ok(LineString::new(points))
    }

    fn snap_ring(&mut self, ring: &[Point2]) -> Result<Vec<Point2>> {
        let mut points = ring.to_vec();
        self.snap_points(&mut points)?;
        Ok(points)
    }
}

/// Snaps linework to the edges of a topology.
pub struct TopoSnap {
    geometry: SnapGeometry,
    params: SnapParams,
}

impl TopoSnap {
    /// Creates a new `TopoSnap` operation.
    #[must_use]
    pub fn new(geometry: impl Into<SnapGeometry>, params: SnapParams) -> Self {
        Self {
            geometry: geometry.into(),
            params,
        }
    }

    /// Executes the operation, returning the snapped copy of the geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to return nearby edges.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &Topology<B, G>,
    ) -> Result<SnapGeometry> {
        let mut snapper = Snapper {
            topo,
            params: self.params,
            work: WorkEdges::new(),
        };
        let out = match &self.geometry {
            SnapGeometry::Line(line) => SnapGeometry::Line(snapper.snap_line(line)?),
            SnapGeometry::MultiLine(lines) => SnapGeometry::MultiLine(
                lines
                    .iter()
                    .map(|l| snapper.snap_line(l))
                    .collect::<Result<_>>()?,
            ),
            SnapGeometry::Polygon(poly) => SnapGeometry::Polygon(Polygon::new(
                snapper.snap_ring(&poly.exterior)?,
                poly.interiors
                    .iter()
                    .map(|r| snapper.snap_ring(r))
                    .collect::<Result<_>>()?,
            )),
        };
        debug!(params = ?self.params, "snapped geometry to topology");
        Ok(out)
    }
}
