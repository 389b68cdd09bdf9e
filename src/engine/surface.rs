use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};
use spade::handles::{FixedFaceHandle, InnerTag};
use spade::{ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation};

use crate::error::{GeometryError, Result};
use crate::geometry::Polygon;
use crate::math::Point2;

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Interior point of a polygon: the centroid of the largest triangle of its
/// constrained Delaunay triangulation.
pub(super) fn point_on_surface(polygon: &Polygon) -> Result<Option<Point2>> {
    if polygon.is_empty() {
        return Ok(None);
    }
    let mut cdt = Cdt::new();
    for ring in polygon.rings() {
        insert_constraint_ring(&mut cdt, ring)?;
    }
    let interior = classify_interior_faces(&cdt);

    let mut best: Option<(f64, Point2)> = None;
    for face in cdt.inner_faces() {
        if !interior.contains(&face.fix().index()) {
            continue;
        }
        let [a, b, c] = face.vertices().map(|v| v.position());
        let area = ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)).abs() * 0.5;
        if best.map_or(true, |(best_area, _)| area > best_area) {
            let centroid = Point2::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0);
            best = Some((area, centroid));
        }
    }
    Ok(best.filter(|(area, _)| *area > 0.0).map(|(_, p)| p))
}

/// Inserts a closed ring as a loop of constraint edges.
fn insert_constraint_ring(cdt: &mut Cdt, ring: &[Point2]) -> Result<()> {
    // Rings repeat their first vertex at the end.
    let open = match ring.split_last() {
        Some((last, rest)) if Some(last) == rest.first() => rest,
        _ => ring,
    };
    if open.len() < 3 {
        return Err(GeometryError::Degenerate("ring needs at least 3 distinct vertices".into()).into());
    }

    let mut handles = Vec::with_capacity(open.len());
    for p in open {
        let h = cdt
            .insert(SpadePoint2::new(p.x, p.y))
            .map_err(|e: InsertionError| GeometryError::InvalidInput(format!("CDT insert: {e}")))?;
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from != to {
            cdt.add_constraint(from, to);
        }
    }
    Ok(())
}

/// Flood-fills the triangulation from the outer face, counting crossed
/// constraint edges. Faces at odd depth are inside the polygon.
fn classify_interior_faces(cdt: &Cdt) -> FxHashSet<usize> {
    let mut interior = FxHashSet::default();
    let mut depth_map: FxHashMap<usize, u32> = FxHashMap::default();
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();
    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer_fix {
            continue;
        }
        if let Some(inner) = edge.rev().face().as_inner() {
            let idx = inner.fix().index();
            if depth_map.contains_key(&idx) {
                continue;
            }
            let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(idx, depth);
            if depth % 2 == 1 {
                interior.insert(idx);
            }
            queue.push_back((inner.fix(), depth));
        }
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        for edge in cdt.face(face_fix).adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let idx = neighbor.fix().index();
            if depth_map.contains_key(&idx) {
                continue;
            }
            let next = depth + u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(idx, next);
            if next % 2 == 1 {
                interior.insert(idx);
            }
            queue.push_back((neighbor.fix(), next));
        }
    }
    interior
}
