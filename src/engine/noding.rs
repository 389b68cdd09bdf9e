use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::geometry::LineString;
use crate::math::distance_2d::closest_point_on_segment;
use crate::math::intersect_2d::{segment_intersection, SegmentIntersection};
use crate::math::{Point2, TOLERANCE};

type VertexKey = (u64, u64);

fn key(p: &Point2) -> VertexKey {
    // Adding zero folds -0.0 into 0.0.
    ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
}

struct Segment {
    a: Point2,
    b: Point2,
    from_line: bool,
    cuts: Vec<(f64, Point2)>,
}

struct Piece {
    a: Point2,
    b: Point2,
    from_line: bool,
}

fn collect_segments(lines: &[LineString], from_line: bool, out: &mut Vec<Segment>) {
    for line in lines {
        for w in line.points().windows(2) {
            if w[0] != w[1] {
                out.push(Segment {
                    a: w[0],
                    b: w[1],
                    from_line,
                    cuts: Vec::new(),
                });
            }
        }
    }
}

/// Splits every line segment wherever it meets another segment, then
/// re-chains the pieces between nodes.
pub(super) fn node_lines(
    lines: &[LineString],
    cutters: &[LineString],
    cut_points: &[Point2],
) -> Vec<LineString> {
    let mut segs = Vec::new();
    collect_segments(lines, true, &mut segs);
    collect_segments(cutters, false, &mut segs);

    // ── intersections ──
    for i in 0..segs.len() {
        for j in (i + 1)..segs.len() {
            if !segs[i].from_line && !segs[j].from_line {
                continue;
            }
            let (a0, a1, b0, b1) = (segs[i].a, segs[i].b, segs[j].a, segs[j].b);
            match segment_intersection(&a0, &a1, &b0, &b1) {
                SegmentIntersection::None => {}
                SegmentIntersection::Point(c) => {
                    segs[i].cuts.push((c.t, c.point));
                    segs[j].cuts.push((c.u, c.point));
                }
                SegmentIntersection::Overlap(c1, c2) => {
                    segs[i].cuts.push((c1.t, c1.point));
                    segs[i].cuts.push((c2.t, c2.point));
                    segs[j].cuts.push((c1.u, c1.point));
                    segs[j].cuts.push((c2.u, c2.point));
                }
            }
        }
    }
    for p in cut_points {
        for s in segs.iter_mut().filter(|s| s.from_line) {
            let (c, t) = closest_point_on_segment(p, &s.a, &s.b);
            if (c - p).norm() <= TOLERANCE {
                s.cuts.push((t, *p));
            }
        }
    }

    // ── pieces, each undirected piece kept once ──
    let mut pieces: Vec<Piece> = Vec::new();
    let mut seen: FxHashMap<(VertexKey, VertexKey), usize> = FxHashMap::default();
    for s in &mut segs {
        s.cuts.sort_by(|x, y| x.0.total_cmp(&y.0));
        let mut chain = vec![s.a];
        for (_, p) in &s.cuts {
            if chain.last() != Some(p) && *p != s.b {
                chain.push(*p);
            }
        }
        chain.push(s.b);
        for w in chain.windows(2) {
            let (ka, kb) = (key(&w[0]), key(&w[1]));
            let undirected = if ka <= kb { (ka, kb) } else { (kb, ka) };
            if let Some(&idx) = seen.get(&undirected) {
                pieces[idx].from_line |= s.from_line;
                continue;
            }
            seen.insert(undirected, pieces.len());
            pieces.push(Piece {
                a: w[0],
                b: w[1],
                from_line: s.from_line,
            });
        }
    }

    // ── nodes: branch points, dead ends, input endpoints ──
    let mut incident: FxHashMap<VertexKey, Vec<usize>> = FxHashMap::default();
    for (i, pc) in pieces.iter().enumerate() {
        incident.entry(key(&pc.a)).or_default().push(i);
        incident.entry(key(&pc.b)).or_default().push(i);
    }
    let mut nodes: FxHashSet<VertexKey> = incident
        .iter()
        .filter(|(_, v)| v.len() != 2)
        .map(|(k, _)| *k)
        .collect();
    for line in lines.iter().chain(cutters) {
        nodes.extend(line.first().map(key));
        nodes.extend(line.last().map(key));
    }
    nodes.extend(cut_points.iter().map(key));

    // ── chain pieces between nodes, in input order ──
    let mut used = vec![false; pieces.len()];
    let mut out = Vec::new();
    for start in 0..pieces.len() {
        if used[start] || !pieces[start].from_line {
            continue;
        }
        used[start] = true;
        let mut chain = vec![pieces[start].a, pieces[start].b];
        extend_chain(&mut chain, &pieces, &incident, &nodes, &mut used);
        chain.reverse();
        extend_chain(&mut chain, &pieces, &incident, &nodes, &mut used);
        chain.reverse();
        out.push(LineString::new(chain));
    }
    trace!(input = lines.len(), output = out.len(), "noded lines");
    out
}

/// Appends pieces to the end of `chain` until a node is reached.
fn extend_chain(
    chain: &mut Vec<Point2>,
    pieces: &[Piece],
    incident: &FxHashMap<VertexKey, Vec<usize>>,
    nodes: &FxHashSet<VertexKey>,
    used: &mut [bool],
) {
    while let Some(end) = chain.last().copied() {
        let k = key(&end);
        if nodes.contains(&k) {
            return;
        }
        let next = incident
            .get(&k)
            .and_then(|v| v.iter().copied().find(|&i| !used[i] && pieces[i].from_line));
        let Some(i) = next else { return };
        used[i] = true;
        let other = if key(&pieces[i].a) == k {
            pieces[i].b
        } else {
            pieces[i].a
        };
        chain.push(other);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(coords: &[(f64, f64)]) -> LineString {
        LineString::from_coords(coords)
    }

    #[test]
    fn self_crossing_line_is_split() {
        // A bow tie crossing itself at (5, 5).
        let bow = line(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)]);
        let out = node_lines(&[bow], &[], &[]);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], line(&[(0.0, 0.0), (5.0, 5.0)]));
        assert_eq!(out[1], line(&[(5.0, 5.0), (10.0, 10.0), (10.0, 0.0), (5.0, 5.0)]));
        assert_eq!(out[2], line(&[(5.0, 5.0), (0.0, 10.0)]));
    }

    #[test]
    fn cutter_splits_without_being_emitted() {
        let l = line(&[(0.0, 0.0), (10.0, 0.0)]);
        let cutter = line(&[(5.0, -5.0), (5.0, 5.0)]);
        let out = node_lines(&[l], &[cutter], &[]);
        assert_eq!(out, vec![line(&[(0.0, 0.0), (5.0, 0.0)]), line(&[(5.0, 0.0), (10.0, 0.0)])]);
    }

    #[test]
    fn shared_stretch_emitted_once() {
        let a = line(&[(0.0, 0.0), (10.0, 0.0)]);
        let b = line(&[(5.0, 0.0), (15.0, 0.0)]);
        let out = node_lines(&[a, b], &[], &[]);
        assert_eq!(out.len(), 3);
        assert_eq!(out[1], line(&[(5.0, 0.0), (10.0, 0.0)]));
    }

    #[test]
    fn cut_point_splits_line() {
        let l = line(&[(0.0, 0.0), (10.0, 0.0)]);
        let out = node_lines(&[l], &[], &[Point2::new(3.0, 0.0)]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].last(), Some(&Point2::new(3.0, 0.0)));
    }

    #[test]
    fn vertices_without_branching_stay_joined() {
        let l = line(&[(0.0, 0.0), (5.0, 1.0), (10.0, 0.0)]);
        let out = node_lines(&[l.clone()], &[], &[]);
        assert_eq!(out, vec![l]);
    }
}
