use super::{cross_2d, Point2, Vector2, TOLERANCE};

/// One end of a segment/segment contact: the contact point and its
/// parameters along both segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentContact {
    pub point: Point2,
    /// Parameter along the first segment, in `[0, 1]`.
    pub t: f64,
    /// Parameter along the second segment, in `[0, 1]`.
    pub u: f64,
}

/// Result of intersecting two bounded segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentIntersection {
    None,
    Point(SegmentContact),
    /// Collinear overlap of positive length, ordered along the first segment.
    Overlap(SegmentContact, SegmentContact),
}

/// Signed orientation of `c` relative to the directed line `a → b`.
///
/// Positive when `c` is to the left, negative when to the right.
#[must_use]
pub fn orient_2d(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    cross_2d(&(b - a), &(c - a))
}

/// Snaps a parameter to 0 or 1 when it lies within tolerance of them.
fn snap_param(t: f64) -> f64 {
    if t.abs() <= TOLERANCE {
        0.0
    } else if (t - 1.0).abs() <= TOLERANCE {
        1.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

/// Point at parameter `t`, returning the exact endpoint for `t` of 0 or 1.
fn point_on(a0: &Point2, a1: &Point2, t: f64) -> Point2 {
    if t == 0.0 {
        *a0
    } else if t == 1.0 {
        *a1
    } else {
        a0 + (a1 - a0) * t
    }
}

/// Parameter of the projection of `p` on the segment `a0 → a1` (unclamped).
fn project_param(p: &Point2, a0: &Point2, a1: &Point2) -> f64 {
    let d = a1 - a0;
    let len_sq = d.norm_squared();
    if len_sq == 0.0 {
        return 0.0;
    }
    (p - a0).dot(&d) / len_sq
}

fn contact(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2, t: f64, u: f64) -> SegmentContact {
    let t = snap_param(t);
    let u = snap_param(u);
    // Prefer exact vertex coordinates over interpolated ones.
    let point = if t == 0.0 || t == 1.0 {
        point_on(a0, a1, t)
    } else if u == 0.0 || u == 1.0 {
        point_on(b0, b1, u)
    } else {
        point_on(a0, a1, t)
    };
    SegmentContact { point, t, u }
}

/// Bounded segment-segment intersection in 2D, including collinear overlaps.
///
/// Zero-length segments are treated as points.
#[must_use]
pub fn segment_intersection(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> SegmentIntersection {
    let da: Vector2 = a1 - a0;
    let db: Vector2 = b1 - b0;
    let len_a = da.norm();
    let len_b = db.norm();

    if len_a == 0.0 || len_b == 0.0 {
        return degenerate_intersection(a0, a1, b0, b1, len_a, len_b);
    }

    let denom = cross_2d(&da, &db);
    if denom.abs() > TOLERANCE * len_a * len_b {
        let w = b0 - a0;
        let t = cross_2d(&w, &db) / denom;
        let u = cross_2d(&w, &da) / denom;
        let eps = TOLERANCE;
        if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
            return SegmentIntersection::Point(contact(a0, a1, b0, b1, t, u));
        }
        return SegmentIntersection::None;
    }

    // Parallel: only collinear segments can touch.
    let off = cross_2d(&da, &(b0 - a0)) / len_a;
    if off.abs() > TOLERANCE * len_a.max(1.0) {
        return SegmentIntersection::None;
    }

    let tb0 = project_param(b0, a0, a1);
    let tb1 = project_param(b1, a0, a1);
    let lo = tb0.min(tb1).max(0.0);
    let hi = tb0.max(tb1).min(1.0);
    if lo > hi + TOLERANCE {
        return SegmentIntersection::None;
    }
    let start = overlap_end(a0, a1, b0, b1, lo);
    if hi - lo <= TOLERANCE {
        return SegmentIntersection::Point(start);
    }
    let end = overlap_end(a0, a1, b0, b1, hi);
    SegmentIntersection::Overlap(start, end)
}

fn overlap_end(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2, t: f64) -> SegmentContact {
    let t = snap_param(t);
    let p = point_on(a0, a1, t);
    let u = snap_param(project_param(&p, b0, b1));
    let point = if t == 0.0 || t == 1.0 {
        p
    } else if u == 0.0 || u == 1.0 {
        point_on(b0, b1, u)
    } else {
        p
    };
    SegmentContact { point, t, u }
}

fn degenerate_intersection(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
    len_a: f64,
    len_b: f64,
) -> SegmentIntersection {
    if len_a == 0.0 && len_b == 0.0 {
        if a0 == b0 {
            return SegmentIntersection::Point(SegmentContact {
                point: *a0,
                t: 0.0,
                u: 0.0,
            });
        }
        return SegmentIntersection::None;
    }
    if len_a == 0.0 {
        let u = project_param(a0, b0, b1);
        let foot = b0 + (b1 - b0) * u.clamp(0.0, 1.0);
        if (a0 - foot).norm() <= TOLERANCE * len_b.max(1.0) {
            let u = snap_param(u);
            return SegmentIntersection::Point(SegmentContact { point: *a0, t: 0.0, u });
        }
        return SegmentIntersection::None;
    }
    match degenerate_intersection(b0, b1, a0, a1, len_b, len_a) {
        SegmentIntersection::Point(c) => SegmentIntersection::Point(SegmentContact {
            point: c.point,
            t: c.u,
            u: c.t,
        }),
        other => other,
    }
}

/// Returns `true` if a polyline does not intersect itself.
///
/// Consecutive repeated vertices are ignored. When the polyline is closed,
/// the shared first/last vertex is allowed.
#[must_use]
pub fn linestring_is_simple(points: &[Point2]) -> bool {
    let mut pts: Vec<Point2> = Vec::with_capacity(points.len());
    for p in points {
        if pts.last() != Some(p) {
            pts.push(*p);
        }
    }
    if pts.len() < 3 {
        return true;
    }
    let closed = pts.first() == pts.last();
    let nseg = pts.len() - 1;

    for i in 0..nseg {
        for j in (i + 1)..nseg {
            let hit = segment_intersection(&pts[i], &pts[i + 1], &pts[j], &pts[j + 1]);
            match hit {
                SegmentIntersection::None => {}
                SegmentIntersection::Overlap(..) => return false,
                SegmentIntersection::Point(c) => {
                    let adjacent = j == i + 1 && c.t == 1.0 && c.u == 0.0;
                    let wraps = closed && i == 0 && j == nseg - 1 && c.t == 0.0 && c.u == 1.0;
                    if !adjacent && !wraps {
                        return false;
                    }
                }
            }
        }
    }
    true
}
