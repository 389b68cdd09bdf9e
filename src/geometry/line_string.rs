use crate::geometry::Aabb;
use crate::math::Point2;

/// A linear curve: an ordered sequence of vertices joined by straight segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineString {
    points: Vec<Point2>,
}

impl LineString {
    /// Creates a line from its vertices.
    #[must_use]
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Creates a line from `(x, y)` pairs.
    #[must_use]
    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        Self {
            points: coords.iter().map(|&(x, y)| Point2::new(x, y)).collect(),
        }
    }

    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    #[must_use]
    pub fn into_points(self) -> Vec<Point2> {
        self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&Point2> {
        self.points.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Point2> {
        self.points.last()
    }

    /// Returns `true` if the line has vertices and ends where it starts.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.points.len() > 1 && self.points.first() == self.points.last()
    }

    /// Bounding box of the vertices, `None` when empty.
    #[must_use]
    pub fn bbox(&self) -> Option<Aabb> {
        Aabb::from_points(&self.points)
    }

    /// Returns the line walked backwards.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Self { points }
    }

    /// Number of vertices once consecutive duplicates are collapsed.
    #[must_use]
    pub fn distinct_len(&self) -> usize {
        let mut n = 0;
        let mut prev: Option<&Point2> = None;
        for p in &self.points {
            if prev != Some(p) {
                n += 1;
            }
            prev = Some(p);
        }
        n
    }

    /// Removes consecutive vertices closer than `tolerance` to the last kept one.
    ///
    /// The last vertex is always kept, replacing the previous kept vertex if the
    /// two are too close, so the endpoints never move.
    #[must_use]
    pub fn remove_repeated_points(&self, tolerance: f64) -> Self {
        let Some(first) = self.points.first() else {
            return Self::default();
        };
        let mut out = vec![*first];
        let n = self.points.len();
        for (i, p) in self.points.iter().enumerate().skip(1) {
            let is_last = i == n - 1;
            let Some(prev) = out.last() else { break };
            let d = (p - prev).norm();
            let too_close = if tolerance > 0.0 { d <= tolerance } else { d == 0.0 };
            if !too_close {
                out.push(*p);
            } else if is_last && out.len() > 1 {
                out.pop();
                out.push(*p);
            } else if is_last && d > 0.0 {
                out.push(*p);
            }
        }
        Self { points: out }
    }

    /// Appends another line, skipping its first vertex when it repeats our last one.
    pub fn append(&mut self, other: &[Point2]) {
        let skip = usize::from(!other.is_empty() && self.points.last() == other.first());
        self.points.extend_from_slice(&other[skip..]);
    }
}

impl From<Vec<Point2>> for LineString {
    fn from(points: Vec<Point2>) -> Self {
        Self { points }
    }
}
