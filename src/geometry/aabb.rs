use crate::math::Point2;

/// A 2D axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point2,
    /// Maximum corner of the bounding box.
    pub max: Point2,
}

impl Aabb {
    /// Creates a box from its corners.
    #[must_use]
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// Box covering a single point.
    #[must_use]
    pub fn from_point(p: &Point2) -> Self {
        Self { min: *p, max: *p }
    }

    /// Smallest box covering all points, or `None` when empty.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self::from_point(first);
        for p in iter {
            bbox.include_point(p);
        }
        Some(bbox)
    }

    /// Grows the box to cover `p`.
    pub fn include_point(&mut self, p: &Point2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Returns the union of two boxes.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        Self {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Returns the box grown by `distance` on every side.
    #[must_use]
    pub fn expanded(&self, distance: f64) -> Self {
        Self {
            min: Point2::new(self.min.x - distance, self.min.y - distance),
            max: Point2::new(self.max.x + distance, self.max.y + distance),
        }
    }

    /// Returns `true` if `p` lies inside or on the border of the box.
    #[must_use]
    pub fn contains_point(&self, p: &Point2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Returns `true` if `other` lies entirely inside this box (borders included).
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        other.min.x >= self.min.x
            && other.max.x <= self.max.x
            && other.min.y >= self.min.y
            && other.max.y <= self.max.y
    }

    /// Returns `true` if the boxes share at least one point.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Area of the box.
    #[must_use]
    pub fn area(&self) -> f64 {
        (self.max.x - self.min.x) * (self.max.y - self.min.y)
    }

    /// Largest absolute ordinate value of the box corners.
    #[must_use]
    pub fn max_abs_ordinate(&self) -> f64 {
        self.min
            .x
            .abs()
            .max(self.max.x.abs())
            .max(self.min.y.abs())
            .max(self.max.y.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_and_contains() {
        let pts = [Point2::new(1.0, 5.0), Point2::new(-2.0, 3.0), Point2::new(4.0, -1.0)];
        let bbox = Aabb::from_points(&pts);
        assert_eq!(
            bbox,
            Some(Aabb::new(Point2::new(-2.0, -1.0), Point2::new(4.0, 5.0)))
        );
        let bbox = bbox.unwrap_or(Aabb::from_point(&Point2::origin()));
        assert!(bbox.contains_point(&Point2::new(4.0, 5.0)));
        assert!(!bbox.contains_point(&Point2::new(4.1, 5.0)));
    }

    #[test]
    fn empty_points_give_none() {
        assert!(Aabb::from_points(&[]).is_none());
    }

    #[test]
    fn containment_and_intersection() {
        let outer = Aabb::new(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
        let inner = Aabb::new(Point2::new(2.0, 2.0), Point2::new(3.0, 3.0));
        let apart = Aabb::new(Point2::new(11.0, 0.0), Point2::new(12.0, 1.0));
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.intersects(&inner));
        assert!(!outer.intersects(&apart));
        assert!(outer.merged(&apart).contains(&apart));
        assert!(inner.expanded(1.0).contains(&Aabb::new(
            Point2::new(1.0, 1.0),
            Point2::new(4.0, 4.0)
        )));
    }
}
