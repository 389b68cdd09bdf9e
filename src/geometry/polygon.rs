use crate::geometry::{Aabb, LineString};
use crate::math::polygon_2d::{locate_in_polygon, signed_area_2d, Location};
use crate::math::Point2;

/// A polygon with one exterior ring and zero or more holes.
///
/// Rings are closed (first vertex repeated last). An empty polygon has an
/// empty exterior ring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    pub exterior: Vec<Point2>,
    pub interiors: Vec<Vec<Point2>>,
}

impl Polygon {
    #[must_use]
    pub fn new(exterior: Vec<Point2>, interiors: Vec<Vec<Point2>>) -> Self {
        Self {
            exterior,
            interiors,
        }
    }

    /// The empty polygon.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exterior.is_empty()
    }

    /// All rings, exterior first.
    pub fn rings(&self) -> impl Iterator<Item = &Vec<Point2>> {
        std::iter::once(&self.exterior)
            .filter(|r| !r.is_empty())
            .chain(self.interiors.iter())
    }

    /// Rings as line strings, exterior first.
    #[must_use]
    pub fn ring_lines(&self) -> Vec<LineString> {
        self.rings().map(|r| LineString::new(r.clone())).collect()
    }

    #[must_use]
    pub fn bbox(&self) -> Option<Aabb> {
        Aabb::from_points(&self.exterior)
    }

    /// Area of the exterior minus the area of the holes.
    #[must_use]
    pub fn area(&self) -> f64 {
        let holes: f64 = self.interiors.iter().map(|h| signed_area_2d(h).abs()).sum();
        signed_area_2d(&self.exterior).abs() - holes
    }

    #[must_use]
    pub fn locate(&self, p: &Point2) -> Location {
        if self.is_empty() {
            return Location::Outside;
        }
        locate_in_polygon(p, &self.exterior, &self.interiors)
    }

    /// Returns `true` if `p` is inside or on the boundary.
    #[must_use]
    pub fn covers(&self, p: &Point2) -> bool {
        self.locate(p) != Location::Outside
    }
}
