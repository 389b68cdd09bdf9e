pub mod aabb;
pub mod line_string;
pub mod polygon;

pub use aabb::Aabb;
pub use line_string::LineString;
pub use polygon::Polygon;
