mod by_point;
mod face_geometry;
mod ring;

pub use by_point::{GetEdgeByPoint, GetFaceByPoint, GetNodeByPoint};
pub use face_geometry::{build_face_polygon, GetFaceEdges, GetFaceGeometry};
pub use ring::GetRingEdges;

pub(crate) use face_geometry::append_oriented;
