//! Adding free geometry to a topology, with snapping and noding against
//! what is already stored.

mod collection;
mod line;
mod point;
mod polygon;

pub use collection::{CreateTopoGeo, GeometryComponent};
pub use line::{AddLine, AddLineNoFace};
pub use point::AddPoint;
pub use polygon::AddPolygon;
