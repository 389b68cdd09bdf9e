use tracing::debug;

use crate::backend::TopologyBackend;
use crate::engine::GeometryEngine;
use crate::error::{GeometryError, Result};
use crate::geometry::{LineString, Polygon};
use crate::operations::query::GetFaceGeometry;
use crate::topology::{ElementId, FaceFields, Topology};

use super::line::add_line;

/// Adds a polygon's rings as lines, returning the faces that make up its
/// area.
pub struct AddPolygon {
    polygon: Polygon,
    tolerance: Option<f64>,
}

impl AddPolygon {
    /// Creates a new `AddPolygon` operation.
    #[must_use]
    pub fn new(polygon: Polygon, tolerance: Option<f64>) -> Self {
        Self { polygon, tolerance }
    }

    /// Executes the operation.
    ///
    /// A face belongs to the result when a point of its interior is covered
    /// by the polygon; snapping may make the faces differ slightly from the
    /// input.
    ///
    /// # Errors
    ///
    /// Returns an error if a ring cannot be added or a face geometry cannot
    /// be built.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &mut Topology<B, G>,
    ) -> Result<Vec<ElementId>> {
        let bbox = self
            .polygon
            .bbox()
            .ok_or(GeometryError::Empty("polygon"))?;
        let tol = topo.tolerance(self.tolerance, Some(&bbox));

        for ring in self.polygon.rings() {
            add_line(topo, &LineString::new(ring.clone()), Some(tol), true)?;
        }

        let query = bbox.expanded(tol);
        let faces = topo
            .backend()
            .get_face_within_box(Some(&query), FaceFields::ID, None)?;
        let mut covered = Vec::new();
        for face in &faces {
            let geom = GetFaceGeometry::new(face.id).execute(topo)?;
            let Some(sample) = topo.engine().point_on_surface(&geom)? else {
                continue;
            };
            if self.polygon.covers(&sample) && !covered.contains(&face.id) {
                covered.push(face.id);
            }
        }
        debug!(faces = covered.len(), "added polygon");
        Ok(covered)
    }
}
