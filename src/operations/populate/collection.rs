use tracing::debug;

use crate::backend::TopologyBackend;
use crate::engine::GeometryEngine;
use crate::error::{Result, TopologyError};
use crate::geometry::{LineString, Polygon};
use crate::math::Point2;
use crate::topology::{EdgeFields, FaceFields, NodeFields, Topology};

use super::line::add_line;
use super::point::AddPoint;
use super::polygon::AddPolygon;

/// One member of a mixed geometry collection.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryComponent {
    Point(Point2),
    Line(LineString),
    Polygon(Polygon),
}

impl From<Point2> for GeometryComponent {
    fn from(point: Point2) -> Self {
        Self::Point(point)
    }
}

impl From<LineString> for GeometryComponent {
    fn from(line: LineString) -> Self {
        Self::Line(line)
    }
}

impl From<Polygon> for GeometryComponent {
    fn from(polygon: Polygon) -> Self {
        Self::Polygon(polygon)
    }
}

/// Populates an empty topology from a geometry collection.
///
/// Polygons go in first, then lines, then points, each at the topology
/// precision.
pub struct CreateTopoGeo {
    components: Vec<GeometryComponent>,
}

impl CreateTopoGeo {
    /// Creates a new `CreateTopoGeo` operation.
    #[must_use]
    pub fn new(components: Vec<GeometryComponent>) -> Self {
        Self { components }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::NotEmpty`] if the topology holds any node,
    /// edge or face, or any error from adding a component.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &mut Topology<B, G>,
    ) -> Result<()> {
        let backend = topo.backend();
        if !backend.get_node_within_box(None, NodeFields::ID, Some(1))?.is_empty()
            || !backend.get_edge_within_box(None, EdgeFields::ID, Some(1))?.is_empty()
            || !backend.get_face_within_box(None, FaceFields::ID, Some(1))?.is_empty()
        {
            return Err(TopologyError::NotEmpty.into());
        }

        for component in &self.components {
            if let GeometryComponent::Polygon(poly) = component {
                AddPolygon::new(poly.clone(), None).execute(topo)?;
            }
        }
        for component in &self.components {
            if let GeometryComponent::Line(line) = component {
                add_line(topo, line, None, true)?;
            }
        }
        for component in &self.components {
            if let GeometryComponent::Point(point) = component {
                AddPoint::new(*point, None).execute(topo)?;
            }
        }
        debug!(components = self.components.len(), "created topology from collection");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::testing::{line, pt, topology};
    use crate::TopolisError;

    fn square() -> Polygon {
        Polygon::new(
            vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0), pt(0.0, 0.0)],
            Vec::new(),
        )
    }

    #[test]
    fn mixed_collection_builds_topology() {
        let mut topo = topology();
        CreateTopoGeo::new(vec![
            pt(5.0, 5.0).into(),
            line(&[(-5.0, 5.0), (0.0, 5.0)]).into(),
            square().into(),
        ])
        .execute(&mut topo)
        .unwrap();

        assert_eq!(topo.backend().faces().count(), 1);
        // The line ends on the square's side and splits it.
        assert_eq!(topo.backend().edges().count(), 3);
        let inside = topo
            .backend()
            .nodes()
            .find(|n| n.geom == pt(5.0, 5.0))
            .unwrap();
        assert_eq!(inside.containing_face, Some(1));
    }

    #[test]
    fn refuses_populated_topology() {
        let mut topo = topology();
        AddPoint::new(pt(1.0, 1.0), None).execute(&mut topo).unwrap();
        let err = CreateTopoGeo::new(vec![square().into()])
            .execute(&mut topo)
            .unwrap_err();
        assert!(matches!(err, TopolisError::Topology(TopologyError::NotEmpty)));
    }
}
