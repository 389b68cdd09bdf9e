use crate::math::Point2;

use super::{ElementId, UNASSIGNED_ID};

/// A point primitive of the topology.
///
/// `containing_face` is `Some` only while the node has no incident edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: ElementId,
    pub containing_face: Option<ElementId>,
    pub geom: Point2,
}

impl Node {
    /// Creates a node record that still needs an id from the backend.
    #[must_use]
    pub fn new(geom: Point2, containing_face: Option<ElementId>) -> Self {
        Self {
            id: UNASSIGNED_ID,
            containing_face,
            geom,
        }
    }

    /// Returns `true` if the node has no incident edge.
    #[must_use]
    pub fn is_isolated(&self) -> bool {
        self.containing_face.is_some()
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new(Point2::origin(), None)
    }
}
