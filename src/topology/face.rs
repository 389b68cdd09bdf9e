use crate::geometry::Aabb;

use super::{ElementId, UNASSIGNED_ID};

/// A 2-cell of the planar subdivision. Face 0 (the universal face) has no record.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub id: ElementId,
    /// Cached bounding box of the face geometry.
    pub mbr: Option<Aabb>,
}

impl Face {
    /// Creates a face record that still needs an id from the backend.
    #[must_use]
    pub fn new(mbr: Option<Aabb>) -> Self {
        Self {
            id: UNASSIGNED_ID,
            mbr,
        }
    }
}
