use std::fmt;

use crate::geometry::LineString;

use super::{ElementId, UNASSIGNED_ID};

/// An edge referenced together with a walking direction.
///
/// Walking forward (start → end) keeps the edge's left face on the left;
/// walking backward keeps its right face on the left. Storage encodes this
/// as a signed id: positive for forward, negative for backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrientedEdge {
    /// The edge identifier (always positive).
    pub edge: ElementId,
    /// If `true`, the edge is traversed in its natural direction (start → end).
    pub forward: bool,
}

impl OrientedEdge {
    /// Creates a new oriented edge.
    #[must_use]
    pub fn new(edge: ElementId, forward: bool) -> Self {
        Self { edge, forward }
    }

    /// Forward traversal, walking the left side.
    #[must_use]
    pub fn forward(edge: ElementId) -> Self {
        Self::new(edge, true)
    }

    /// Backward traversal, walking the right side.
    #[must_use]
    pub fn backward(edge: ElementId) -> Self {
        Self::new(edge, false)
    }

    /// Decodes a signed storage reference.
    #[must_use]
    pub fn from_signed(signed: ElementId) -> Self {
        Self::new(signed.abs(), signed > 0)
    }

    /// Encodes as a signed storage reference.
    #[must_use]
    pub fn signed(self) -> ElementId {
        if self.forward {
            self.edge
        } else {
            -self.edge
        }
    }

    /// The same edge walked the other way.
    #[must_use]
    pub fn reversed(self) -> Self {
        Self::new(self.edge, !self.forward)
    }
}

impl fmt::Display for OrientedEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signed())
    }
}

/// A directed connectivity primitive with its DCEL links.
///
/// `next_left` is the signed id of the edge that follows this one when walking
/// its left side (continuing from the end node); `next_right` follows the right
/// side (continuing from the start node).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Edge {
    pub id: ElementId,
    pub start_node: ElementId,
    pub end_node: ElementId,
    pub face_left: ElementId,
    pub face_right: ElementId,
    pub next_left: ElementId,
    pub next_right: ElementId,
    pub geom: LineString,
}

impl Edge {
    /// Creates an unlinked edge record that still needs an id.
    #[must_use]
    pub fn new(start_node: ElementId, end_node: ElementId, geom: LineString) -> Self {
        Self {
            id: UNASSIGNED_ID,
            start_node,
            end_node,
            face_left: UNASSIGNED_ID,
            face_right: UNASSIGNED_ID,
            next_left: 0,
            next_right: 0,
            geom,
        }
    }

    /// Returns `true` if the edge starts and ends on the same node.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.start_node == self.end_node
    }

    /// Returns `true` if the same face lies on both sides.
    #[must_use]
    pub fn is_dangling(&self) -> bool {
        self.face_left == self.face_right
    }

    /// The face on the left of the edge walked `forward` or backward.
    #[must_use]
    pub fn face_on(&self, forward: bool) -> ElementId {
        if forward {
            self.face_left
        } else {
            self.face_right
        }
    }

    /// The oriented edge that follows this one walked `forward` or backward.
    #[must_use]
    pub fn next(&self, forward: bool) -> OrientedEdge {
        OrientedEdge::from_signed(if forward {
            self.next_left
        } else {
            self.next_right
        })
    }

    /// Returns `true` if the edge touches `node`.
    #[must_use]
    pub fn touches(&self, node: ElementId) -> bool {
        self.start_node == node || self.end_node == node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_round_trip() {
        let fwd = OrientedEdge::from_signed(7);
        let bwd = OrientedEdge::from_signed(-7);
        assert!(fwd.forward);
        assert!(!bwd.forward);
        assert_eq!(fwd.edge, bwd.edge);
        assert_eq!(fwd.reversed(), bwd);
        assert_eq!(bwd.signed(), -7);
        assert_eq!(bwd.to_string(), "-7");
    }

    #[test]
    fn next_follows_side() {
        let e = Edge {
            id: 1,
            next_left: -3,
            next_right: 2,
            ..Edge::default()
        };
        assert_eq!(e.next(true), OrientedEdge::backward(3));
        assert_eq!(e.next(false), OrientedEdge::forward(2));
    }

    #[test]
    fn dangling_and_closed() {
        let mut e = Edge::new(4, 4, LineString::default());
        e.face_left = 2;
        e.face_right = 2;
        assert!(e.is_closed());
        assert!(e.is_dangling());
        assert!(e.touches(4));
        assert!(!e.touches(5));
    }
}
