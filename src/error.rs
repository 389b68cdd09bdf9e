use thiserror::Error;

use crate::topology::ElementId;

/// Top-level error type for the topolis topology engine.
#[derive(Debug, Error)]
pub enum TopolisError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl TopolisError {
    /// Returns the machine-checkable error code for this error, if it has one.
    #[must_use]
    pub fn kind(&self) -> Option<TopoErrorKind> {
        match self {
            Self::Geometry(GeometryError::NotSimple(_)) => Some(TopoErrorKind::EdgeNotSimple),
            Self::Geometry(GeometryError::Degenerate(_)) => Some(TopoErrorKind::EdgeInvalid),
            Self::Topology(e) => e.kind(),
            _ => None,
        }
    }
}

/// Structural errors in input geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("{0} is not simple")]
    NotSimple(&'static str),

    #[error("invalid edge: {0}")]
    Degenerate(String),

    #[error("empty geometry: {0}")]
    Empty(&'static str),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Topological conflicts and consistency errors.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("non-existent node {0}")]
    NonExistentNode(ElementId),

    #[error("non-existent edge {0}")]
    NonExistentEdge(ElementId),

    #[error("non-existent face {0}")]
    NonExistentFace(ElementId),

    #[error("coincident node")]
    CoincidentNode,

    #[error("edge crosses node")]
    EdgeCrossesNode,

    #[error("geometry crosses a node ({0})")]
    GeometryCrossesNode(ElementId),

    #[error("coincident edge {0}")]
    CoincidentEdge(ElementId),

    #[error("geometry intersects edge {0}")]
    EdgeIntersectsEdge(ElementId),

    #[error("geometry crosses edge {0}")]
    EdgeCrossesEdge(ElementId),

    #[error("not within face")]
    NotWithinFace,

    #[error("closed edges would not be isolated, try AddEdgeNewFaces")]
    ClosedEdgeNotIsolated,

    #[error("not isolated node {0}")]
    NotIsolatedNode(ElementId),

    #[error("not isolated edge {0}")]
    NotIsolatedEdge(ElementId),

    #[error("nodes in different faces")]
    NodesInDifferentFaces,

    #[error("start node not geometry start point")]
    StartNodeMismatch,

    #[error("end node not geometry end point")]
    EndNodeMismatch,

    #[error("point not on edge")]
    PointNotOnEdge,

    #[error("cannot heal edge {0} with itself, try with another")]
    HealWithItself(ElementId),

    #[error("edge {0} is closed, cannot heal to other edges")]
    ClosedEdgeHeal(ElementId),

    #[error("other edges connected ({0})")]
    OtherEdgesConnected(String),

    #[error("non-connected edges")]
    NonConnectedEdges,

    #[error("left/right faces mismatch: new edge {edge} has face {left} on the left and {right} on the right")]
    LeftRightFaceMismatch {
        edge: ElementId,
        left: ElementId,
        right: ElementId,
    },

    #[error("side-location conflict: new edge starts in face {start} and ends in face {end}")]
    SideLocationConflict { start: ElementId, end: ElementId },

    #[error("could not derive edge face from linked primitives: invalid topology?")]
    CouldNotDeriveEdgeFace,

    #[error("geometry crosses an edge (endnodes in faces {0} and {1})")]
    EndNodesInDifferentFaces(ElementId, ElementId),

    #[error("corrupted topology: adjacent edges {0} and {1} bind different face ({2} and {3})")]
    AdjacentEdgesBindDifferentFace(ElementId, ElementId, ElementId, ElementId),

    #[error("edge twist at node {0}")]
    EdgeTwist(ElementId),

    #[error("edge motion collision at node {0}")]
    EdgeMotionCollision(ElementId),

    #[error("edge changed disposition around {0} node")]
    EdgeChangedDisposition(&'static str),

    #[error("SQL/MM Spatial exception - universal face has no geometry")]
    UniversalFaceHasNoGeometry,

    #[error("face {0} has no boundary edges")]
    FaceWithoutEdges(ElementId),

    #[error("faces already exist in the topology")]
    FacesAlreadyExist,

    #[error("topology is not empty")]
    NotEmpty,

    #[error("could not find edge with id {0}")]
    CouldNotFindEdge(ElementId),

    #[error("ring walk from edge {start} hit iteration limit {limit}")]
    RingWalkLimit { start: ElementId, limit: usize },

    #[error("ring walk from edge {start} visited signed edge {repeated} twice")]
    RingWalkRepeat { start: ElementId, repeated: ElementId },

    #[error("{count} {what} records returned when expecting {expected}")]
    UnexpectedCount {
        what: &'static str,
        count: usize,
        expected: usize,
    },

    #[error("two or more {0} found")]
    MultipleFound(&'static str),
}

impl TopologyError {
    /// Returns the machine-checkable error code for this error, if it has one.
    #[must_use]
    pub fn kind(&self) -> Option<TopoErrorKind> {
        match self {
            Self::EdgeCrossesNode | Self::GeometryCrossesNode(_) => {
                Some(TopoErrorKind::EdgeCrossesNode)
            }
            Self::CoincidentEdge(_) | Self::EdgeIntersectsEdge(_) | Self::EdgeCrossesEdge(_) => {
                Some(TopoErrorKind::EdgeCrossesEdge)
            }
            Self::StartNodeMismatch => Some(TopoErrorKind::EdgeStartNodeMismatch),
            Self::EndNodeMismatch => Some(TopoErrorKind::EdgeEndNodeMismatch),
            Self::FaceWithoutEdges(_) => Some(TopoErrorKind::FaceWithoutEdges),
            _ => None,
        }
    }
}

/// Errors reported by a storage backend, including vetoes from the
/// composite-geometry layer.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend error: {0}")]
    Storage(String),

    #[error("SQL/MM Spatial exception - {0}")]
    Forbidden(String),

    #[error("topology {0} not found")]
    TopologyNotFound(String),
}

/// Machine-checkable classification of topology validity problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopoErrorKind {
    EdgeCrossesNode,
    EdgeInvalid,
    EdgeNotSimple,
    EdgeCrossesEdge,
    EdgeStartNodeMismatch,
    EdgeEndNodeMismatch,
    FaceWithoutEdges,
    FaceHasNoRings,
    FaceOverlapsFace,
    FaceWithinFace,
}

/// A validity problem together with the elements involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopoErrorRecord {
    pub kind: TopoErrorKind,
    pub element1: ElementId,
    pub element2: ElementId,
}

/// Convenience type alias for results using [`TopolisError`].
pub type Result<T> = std::result::Result<T, TopolisError>;
