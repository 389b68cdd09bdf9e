pub mod edge;
pub mod face;
pub mod fields;
pub mod node;

pub use edge::{Edge, OrientedEdge};
pub use face::Face;
pub use fields::{EdgeFields, FaceFields, NodeFields};
pub use node::Node;

use tracing::debug;

use crate::backend::TopologyBackend;
use crate::engine::{GeometryEngine, PlanarEngine};
use crate::error::{Result, TopologyError};
use crate::geometry::Aabb;

/// Identifier of a node, edge or face, scoped to one topology.
pub type ElementId = i64;

/// Id of a record the backend has not numbered yet.
pub const UNASSIGNED_ID: ElementId = -1;

/// Id of the unbounded face. It is never stored as a record.
pub const UNIVERSE_FACE: ElementId = 0;

/// Metadata of a topology.
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyConfig {
    pub name: String,
    pub srid: i32,
    /// Default snapping distance for insert operations. A negative value asks
    /// for the smallest tolerance that is meaningful for the input's magnitude.
    pub precision: f64,
    pub has_z: bool,
}

impl TopologyConfig {
    /// Creates a configuration with SRID 0, precision 0 and no Z.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            srid: 0,
            precision: 0.0,
            has_z: false,
        }
    }

    #[must_use]
    pub fn with_srid(mut self, srid: i32) -> Self {
        self.srid = srid;
        self
    }

    #[must_use]
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    #[must_use]
    pub fn with_z(mut self, has_z: bool) -> Self {
        self.has_z = has_z;
        self
    }
}

/// Smallest tolerance that still separates distinct doubles at the
/// magnitude of `bbox`.
#[must_use]
pub fn min_tolerance(bbox: &Aabb) -> f64 {
    let max = bbox.max_abs_ordinate();
    let max = if max == 0.0 { 1.0 } else { max };
    3.6 * 10f64.powf(-(15.0 - max.log10()))
}

/// Handle to one topology: its metadata, the storage backend and the
/// geometry engine every operation runs against.
#[derive(Debug)]
pub struct Topology<B, G = PlanarEngine> {
    config: TopologyConfig,
    backend: B,
    engine: G,
}

impl<B: TopologyBackend, G: GeometryEngine> Topology<B, G> {
    /// Wraps a backend that already holds the topology described by `config`.
    #[must_use]
    pub fn new(backend: B, engine: G, config: TopologyConfig) -> Self {
        Self {
            config,
            backend,
            engine,
        }
    }

    /// Creates a new topology in the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses to create it.
    pub fn create(mut backend: B, engine: G, config: TopologyConfig) -> Result<Self> {
        backend.create_topology(&config)?;
        debug!(name = %config.name, srid = config.srid, "created topology");
        Ok(Self::new(backend, engine, config))
    }

    /// Loads an existing topology by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend does not know the topology.
    pub fn load(backend: B, engine: G, name: &str) -> Result<Self> {
        let config = backend.load_topology(name)?;
        Ok(Self::new(backend, engine, config))
    }

    /// Drops the topology and all its records from the backend, giving the
    /// emptied backend back.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend no longer knows the topology.
    pub fn drop_topology(mut self) -> Result<B> {
        self.backend.drop_topology(&self.config.name)?;
        debug!(name = %self.config.name, "dropped topology");
        Ok(self.backend)
    }

    #[must_use]
    pub fn config(&self) -> &TopologyConfig {
        &self.config
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[must_use]
    pub fn engine(&self) -> &G {
        &self.engine
    }

    /// Releases the handle, giving the backend back.
    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Resolves a per-call tolerance: an explicit value wins, otherwise the
    /// topology precision, otherwise the minimum tolerance for `bbox`.
    #[must_use]
    pub fn tolerance(&self, explicit: Option<f64>, bbox: Option<&Aabb>) -> f64 {
        match explicit {
            Some(tol) if tol >= 0.0 => tol,
            _ if self.config.precision >= 0.0 => self.config.precision,
            _ => bbox.map_or(0.0, min_tolerance),
        }
    }

    // --- Record lookups ---

    /// Fetches the requested fields of the given nodes.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or returns more records than ids.
    pub fn nodes_by_id(&self, ids: &[ElementId], fields: NodeFields) -> Result<Vec<Node>> {
        let nodes = self.backend.get_node_by_id(ids, fields)?;
        check_count("node", nodes.len(), ids.len())?;
        Ok(nodes)
    }

    /// Returns the node with the given id, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist or the backend fails.
    pub fn node(&self, id: ElementId) -> Result<Node> {
        self.nodes_by_id(&[id], NodeFields::ALL)?
            .into_iter()
            .next()
            .ok_or_else(|| TopologyError::NonExistentNode(id).into())
    }

    /// Fetches the requested fields of the given edges.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or returns more records than ids.
    pub fn edges_by_id(&self, ids: &[ElementId], fields: EdgeFields) -> Result<Vec<Edge>> {
        let edges = self.backend.get_edge_by_id(ids, fields)?;
        check_count("edge", edges.len(), ids.len())?;
        Ok(edges)
    }

    /// Returns the edge with the given id, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge does not exist or the backend fails.
    pub fn edge(&self, id: ElementId) -> Result<Edge> {
        self.edges_by_id(&[id], EdgeFields::ALL)?
            .into_iter()
            .next()
            .ok_or_else(|| TopologyError::NonExistentEdge(id).into())
    }

    /// Returns the face with the given id, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the face does not exist or the backend fails.
    pub fn face(&self, id: ElementId) -> Result<Face> {
        let faces = self.backend.get_face_by_id(&[id], FaceFields::ALL)?;
        check_count("face", faces.len(), 1)?;
        faces
            .into_iter()
            .next()
            .ok_or_else(|| TopologyError::NonExistentFace(id).into())
    }
}

fn check_count(what: &'static str, count: usize, expected: usize) -> Result<()> {
    if count > expected {
        return Err(TopologyError::UnexpectedCount {
            what,
            count,
            expected,
        }
        .into());
    }
    Ok(())
}
