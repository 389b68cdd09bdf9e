//! Storage capability interface.
//!
//! A backend persists node, edge and face records and answers the spatial
//! and relational queries the editing operations need. Every read takes a
//! field mask naming the fields the caller will look at; every selective
//! update takes a mask for the fields to match and one for the fields to
//! write. Records are exchanged by value.

mod memory;

pub use memory::{MemoryBackend, TopoGeomEvent};

use crate::error::BackendError;
use crate::geometry::Aabb;
use crate::math::Point2;
use crate::topology::{
    Edge, EdgeFields, ElementId, Face, FaceFields, Node, NodeFields, OrientedEdge, TopologyConfig,
};

/// Result of a backend call.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Storage of one planar topology.
///
/// Methods taking `limit` return at most that many records when it is
/// `Some`. Box queries taking `Option<&Aabb>` return everything for `None`.
pub trait TopologyBackend {
    // --- Topology ---

    /// Creates the storage for a new topology.
    ///
    /// # Errors
    ///
    /// Returns an error if a topology with that name already exists.
    fn create_topology(&mut self, config: &TopologyConfig) -> BackendResult<()>;

    /// Reads the metadata of an existing topology.
    ///
    /// # Errors
    ///
    /// Returns an error if the topology does not exist.
    fn load_topology(&self, name: &str) -> BackendResult<TopologyConfig>;

    /// Removes a topology with every node, edge and face it holds.
    ///
    /// # Errors
    ///
    /// Returns an error if the topology does not exist.
    fn drop_topology(&mut self, name: &str) -> BackendResult<()>;

    // --- Nodes ---

    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn get_node_by_id(&self, ids: &[ElementId], fields: NodeFields) -> BackendResult<Vec<Node>>;

    /// Nodes at distance `<= dist` from `pt`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn get_node_within_distance(
        &self,
        pt: &Point2,
        dist: f64,
        fields: NodeFields,
        limit: Option<usize>,
    ) -> BackendResult<Vec<Node>>;

    /// Nodes whose point lies in `bbox`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn get_node_within_box(
        &self,
        bbox: Option<&Aabb>,
        fields: NodeFields,
        limit: Option<usize>,
    ) -> BackendResult<Vec<Node>>;

    /// Isolated nodes whose containing face is one of `faces`, optionally
    /// restricted to `bbox`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn get_node_by_face(
        &self,
        faces: &[ElementId],
        fields: NodeFields,
        bbox: Option<&Aabb>,
    ) -> BackendResult<Vec<Node>>;

    /// Inserts nodes, assigning ids to records whose id is unassigned.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn insert_nodes(&mut self, nodes: &mut [Node]) -> BackendResult<()>;

    /// Writes `update_fields` of `update` into every node matching
    /// `select_fields` of `select`, skipping nodes matching `exclude`.
    /// Returns the number of updated nodes.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn update_nodes(
        &mut self,
        select: &Node,
        select_fields: NodeFields,
        update: &Node,
        update_fields: NodeFields,
        exclude: Option<(&Node, NodeFields)>,
    ) -> BackendResult<usize>;

    /// Writes `fields` of each given node into the stored node with the same id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn update_nodes_by_id(&mut self, nodes: &[Node], fields: NodeFields) -> BackendResult<usize>;

    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn delete_nodes_by_id(&mut self, ids: &[ElementId]) -> BackendResult<usize>;

    // --- Edges ---

    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn get_edge_by_id(&self, ids: &[ElementId], fields: EdgeFields) -> BackendResult<Vec<Edge>>;

    /// Edges at distance `<= dist` from `pt`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn get_edge_within_distance(
        &self,
        pt: &Point2,
        dist: f64,
        fields: EdgeFields,
        limit: Option<usize>,
    ) -> BackendResult<Vec<Edge>>;

    /// Edges whose bounding box intersects `bbox`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn get_edge_within_box(
        &self,
        bbox: Option<&Aabb>,
        fields: EdgeFields,
        limit: Option<usize>,
    ) -> BackendResult<Vec<Edge>>;

    /// Edges starting or ending at any of `nodes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn get_edge_by_node(&self, nodes: &[ElementId], fields: EdgeFields) -> BackendResult<Vec<Edge>>;

    /// Edges with any of `faces` on either side, optionally restricted to
    /// edges whose bounding box intersects `bbox`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn get_edge_by_face(
        &self,
        faces: &[ElementId],
        fields: EdgeFields,
        bbox: Option<&Aabb>,
    ) -> BackendResult<Vec<Edge>>;

    /// Reserves and returns the next edge id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn next_edge_id(&mut self) -> BackendResult<ElementId>;

    /// Inserts edges, assigning ids to records whose id is unassigned.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn insert_edges(&mut self, edges: &mut [Edge]) -> BackendResult<()>;

    /// Selective update, see [`TopologyBackend::update_nodes`].
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn update_edges(
        &mut self,
        select: &Edge,
        select_fields: EdgeFields,
        update: &Edge,
        update_fields: EdgeFields,
        exclude: Option<(&Edge, EdgeFields)>,
    ) -> BackendResult<usize>;

    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn update_edges_by_id(&mut self, edges: &[Edge], fields: EdgeFields) -> BackendResult<usize>;

    /// Deletes every edge matching `select_fields` of `select`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn delete_edges(&mut self, select: &Edge, select_fields: EdgeFields) -> BackendResult<usize>;

    // --- Faces ---

    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn get_face_by_id(&self, ids: &[ElementId], fields: FaceFields) -> BackendResult<Vec<Face>>;

    /// Faces whose MBR intersects `bbox`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn get_face_within_box(
        &self,
        bbox: Option<&Aabb>,
        fields: FaceFields,
        limit: Option<usize>,
    ) -> BackendResult<Vec<Face>>;

    /// The face strictly containing `pt`, `None` when it is on an edge or in
    /// the universal face.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn get_face_containing_point(&self, pt: &Point2) -> BackendResult<Option<ElementId>>;

    /// Inserts faces, assigning ids to records whose id is unassigned.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn insert_faces(&mut self, faces: &mut [Face]) -> BackendResult<()>;

    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn update_faces_by_id(&mut self, faces: &[Face]) -> BackendResult<usize>;

    /// # Errors
    ///
    /// Returns an error if the storage fails.
    fn delete_faces_by_id(&mut self, ids: &[ElementId]) -> BackendResult<usize>;

    // --- Ring walking ---

    /// Walks the ring on the left of `start`, following `next_left` links on
    /// forward edges and `next_right` links on backward ones, until `start`
    /// comes back.
    ///
    /// With a `limit`, the walk stops after `limit + 1` elements, so a
    /// result longer than `limit` signals a ring that did not close.
    ///
    /// # Errors
    ///
    /// Returns an error if a linked edge is missing or the storage fails.
    fn get_ring_edges(
        &self,
        start: OrientedEdge,
        limit: Option<usize>,
    ) -> BackendResult<Vec<OrientedEdge>> {
        let fields = EdgeFields::ID | EdgeFields::NEXT_LEFT | EdgeFields::NEXT_RIGHT;
        let mut ring = Vec::new();
        let mut cur = start;
        loop {
            ring.push(cur);
            if limit.is_some_and(|l| ring.len() > l) {
                break;
            }
            let edge = self
                .get_edge_by_id(&[cur.edge], fields)?
                .into_iter()
                .next()
                .ok_or_else(|| BackendError::Storage(format!("could not find edge {}", cur.edge)))?;
            cur = edge.next(cur.forward);
            if cur == start {
                break;
            }
        }
        Ok(ring)
    }

    // --- Composite-geometry notifications ---

    /// `split_edge` was split; `new_edge2` is `None` when the old edge was kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the dependent layer cannot follow the edit.
    fn update_topo_geom_edge_split(
        &mut self,
        _split_edge: ElementId,
        _new_edge1: ElementId,
        _new_edge2: Option<ElementId>,
    ) -> BackendResult<()> {
        Ok(())
    }

    /// `split_face` was split; `new_face2` is `None` when the old face was kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the dependent layer cannot follow the edit.
    fn update_topo_geom_face_split(
        &mut self,
        _split_face: ElementId,
        _new_face1: ElementId,
        _new_face2: Option<ElementId>,
    ) -> BackendResult<()> {
        Ok(())
    }

    /// Edges `edge1` and `edge2` were merged into `new_edge`.
    ///
    /// # Errors
    ///
    /// Returns an error if the dependent layer cannot follow the edit.
    fn update_topo_geom_edge_heal(
        &mut self,
        _edge1: ElementId,
        _edge2: ElementId,
        _new_edge: ElementId,
    ) -> BackendResult<()> {
        Ok(())
    }

    /// Faces `face1` and `face2` were merged into `new_face`.
    ///
    /// # Errors
    ///
    /// Returns an error if the dependent layer cannot follow the edit.
    fn update_topo_geom_face_heal(
        &mut self,
        _face1: ElementId,
        _face2: ElementId,
        _new_face: ElementId,
    ) -> BackendResult<()> {
        Ok(())
    }

    /// Veto point before removing an edge.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Forbidden`] to refuse the removal.
    fn check_topo_geom_rem_edge(
        &self,
        _edge: ElementId,
        _face_left: ElementId,
        _face_right: ElementId,
    ) -> BackendResult<()> {
        Ok(())
    }

    /// Veto point before removing the node shared by two healed edges.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Forbidden`] to refuse the removal.
    fn check_topo_geom_rem_node(
        &self,
        _node: ElementId,
        _edge1: ElementId,
        _edge2: ElementId,
    ) -> BackendResult<()> {
        Ok(())
    }
}
