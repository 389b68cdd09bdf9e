use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::error::BackendError;
use crate::geometry::Aabb;
use crate::math::distance_2d::point_to_linestring_dist;
use crate::math::polygon_2d::Location;
use crate::math::Point2;
use crate::operations::query::build_face_polygon;
use crate::topology::{
    Edge, EdgeFields, ElementId, Face, FaceFields, Node, NodeFields, TopologyConfig, UNASSIGNED_ID,
};

use super::{BackendResult, TopologyBackend};

/// A composite-geometry notification received by the [`MemoryBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopoGeomEvent {
    EdgeSplit {
        edge: ElementId,
        new1: ElementId,
        new2: Option<ElementId>,
    },
    FaceSplit {
        face: ElementId,
        new1: ElementId,
        new2: Option<ElementId>,
    },
    EdgeHeal {
        edge1: ElementId,
        edge2: ElementId,
        new_edge: ElementId,
    },
    FaceHeal {
        face1: ElementId,
        face2: ElementId,
        new_face: ElementId,
    },
}

/// Backend keeping every record in ordered in-memory tables.
///
/// Queries scan the tables in id order, so results are deterministic.
/// Edges and nodes listed in the `protected_*` sets are vetoed on removal,
/// which lets callers exercise the composite-geometry checks.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    config: Option<TopologyConfig>,
    nodes: BTreeMap<ElementId, Node>,
    edges: BTreeMap<ElementId, Edge>,
    faces: BTreeMap<ElementId, Face>,
    last_node_id: ElementId,
    last_edge_id: ElementId,
    last_face_id: ElementId,
    events: Vec<TopoGeomEvent>,
    protected_edges: FxHashSet<ElementId>,
    protected_nodes: FxHashSet<ElementId>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All nodes, in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All edges, in id order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// All face records, in id order.
    pub fn faces(&self) -> impl Iterator<Item = &Face> {
        self.faces.values()
    }

    /// Notifications received so far.
    #[must_use]
    pub fn events(&self) -> &[TopoGeomEvent] {
        &self.events
    }

    /// Makes any later removal of `edge` fail with a veto.
    pub fn protect_edge(&mut self, edge: ElementId) {
        self.protected_edges.insert(edge);
    }

    /// Makes any later heal removing `node` fail with a veto.
    pub fn protect_node(&mut self, node: ElementId) {
        self.protected_nodes.insert(node);
    }
}

// ── field-mask helpers ──

fn project_node(n: &Node, fields: NodeFields) -> Node {
    let mut out = Node::default();
    if fields.contains(NodeFields::ID) {
        out.id = n.id;
    }
    if fields.contains(NodeFields::CONTAINING_FACE) {
        out.containing_face = n.containing_face;
    }
    if fields.contains(NodeFields::GEOM) {
        out.geom = n.geom;
    }
    out
}

fn node_matches(n: &Node, sel: &Node, fields: NodeFields) -> bool {
    (!fields.contains(NodeFields::ID) || n.id == sel.id)
        && (!fields.contains(NodeFields::CONTAINING_FACE) || n.containing_face == sel.containing_face)
        && (!fields.contains(NodeFields::GEOM) || n.geom == sel.geom)
}

fn apply_node(n: &mut Node, upd: &Node, fields: NodeFields) {
    if fields.contains(NodeFields::CONTAINING_FACE) {
        n.containing_face = upd.containing_face;
    }
    if fields.contains(NodeFields::GEOM) {
        n.geom = upd.geom;
    }
}

fn project_edge(e: &Edge, fields: EdgeFields) -> Edge {
    let mut out = Edge::default();
    if fields.contains(EdgeFields::ID) {
        out.id = e.id;
    }
    if fields.contains(EdgeFields::START_NODE) {
        out.start_node = e.start_node;
    }
    if fields.contains(EdgeFields::END_NODE) {
        out.end_node = e.end_node;
    }
    if fields.contains(EdgeFields::FACE_LEFT) {
        out.face_left = e.face_left;
    }
    if fields.contains(EdgeFields::FACE_RIGHT) {
        out.face_right = e.face_right;
    }
    if fields.contains(EdgeFields::NEXT_LEFT) {
        out.next_left = e.next_left;
    }
    if fields.contains(EdgeFields::NEXT_RIGHT) {
        out.next_right = e.next_right;
    }
    if fields.contains(EdgeFields::GEOM) {
        out.geom = e.geom.clone();
    }
    out
}

fn edge_matches(e: &Edge, sel: &Edge, fields: EdgeFields) -> bool {
    (!fields.contains(EdgeFields::ID) || e.id == sel.id)
        && (!fields.contains(EdgeFields::START_NODE) || e.start_node == sel.start_node)
        && (!fields.contains(EdgeFields::END_NODE) || e.end_node == sel.end_node)
        && (!fields.contains(EdgeFields::FACE_LEFT) || e.face_left == sel.face_left)
        && (!fields.contains(EdgeFields::FACE_RIGHT) || e.face_right == sel.face_right)
        && (!fields.contains(EdgeFields::NEXT_LEFT) || e.next_left == sel.next_left)
        && (!fields.contains(EdgeFields::NEXT_RIGHT) || e.next_right == sel.next_right)
        && (!fields.contains(EdgeFields::GEOM) || e.geom == sel.geom)
}

fn apply_edge(e: &mut Edge, upd: &Edge, fields: EdgeFields) {
    if fields.contains(EdgeFields::START_NODE) {
        e.start_node = upd.start_node;
    }
    if fields.contains(EdgeFields::END_NODE) {
        e.end_node = upd.end_node;
    }
    if fields.contains(EdgeFields::FACE_LEFT) {
        e.face_left = upd.face_left;
    }
    if fields.contains(EdgeFields::FACE_RIGHT) {
        e.face_right = upd.face_right;
    }
    if fields.contains(EdgeFields::NEXT_LEFT) {
        e.next_left = upd.next_left;
    }
    if fields.contains(EdgeFields::NEXT_RIGHT) {
        e.next_right = upd.next_right;
    }
    if fields.contains(EdgeFields::GEOM) {
        e.geom = upd.geom.clone();
    }
}

fn project_face(f: &Face, fields: FaceFields) -> Face {
    Face {
        id: if fields.contains(FaceFields::ID) { f.id } else { UNASSIGNED_ID },
        mbr: if fields.contains(FaceFields::MBR) { f.mbr } else { None },
    }
}

fn take_limited<T>(iter: impl Iterator<Item = T>, limit: Option<usize>) -> Vec<T> {
    match limit {
        Some(n) => iter.take(n).collect(),
        None => iter.collect(),
    }
}

fn edge_in_box(e: &Edge, bbox: Option<&Aabb>) -> bool {
    match (bbox, e.geom.bbox()) {
        (None, _) => true,
        (Some(b), Some(eb)) => b.intersects(&eb),
        (Some(_), None) => false,
    }
}

impl TopologyBackend for MemoryBackend {
    fn create_topology(&mut self, config: &TopologyConfig) -> BackendResult<()> {
        if let Some(existing) = &self.config {
            return Err(BackendError::Storage(format!(
                "topology {} already exists",
                existing.name
            )));
        }
        self.config = Some(config.clone());
        Ok(())
    }

    fn load_topology(&self, name: &str) -> BackendResult<TopologyConfig> {
        self.config
            .as_ref()
            .filter(|c| c.name == name)
            .cloned()
            .ok_or_else(|| BackendError::TopologyNotFound(name.to_string()))
    }

    fn drop_topology(&mut self, name: &str) -> BackendResult<()> {
        self.load_topology(name)?;
        *self = Self::default();
        Ok(())
    }

    // --- Nodes ---

    fn get_node_by_id(&self, ids: &[ElementId], fields: NodeFields) -> BackendResult<Vec<Node>> {
        let mut wanted: Vec<ElementId> = ids.to_vec();
        wanted.sort_unstable();
        wanted.dedup();
        Ok(wanted
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .map(|n| project_node(n, fields))
            .collect())
    }

    fn get_node_within_distance(
        &self,
        pt: &Point2,
        dist: f64,
        fields: NodeFields,
        limit: Option<usize>,
    ) -> BackendResult<Vec<Node>> {
        let iter = self
            .nodes
            .values()
            .filter(|n| (n.geom - pt).norm() <= dist)
            .map(|n| project_node(n, fields));
        Ok(take_limited(iter, limit))
    }

    fn get_node_within_box(
        &self,
        bbox: Option<&Aabb>,
        fields: NodeFields,
        limit: Option<usize>,
    ) -> BackendResult<Vec<Node>> {
        let iter = self
            .nodes
            .values()
            .filter(|n| bbox.map_or(true, |b| b.contains_point(&n.geom)))
            .map(|n| project_node(n, fields));
        Ok(take_limited(iter, limit))
    }

    fn get_node_by_face(
        &self,
        faces: &[ElementId],
        fields: NodeFields,
        bbox: Option<&Aabb>,
    ) -> BackendResult<Vec<Node>> {
        Ok(self
            .nodes
            .values()
            .filter(|n| n.containing_face.is_some_and(|f| faces.contains(&f)))
            .filter(|n| bbox.map_or(true, |b| b.contains_point(&n.geom)))
            .map(|n| project_node(n, fields))
            .collect())
    }

    fn insert_nodes(&mut self, nodes: &mut [Node]) -> BackendResult<()> {
        for node in nodes.iter_mut() {
            if node.id == UNASSIGNED_ID {
                self.last_node_id += 1;
                node.id = self.last_node_id;
            } else if self.nodes.contains_key(&node.id) {
                return Err(BackendError::Storage(format!("duplicate node id {}", node.id)));
            } else {
                self.last_node_id = self.last_node_id.max(node.id);
            }
            self.nodes.insert(node.id, node.clone());
        }
        Ok(())
    }

    fn update_nodes(
        &mut self,
        select: &Node,
        select_fields: NodeFields,
        update: &Node,
        update_fields: NodeFields,
        exclude: Option<(&Node, NodeFields)>,
    ) -> BackendResult<usize> {
        let mut count = 0;
        for n in self.nodes.values_mut() {
            if !node_matches(n, select, select_fields) {
                continue;
            }
            if exclude.is_some_and(|(ex, f)| node_matches(n, ex, f)) {
                continue;
            }
            apply_node(n, update, update_fields);
            count += 1;
        }
        Ok(count)
    }

    fn update_nodes_by_id(&mut self, nodes: &[Node], fields: NodeFields) -> BackendResult<usize> {
        let mut count = 0;
        for upd in nodes {
            if let Some(n) = self.nodes.get_mut(&upd.id) {
                apply_node(n, upd, fields);
                count += 1;
            }
        }
        Ok(count)
    }

    fn delete_nodes_by_id(&mut self, ids: &[ElementId]) -> BackendResult<usize> {
        Ok(ids.iter().filter(|id| self.nodes.remove(id).is_some()).count())
    }

    // --- Edges ---

    fn get_edge_by_id(&self, ids: &[ElementId], fields: EdgeFields) -> BackendResult<Vec<Edge>> {
        let mut wanted: Vec<ElementId> = ids.to_vec();
        wanted.sort_unstable();
        wanted.dedup();
        Ok(wanted
            .iter()
            .filter_map(|id| self.edges.get(id))
            .map(|e| project_edge(e, fields))
            .collect())
    }

    fn get_edge_within_distance(
        &self,
        pt: &Point2,
        dist: f64,
        fields: EdgeFields,
        limit: Option<usize>,
    ) -> BackendResult<Vec<Edge>> {
        let iter = self
            .edges
            .values()
            .filter(|e| point_to_linestring_dist(pt, e.geom.points()) <= dist)
            .map(|e| project_edge(e, fields));
        Ok(take_limited(iter, limit))
    }

    fn get_edge_within_box(
        &self,
        bbox: Option<&Aabb>,
        fields: EdgeFields,
        limit: Option<usize>,
    ) -> BackendResult<Vec<Edge>> {
        let iter = self
            .edges
            .values()
            .filter(|e| edge_in_box(e, bbox))
            .map(|e| project_edge(e, fields));
        Ok(take_limited(iter, limit))
    }

    fn get_edge_by_node(&self, nodes: &[ElementId], fields: EdgeFields) -> BackendResult<Vec<Edge>> {
        Ok(self
            .edges
            .values()
            .filter(|e| nodes.contains(&e.start_node) || nodes.contains(&e.end_node))
            .map(|e| project_edge(e, fields))
            .collect())
    }

    fn get_edge_by_face(
        &self,
        faces: &[ElementId],
        fields: EdgeFields,
        bbox: Option<&Aabb>,
    ) -> BackendResult<Vec<Edge>> {
        Ok(self
            .edges
            .values()
            .filter(|e| faces.contains(&e.face_left) || faces.contains(&e.face_right))
            .filter(|e| edge_in_box(e, bbox))
            .map(|e| project_edge(e, fields))
            .collect())
    }

    fn next_edge_id(&mut self) -> BackendResult<ElementId> {
        self.last_edge_id += 1;
        Ok(self.last_edge_id)
    }

    fn insert_edges(&mut self, edges: &mut [Edge]) -> BackendResult<()> {
        for edge in edges.iter_mut() {
            if edge.id == UNASSIGNED_ID {
                self.last_edge_id += 1;
                edge.id = self.last_edge_id;
            } else if self.edges.contains_key(&edge.id) {
                return Err(BackendError::Storage(format!("duplicate edge id {}", edge.id)));
            } else {
                self.last_edge_id = self.last_edge_id.max(edge.id);
            }
            trace!(edge = edge.id, "inserting edge");
            self.edges.insert(edge.id, edge.clone());
        }
        Ok(())
    }

    fn update_edges(
        &mut self,
        select: &Edge,
        select_fields: EdgeFields,
        update: &Edge,
        update_fields: EdgeFields,
        exclude: Option<(&Edge, EdgeFields)>,
    ) -> BackendResult<usize> {
        let mut count = 0;
        for e in self.edges.values_mut() {
            if !edge_matches(e, select, select_fields) {
                continue;
            }
            if exclude.is_some_and(|(ex, f)| edge_matches(e, ex, f)) {
                continue;
            }
            apply_edge(e, update, update_fields);
            count += 1;
        }
        Ok(count)
    }

    fn update_edges_by_id(&mut self, edges: &[Edge], fields: EdgeFields) -> BackendResult<usize> {
        let mut count = 0;
        for upd in edges {
            if let Some(e) = self.edges.get_mut(&upd.id) {
                apply_edge(e, upd, fields);
                count += 1;
            }
        }
        Ok(count)
    }

    fn delete_edges(&mut self, select: &Edge, select_fields: EdgeFields) -> BackendResult<usize> {
        let before = self.edges.len();
        self.edges.retain(|_, e| !edge_matches(e, select, select_fields));
        Ok(before - self.edges.len())
    }

    // --- Faces ---

    fn get_face_by_id(&self, ids: &[ElementId], fields: FaceFields) -> BackendResult<Vec<Face>> {
        let mut wanted: Vec<ElementId> = ids.to_vec();
        wanted.sort_unstable();
        wanted.dedup();
        Ok(wanted
            .iter()
            .filter_map(|id| self.faces.get(id))
            .map(|f| project_face(f, fields))
            .collect())
    }

    fn get_face_within_box(
        &self,
        bbox: Option<&Aabb>,
        fields: FaceFields,
        limit: Option<usize>,
    ) -> BackendResult<Vec<Face>> {
        let iter = self
            .faces
            .values()
            .filter(|f| match (bbox, &f.mbr) {
                (None, _) => true,
                (Some(b), Some(m)) => b.intersects(m),
                (Some(_), None) => false,
            })
            .map(|f| project_face(f, fields));
        Ok(take_limited(iter, limit))
    }

    fn get_face_containing_point(&self, pt: &Point2) -> BackendResult<Option<ElementId>> {
        for face in self.faces.values() {
            if !face.mbr.is_some_and(|m| m.contains_point(pt)) {
                continue;
            }
            let edges: Vec<Edge> = self
                .edges
                .values()
                .filter(|e| e.face_left == face.id || e.face_right == face.id)
                .cloned()
                .collect();
            let poly = build_face_polygon(&edges, face.id)
                .map_err(|e| BackendError::Storage(e.to_string()))?;
            if poly.locate(pt) == Location::Inside {
                return Ok(Some(face.id));
            }
        }
        Ok(None)
    }

    fn insert_faces(&mut self, faces: &mut [Face]) -> BackendResult<()> {
        for face in faces.iter_mut() {
            if face.id == UNASSIGNED_ID {
                self.last_face_id += 1;
                face.id = self.last_face_id;
            } else if face.id == 0 || self.faces.contains_key(&face.id) {
                return Err(BackendError::Storage(format!("duplicate face id {}", face.id)));
            } else {
                self.last_face_id = self.last_face_id.max(face.id);
            }
            self.faces.insert(face.id, face.clone());
        }
        Ok(())
    }

    fn update_faces_by_id(&mut self, faces: &[Face]) -> BackendResult<usize> {
        let mut count = 0;
        for upd in faces {
            if let Some(f) = self.faces.get_mut(&upd.id) {
                f.mbr = upd.mbr;
                count += 1;
            }
        }
        Ok(count)
    }

    fn delete_faces_by_id(&mut self, ids: &[ElementId]) -> BackendResult<usize> {
        Ok(ids.iter().filter(|id| self.faces.remove(id).is_some()).count())
    }

    // --- Notifications ---

    fn update_topo_geom_edge_split(
        &mut self,
        split_edge: ElementId,
        new_edge1: ElementId,
        new_edge2: Option<ElementId>,
    ) -> BackendResult<()> {
        self.events.push(TopoGeomEvent::EdgeSplit {
            edge: split_edge,
            new1: new_edge1,
            new2: new_edge2,
        });
        Ok(())
    }

    fn update_topo_geom_face_split(
        &mut self,
        split_face: ElementId,
        new_face1: ElementId,
        new_face2: Option<ElementId>,
    ) -> BackendResult<()> {
        self.events.push(TopoGeomEvent::FaceSplit {
            face: split_face,
            new1: new_face1,
            new2: new_face2,
        });
        Ok(())
    }

    fn update_topo_geom_edge_heal(
        &mut self,
        edge1: ElementId,
        edge2: ElementId,
        new_edge: ElementId,
    ) -> BackendResult<()> {
        self.events.push(TopoGeomEvent::EdgeHeal {
            edge1,
            edge2,
            new_edge,
        });
        Ok(())
    }

    fn update_topo_geom_face_heal(
        &mut self,
        face1: ElementId,
        face2: ElementId,
        new_face: ElementId,
    ) -> BackendResult<()> {
        self.events.push(TopoGeomEvent::FaceHeal {
            face1,
            face2,
            new_face,
        });
        Ok(())
    }

    fn check_topo_geom_rem_edge(
        &self,
        edge: ElementId,
        _face_left: ElementId,
        _face_right: ElementId,
    ) -> BackendResult<()> {
        if self.protected_edges.contains(&edge) {
            return Err(BackendError::Forbidden(format!(
                "edge {edge} is referenced by a composite geometry"
            )));
        }
        Ok(())
    }

    fn check_topo_geom_rem_node(
        &self,
        node: ElementId,
        _edge1: ElementId,
        _edge2: ElementId,
    ) -> BackendResult<()> {
        if self.protected_nodes.contains(&node) {
            return Err(BackendError::Forbidden(format!(
                "node {node} is referenced by a composite geometry"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::LineString;
    use crate::topology::OrientedEdge;

    fn edge(id: ElementId, s: ElementId, e: ElementId, coords: &[(f64, f64)]) -> Edge {
        let mut edge = Edge::new(s, e, LineString::from_coords(coords));
        edge.id = id;
        edge
    }

    #[test]
    fn node_ids_are_assigned_in_order() {
        let mut be = MemoryBackend::new();
        let mut nodes = vec![
            Node::new(Point2::new(0.0, 0.0), Some(0)),
            Node::new(Point2::new(1.0, 0.0), Some(0)),
        ];
        be.insert_nodes(&mut nodes).unwrap();
        assert_eq!(nodes[0].id, 1);
        assert_eq!(nodes[1].id, 2);
        let got = be.get_node_by_id(&[2, 2, 9], NodeFields::ALL).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].geom, Point2::new(1.0, 0.0));
    }

    #[test]
    fn partial_read_leaves_unselected_fields_default() {
        let mut be = MemoryBackend::new();
        let mut nodes = vec![Node::new(Point2::new(3.0, 4.0), Some(7))];
        be.insert_nodes(&mut nodes).unwrap();
        let got = be.get_node_by_id(&[1], NodeFields::ID).unwrap();
        assert_eq!(got[0].id, 1);
        assert_eq!(got[0].containing_face, None);
        assert_eq!(got[0].geom, Point2::origin());
    }

    #[test]
    fn selective_update_with_exclusion() {
        let mut be = MemoryBackend::new();
        let mut edges = vec![
            edge(1, 1, 2, &[(0.0, 0.0), (1.0, 0.0)]),
            edge(2, 2, 3, &[(1.0, 0.0), (2.0, 0.0)]),
            edge(3, 2, 4, &[(1.0, 0.0), (1.0, 1.0)]),
        ];
        for e in &mut edges {
            e.next_right = -1;
        }
        be.insert_edges(&mut edges).unwrap();
        let sel = Edge {
            next_right: -1,
            start_node: 2,
            ..Edge::default()
        };
        let upd = Edge {
            next_right: -5,
            ..Edge::default()
        };
        let ex = Edge {
            id: 3,
            ..Edge::default()
        };
        let n = be
            .update_edges(
                &sel,
                EdgeFields::NEXT_RIGHT | EdgeFields::START_NODE,
                &upd,
                EdgeFields::NEXT_RIGHT,
                Some((&ex, EdgeFields::ID)),
            )
            .unwrap();
        assert_eq!(n, 1);
        let got = be.get_edge_by_id(&[1, 2, 3], EdgeFields::ALL).unwrap();
        assert_eq!(got[0].next_right, -1);
        assert_eq!(got[1].next_right, -5);
        assert_eq!(got[2].next_right, -1);
    }

    #[test]
    fn box_and_distance_queries() {
        let mut be = MemoryBackend::new();
        let mut edges = vec![
            edge(-1, 1, 2, &[(0.0, 0.0), (10.0, 0.0)]),
            edge(-1, 3, 4, &[(0.0, 5.0), (10.0, 5.0)]),
        ];
        be.insert_edges(&mut edges).unwrap();
        let near = be
            .get_edge_within_distance(&Point2::new(5.0, 1.0), 1.5, EdgeFields::ID, None)
            .unwrap();
        assert_eq!(near.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1]);
        let bbox = Aabb::new(Point2::new(-1.0, 4.0), Point2::new(1.0, 6.0));
        let boxed = be.get_edge_within_box(Some(&bbox), EdgeFields::ID, None).unwrap();
        assert_eq!(boxed.iter().map(|e| e.id).collect::<Vec<_>>(), vec![2]);
        let all = be.get_edge_within_box(None, EdgeFields::ID, Some(1)).unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn default_ring_walk_follows_links() {
        // Triangle 1 -> 2 -> 3 walked on the left side.
        let mut be = MemoryBackend::new();
        let mut edges = vec![
            edge(1, 1, 2, &[(0.0, 0.0), (1.0, 0.0)]),
            edge(2, 2, 3, &[(1.0, 0.0), (0.0, 1.0)]),
            edge(3, 3, 1, &[(0.0, 1.0), (0.0, 0.0)]),
        ];
        edges[0].next_left = 2;
        edges[1].next_left = 3;
        edges[2].next_left = 1;
        be.insert_edges(&mut edges).unwrap();
        let ring = be.get_ring_edges(OrientedEdge::forward(2), None).unwrap();
        let ids: Vec<_> = ring.iter().map(|o| o.signed()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        let limited = be.get_ring_edges(OrientedEdge::forward(1), Some(1)).unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[test]
    fn vetoes_protected_elements() {
        let mut be = MemoryBackend::new();
        be.protect_edge(4);
        assert!(matches!(
            be.check_topo_geom_rem_edge(4, 0, 0),
            Err(BackendError::Forbidden(_))
        ));
        assert!(be.check_topo_geom_rem_edge(5, 0, 0).is_ok());
    }
}
