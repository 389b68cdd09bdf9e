//! Primitive edits of nodes and edges that never split or merge faces.

mod change_geom;
pub(crate) mod checks;
mod heal;
mod iso_edge;
mod iso_node;
mod split;

pub use change_geom::ChangeEdgeGeom;
pub use heal::{ModEdgeHeal, NewEdgeHeal};
pub use iso_edge::{AddIsoEdge, RemIsoEdge};
pub use iso_node::{AddIsoNode, MoveIsoNode, RemoveIsoNode};
pub use split::{ModEdgeSplit, NewEdgesSplit};

pub(crate) use iso_node::insert_node;
