use rustc_hash::FxHashSet;
use tracing::trace;

use crate::backend::TopologyBackend;
use crate::engine::GeometryEngine;
use crate::error::{Result, TopologyError};
use crate::topology::{OrientedEdge, Topology};

/// Walks the ring on the left of an oriented edge.
pub struct GetRingEdges {
    start: OrientedEdge,
    limit: Option<usize>,
}

impl GetRingEdges {
    /// Creates a new `GetRingEdges` query. A `limit` bounds the walk length.
    #[must_use]
    pub fn new(start: OrientedEdge, limit: Option<usize>) -> Self {
        Self { start, limit }
    }

    /// Executes the query, returning the ring starting at `start`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::RingWalkLimit`] if the ring does not close
    /// within the limit, [`TopologyError::RingWalkRepeat`] if an oriented edge
    /// comes back before the start does, or a backend error.
    pub fn execute<B: TopologyBackend, G: GeometryEngine>(
        &self,
        topo: &Topology<B, G>,
    ) -> Result<Vec<OrientedEdge>> {
        let ring = topo.backend().get_ring_edges(self.start, self.limit)?;
        if let Some(limit) = self.limit {
            if ring.len() > limit {
                return Err(TopologyError::RingWalkLimit {
                    start: self.start.signed(),
                    limit,
                }
                .into());
            }
        }
        let mut seen = FxHashSet::default();
        for oe in &ring {
            if !seen.insert(*oe) {
                return Err(TopologyError::RingWalkRepeat {
                    start: self.start.signed(),
                    repeated: oe.signed(),
                }
                .into());
            }
        }
        trace!(start = %self.start, len = ring.len(), "walked ring");
        Ok(ring)
    }
}
