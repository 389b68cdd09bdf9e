//! Fixtures shared by the operation tests.

use crate::backend::MemoryBackend;
use crate::engine::PlanarEngine;
use crate::geometry::LineString;
use crate::math::Point2;
use crate::topology::{Topology, TopologyConfig};

pub(crate) fn topology() -> Topology<MemoryBackend> {
    Topology::new(
        MemoryBackend::new(),
        PlanarEngine::default(),
        TopologyConfig::new("test"),
    )
}

pub(crate) fn pt(x: f64, y: f64) -> Point2 {
    Point2::new(x, y)
}

pub(crate) fn line(coords: &[(f64, f64)]) -> LineString {
    LineString::from_coords(coords)
}
