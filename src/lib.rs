//! Planar topology engine.
//!
//! Maintains nodes, edges and faces forming a consistent subdivision of the
//! plane, stored through a [`TopologyBackend`](backend::TopologyBackend) and
//! edited through the operations in [`operations`].

pub mod backend;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod topology;

pub use error::{Result, TopolisError};
