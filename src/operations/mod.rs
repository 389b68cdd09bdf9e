//! Topology operations.
//!
//! Each operation is a small struct built with `new(..)` and run with
//! `execute(&self, topo)` against a [`Topology`](crate::topology::Topology).

pub mod edit;
pub mod face;
pub mod polygonize;
pub mod populate;
pub mod query;
pub mod snap;

#[cfg(test)]
mod testing;
