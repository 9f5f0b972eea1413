//! Connector graph
//!
//! Components carry directed half-edges: inputs wait passively, outputs
//! probe along their forward axis for a free input. Once two connectors pair
//! up they stay paired for the rest of their lifetime.

pub mod graph;
pub mod probe;

pub use graph::{ConnectorGraph, ConnectorInput, ConnectorOutput, ConnectorPair, LayerMask};
pub use probe::{ConnectorProbe, ProbeHit, ProbeRay, ProbeTarget, RaySphereProbe};
