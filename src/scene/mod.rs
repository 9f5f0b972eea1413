//! Pose hierarchy
//!
//! A minimal stand-in for the engine's transform tree: every component,
//! connector and item owns a node, and world poses are derived by walking up
//! the parent chain.

pub mod graph;
pub mod orient;
pub mod pose;

pub use graph::SceneGraph;
pub use orient::{from_to_rotation, orientate_new_piece};
pub use pose::Pose;
