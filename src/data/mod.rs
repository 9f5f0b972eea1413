//! Static component data
//!
//! Templates are read-only at runtime; spawning a component copies what it
//! needs out of its template.

pub mod catalog;
pub mod template;

pub use catalog::ComponentCatalog;
pub use template::{
    BaseKind, BaseSpec, ComponentTemplate, EngineSpec, OffensiveSpec, PoseSpec, RecipeCost,
    StatSpec,
};
