use thiserror::Error;

use crate::core::types::{BodyId, ComponentId, InputId, ItemId, NodeId, OutputId};

#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("Component not found: {0}")]
    ComponentNotFound(ComponentId),

    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Input connector not found: {0}")]
    InputNotFound(InputId),

    #[error("Output connector not found: {0}")]
    OutputNotFound(OutputId),

    #[error("Scene node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {0} cannot be parented under its own descendant")]
    InvalidHierarchy(NodeId),

    #[error("Body not found: {0}")]
    BodyNotFound(BodyId),

    #[error("Component template not found: {0}")]
    TemplateNotFound(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ForgeError>;
