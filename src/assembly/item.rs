//! Items, bodies and hands

use glam::Vec3;
use serde::Serialize;

use crate::core::types::{BodyId, ComponentId, ItemId, NodeId};

/// A merged aggregate of components sharing one body
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub node: NodeId,
    /// Members in merge order, no duplicates
    pub components: Vec<ComponentId>,
    /// The component carrying the item's special behavior
    pub base: Option<ComponentId>,
    /// The member a hand is holding the item by
    pub currently_grabbed: Option<ComponentId>,
    pub body: Option<BodyId>,
}

impl Item {
    pub fn contains(&self, component: ComponentId) -> bool {
        self.components.contains(&component)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BodyOwner {
    Component(ComponentId),
    Item(ItemId),
}

/// Physical body handle; the physics itself lives with the host
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RigidBody {
    pub owner: BodyOwner,
    pub kinematic: bool,
    pub use_gravity: bool,
}

impl RigidBody {
    pub fn dynamic(owner: BodyOwner) -> Self {
        Self {
            owner,
            kinematic: false,
            use_gravity: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Grab {
    pub component: ComponentId,
    pub grab_point: Vec3,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Hand {
    pub holding: Option<Grab>,
}
