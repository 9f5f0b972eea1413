//! A single modular part

use glam::Vec3;
use serde::Serialize;

use crate::combat::OffensiveEntity;
use crate::core::types::{BodyId, ComponentId, HandId, InputId, ItemId, NodeId, OutputId};
use crate::data::BaseKind;
use crate::stats::Modifier;

/// Where projectiles leave a barrel
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ShootingPoint {
    pub muzzle: NodeId,
}

/// Firing mechanism; a gun without one cannot shoot
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GunEngine {
    pub automatic: bool,
}

/// Part that forwards ammo to the gun it is attached to
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Reloader {
    pub gun_base: Option<ComponentId>,
}

/// What the end of a drawn line is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineTarget {
    Node(NodeId),
    /// The arrow armed on the given bow
    Arrow(ComponentId),
}

/// One half of a bow string
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LineDrawer {
    pub start: NodeId,
    pub target: Option<LineTarget>,
}

/// Optional roles a component can play, fixed when it is spawned
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    pub base: Option<BaseKind>,
    pub shooting_point: Option<ShootingPoint>,
    pub engine: Option<GunEngine>,
    pub reloader: Option<Reloader>,
    pub offensive: Option<OffensiveEntity>,
    pub line_drawer: Option<LineDrawer>,
}

#[derive(Debug, Clone)]
pub struct ItemComponent {
    pub id: ComponentId,
    /// Template this was spawned from
    pub template: String,
    pub display_name: String,
    pub unique: bool,
    /// Type tag checked for uniqueness
    pub kind: String,
    pub node: NodeId,
    pub inputs: Vec<InputId>,
    pub outputs: Vec<OutputId>,
    /// Set once the component is merged
    pub item: Option<ItemId>,
    /// Own body while standalone; items carry a single shared body
    pub body: Option<BodyId>,
    pub modifiers: Vec<Modifier>,
    pub capabilities: Capabilities,
    pub grabbed_by: Option<HandId>,
    /// Grab point (local offset) of the hand holding this
    pub grab_point: Vec3,
    pub can_be_grabbed: bool,
    /// False for bow copies: their connectors never probe
    pub enabled: bool,
}

impl ItemComponent {
    pub fn is_base(&self) -> bool {
        self.capabilities.base.is_some()
    }
}
