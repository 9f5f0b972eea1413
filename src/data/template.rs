//! Component template definitions

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::scene::Pose;
use crate::stats::{FloatStat, Modifier, ModifierName};

fn forward_axis() -> [f32; 3] {
    [0.0, 0.0, 1.0]
}

fn up_axis() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

/// Local pose written as a position plus forward/up directions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseSpec {
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default = "forward_axis")]
    pub forward: [f32; 3],
    #[serde(default = "up_axis")]
    pub up: [f32; 3],
}

impl PoseSpec {
    pub fn new(position: [f32; 3], forward: [f32; 3], up: [f32; 3]) -> Self {
        Self {
            position,
            forward,
            up,
        }
    }

    pub fn to_pose(&self) -> Pose {
        Pose::looking(
            Vec3::from(self.position),
            Vec3::from(self.forward),
            Vec3::from(self.up),
        )
    }
}

impl Default for PoseSpec {
    fn default() -> Self {
        Self::new([0.0; 3], forward_axis(), up_axis())
    }
}

/// Starting amount of a stat
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatSpec {
    pub name: ModifierName,
    #[serde(default)]
    pub base: f32,
}

impl StatSpec {
    pub fn new(name: ModifierName, base: f32) -> Self {
        Self { name, base }
    }

    pub fn build(&self) -> FloatStat {
        FloatStat::new(self.name, self.base)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseKind {
    /// Recomputes stats only
    Generic,
    /// Pushes damage into offensive parts
    Tool,
    Gun,
    Bow,
}

/// Item base behavior carried by a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseSpec {
    pub kind: BaseKind,
    #[serde(default)]
    pub stats: Vec<StatSpec>,
    /// Bow only: input index pairs mirrored onto each other
    #[serde(default)]
    pub pairings: Vec<[usize; 2]>,
    /// Bow only: where arrows are armed
    #[serde(default)]
    pub arrow_anchor: Option<PoseSpec>,
    /// Bow only: how far an arrow can be drawn back
    #[serde(default)]
    pub arrow_size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineSpec {
    #[serde(default)]
    pub automatic: bool,
}

/// Damage dealing part (axe head, blade...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffensiveSpec {
    pub stats: Vec<StatSpec>,
    #[serde(default)]
    pub use_velocity: bool,
    #[serde(default)]
    pub min_velocity: f32,
    #[serde(default)]
    pub max_velocity: f32,
    #[serde(default)]
    pub deal_damage_once: bool,
}

/// Materials consumed to craft one component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeCost {
    pub material: String,
    pub amount: u32,
}

/// Everything needed to spawn a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentTemplate {
    /// Unique identifier
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    /// At most one component of this kind per item
    #[serde(default)]
    pub unique: bool,
    /// Type tag used by the uniqueness check
    pub kind: String,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub inputs: Vec<PoseSpec>,
    #[serde(default)]
    pub outputs: Vec<PoseSpec>,
    #[serde(default)]
    pub base: Option<BaseSpec>,
    /// Muzzle pose for gun barrels
    #[serde(default)]
    pub shooting_point: Option<PoseSpec>,
    #[serde(default)]
    pub engine: Option<EngineSpec>,
    #[serde(default)]
    pub reloader: bool,
    #[serde(default)]
    pub offensive: Option<OffensiveSpec>,
    /// Start of the bow string drawn from this part
    #[serde(default)]
    pub line_drawer: Option<PoseSpec>,
    #[serde(default)]
    pub recipe: Vec<RecipeCost>,
    /// Several copies share one inventory slot
    #[serde(default)]
    pub stackable: bool,
}

impl ComponentTemplate {
    /// Minimal template with no connectors or capabilities
    pub fn new(name: impl Into<String>, kind: impl Into<String>, unique: bool) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            unique,
            kind: kind.into(),
            modifiers: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            base: None,
            shooting_point: None,
            engine: None,
            reloader: false,
            offensive: None,
            line_drawer: None,
            recipe: Vec::new(),
            stackable: false,
        }
    }

    pub fn with_input(mut self, pose: PoseSpec) -> Self {
        self.inputs.push(pose);
        self
    }

    pub fn with_output(mut self, pose: PoseSpec) -> Self {
        self.outputs.push(pose);
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_base(mut self, base: BaseSpec) -> Self {
        self.base = Some(base);
        self
    }

    pub fn is_base(&self) -> bool {
        self.base.is_some()
    }
}
