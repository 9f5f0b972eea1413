//! Workshop configuration with documented constants
//!
//! Every tuning number of the crate is collected here.
//! The config is passed explicitly to whatever needs it; there is no global.

use serde::Deserialize;
use std::path::Path;

use crate::core::error::{ForgeError, Result};

/// Configuration for the assembly, combat and harvesting systems
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    // === CONNECTORS ===
    /// How far an output's probe ray reaches along its forward axis (world units)
    pub connector_probe_distance: f32,

    /// Radius of the sphere an input presents to probe rays
    ///
    /// Only used by the built-in geometric probe. A host with a real physics
    /// engine answers probes from its own colliders instead.
    pub connector_hit_radius: f32,

    // === GUNS ===
    /// Trigger pressure above which a shot is requested
    pub trigger_pull_threshold: f32,

    /// Trigger pressure below which a manual gun re-arms
    ///
    /// The gap between pull and release keeps a half-held trigger from
    /// chattering between shots.
    pub trigger_release_threshold: f32,

    /// How far behind the shooting point bullets are spawned
    pub muzzle_offset: f32,

    /// Largest jitter radius, reached at 0 accuracy
    pub max_accuracy_spread: f32,

    // === BOWS ===
    /// Seconds before a bow accepts a new arrow after firing
    pub arrow_cooldown: f32,

    /// Arrows drawn less than this past the resting point are not fired
    pub minimum_shoot_distance: f32,

    // === ENEMIES ===
    /// Idle enemies start chasing when the target is farther than this
    pub chase_start_distance: f32,

    /// Chasing enemies start attacking when within this distance
    pub attack_range: f32,

    /// Attacking enemies resume the chase beyond this distance
    pub attack_leave_distance: f32,

    /// Seconds between two attacks
    pub attack_cooldown: f32,

    /// Seconds between the attack animation starting and the hit landing
    pub damage_delay: f32,

    /// Movement speed of the navigation stand-in (units per second)
    pub enemy_speed: f32,

    /// Slerp factor for turning towards the target while attacking
    pub turn_rate: f32,

    // === RESOURCES ===
    /// Materials from a hit appear this far along the node-to-attacker
    /// offset (1.0 is the attacker's own position)
    pub material_hit_offset: f32,

    /// Radius of the burst when a depleted node releases everything
    pub material_release_radius: f32,

    /// Outward speed of burst materials
    pub material_release_speed: f32,

    /// Speed a toppling node is pushed away with
    pub resource_fall_speed: f32,

    // === INVENTORY ===
    /// Slots in an inventory
    pub inventory_max_items: usize,

    /// Largest stack a stackable slot can hold
    pub inventory_max_stacks: u32,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            connector_probe_distance: 0.05,
            connector_hit_radius: 0.02,

            trigger_pull_threshold: 0.6,
            trigger_release_threshold: 0.3,
            muzzle_offset: 0.1,
            max_accuracy_spread: 0.5,

            arrow_cooldown: 0.3,
            minimum_shoot_distance: 0.05,

            chase_start_distance: 1.0,
            attack_range: 1.0,
            attack_leave_distance: 1.5,
            attack_cooldown: 3.0,
            damage_delay: 1.5,
            enemy_speed: 1.5,
            turn_rate: 10.0,

            material_hit_offset: 1.1,
            material_release_radius: 1.0,
            material_release_speed: 4.0,
            resource_fall_speed: 3.0,

            inventory_max_items: 8,
            inventory_max_stacks: 10,
        }
    }
}

impl ForgeConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML, filling missing keys with defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ForgeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file on disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.trigger_release_threshold >= self.trigger_pull_threshold {
            return Err(ForgeError::Config(format!(
                "trigger_release_threshold ({}) should be < trigger_pull_threshold ({})",
                self.trigger_release_threshold, self.trigger_pull_threshold
            )));
        }

        if self.attack_leave_distance < self.attack_range {
            return Err(ForgeError::Config(format!(
                "attack_leave_distance ({}) should be >= attack_range ({})",
                self.attack_leave_distance, self.attack_range
            )));
        }

        if self.connector_probe_distance <= 0.0 || self.connector_hit_radius <= 0.0 {
            return Err(ForgeError::Config("Connector distances must be positive".into()));
        }

        if self.arrow_cooldown < 0.0 || self.attack_cooldown < 0.0 || self.damage_delay < 0.0 {
            return Err(ForgeError::Config("Durations must not be negative".into()));
        }

        if self.inventory_max_stacks == 0 {
            return Err(ForgeError::Config("inventory_max_stacks must be at least 1".into()));
        }

        Ok(())
    }
}
