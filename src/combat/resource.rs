//! Harvestable resource nodes (trees, rocks)
//!
//! Health lost by a node accumulates in a damage threshold. Each full
//! `damage_needed_for_spawn` in the threshold becomes one crafting material,
//! spawned on the hit that earned it, or held back and released all at once
//! when the node is depleted.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::damageable::{popup_text, DamageableEntity};
use super::offensive::OffensiveEntity;
use crate::core::config::ForgeConfig;
use crate::core::error::{ForgeError, Result};
use crate::events::ForgeEvent;
use crate::stats::{FloatStat, ModifierName};

fn default_valid_tags() -> Vec<String> {
    vec!["Tool".to_string()]
}

fn default_hit_points() -> f32 {
    100.0
}

fn default_damage_per_material() -> f32 {
    20.0
}

/// Data describing one kind of resource node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSpec {
    /// Material type handed out; matches recipe costs
    pub material: String,
    /// Efficiency stat an attacker needs to make a dent
    pub resistance: ModifierName,
    #[serde(default = "default_valid_tags")]
    pub valid_tags: Vec<String>,
    #[serde(default = "default_hit_points")]
    pub starting_hit_points: f32,
    #[serde(default = "default_damage_per_material")]
    pub damage_needed_for_spawn: f32,
    /// Keep every material until the node is depleted
    #[serde(default)]
    pub release_all_on_end: bool,
    /// The depleted node topples away from whoever finished it
    #[serde(default)]
    pub add_physics_on_end: bool,
    /// Seconds a depleted node lingers before the host removes it
    #[serde(default)]
    pub time_to_die: f32,
}

impl ResourceSpec {
    pub fn new(material: impl Into<String>, resistance: ModifierName) -> Self {
        Self {
            material: material.into(),
            resistance,
            valid_tags: default_valid_tags(),
            starting_hit_points: default_hit_points(),
            damage_needed_for_spawn: default_damage_per_material(),
            release_all_on_end: false,
            add_physics_on_end: false,
            time_to_die: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResourceNode {
    spec: ResourceSpec,
    position: Vec3,
    /// Centre of the burst when everything is released at once
    release_point: Vec3,
    damageable: DamageableEntity,
    damage_threshold: f32,
    dead: bool,
    hit_offset: f32,
    release_radius: f32,
    release_speed: f32,
    fall_speed: f32,
    rng: ChaCha8Rng,
    events: Vec<ForgeEvent>,
}

impl ResourceNode {
    pub fn new(spec: ResourceSpec, position: Vec3, config: &ForgeConfig, seed: u64) -> Result<Self> {
        if spec.damage_needed_for_spawn <= 0.0 {
            return Err(ForgeError::Catalog(format!(
                "resource '{}' needs a positive damage_needed_for_spawn",
                spec.material
            )));
        }

        let tags: Vec<&str> = spec.valid_tags.iter().map(String::as_str).collect();
        let damageable = DamageableEntity::new(spec.resistance, spec.starting_hit_points, &tags);

        Ok(Self {
            spec,
            position,
            release_point: position,
            damageable,
            damage_threshold: 0.0,
            dead: false,
            hit_offset: config.material_hit_offset,
            release_radius: config.material_release_radius,
            release_speed: config.material_release_speed,
            fall_speed: config.resource_fall_speed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            events: Vec::new(),
        })
    }

    pub fn with_release_point(mut self, point: Vec3) -> Self {
        self.release_point = point;
        self
    }

    pub fn material(&self) -> &str {
        &self.spec.material
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn health(&self) -> &FloatStat {
        &self.damageable.health
    }

    /// Fill of the hit point bar in `[0, 1]`
    pub fn health_fraction(&self) -> f32 {
        let maximum = self.damageable.health.current_maximum();
        if maximum <= 0.0 {
            return 0.0;
        }
        self.damageable.health.current() / maximum
    }

    /// Damage banked towards the next material
    pub fn damage_threshold(&self) -> f32 {
        self.damage_threshold
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// A tool touched the node. Returns the damage dealt.
    pub fn on_hit(
        &mut self,
        tag: &str,
        attacker: &mut OffensiveEntity,
        velocity: f32,
        attacker_position: Vec3,
    ) -> Option<f32> {
        if self.dead {
            return None;
        }

        let damage = self.damageable.on_hit(tag, attacker, velocity)?;
        self.events.push(ForgeEvent::Popup {
            position: self.position,
            text: popup_text(damage),
        });
        for change in self.damageable.drain_changes() {
            self.on_damage_taken(change.current, change.difference, attacker_position);
        }

        if !self.spec.release_all_on_end {
            self.spawn_towards(attacker_position);
        }
        Some(damage)
    }

    fn on_damage_taken(&mut self, current: f32, difference: f32, attacker_position: Vec3) {
        if self.dead {
            return;
        }
        self.damage_threshold += difference;

        if current.abs() > f32::EPSILON {
            return;
        }

        self.dead = true;
        let fall_velocity = self
            .spec
            .add_physics_on_end
            .then(|| (self.position - attacker_position).normalize_or_zero() * self.fall_speed);
        self.events.push(ForgeEvent::ResourceDepleted {
            position: self.position,
            fall_velocity,
            despawn_after: self.spec.time_to_die,
        });
        tracing::debug!(material = %self.spec.material, position = ?self.position, "Resource depleted");

        if self.spec.release_all_on_end {
            self.release_all();
        }
    }

    /// One material per banked threshold, just past the attacker
    fn spawn_towards(&mut self, attacker_position: Vec3) {
        let direction = attacker_position - self.position;
        while self.damage_threshold >= self.spec.damage_needed_for_spawn {
            self.damage_threshold -= self.spec.damage_needed_for_spawn;
            self.events.push(ForgeEvent::MaterialSpawned {
                material: self.spec.material.clone(),
                position: self.position + direction * self.hit_offset,
                velocity: Vec3::ZERO,
            });
        }
    }

    /// Burst every banked material out of the release point
    fn release_all(&mut self) {
        let mut released = 0;
        while self.damage_threshold >= self.spec.damage_needed_for_spawn {
            self.damage_threshold -= self.spec.damage_needed_for_spawn;
            let offset = random_in_unit_sphere(&mut self.rng) * self.release_radius;
            self.events.push(ForgeEvent::MaterialSpawned {
                material: self.spec.material.clone(),
                position: self.release_point + offset,
                velocity: offset.normalize_or_zero() * self.release_speed,
            });
            released += 1;
        }
        tracing::debug!(material = %self.spec.material, released, "Resource released its materials");
    }

    /// Events produced by hits not yet collected
    pub fn drain_events(&mut self) -> Vec<ForgeEvent> {
        std::mem::take(&mut self.events)
    }
}

fn random_in_unit_sphere(rng: &mut impl Rng) -> Vec3 {
    loop {
        let point = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if point.length_squared() <= 1.0 {
            return point;
        }
    }
}
