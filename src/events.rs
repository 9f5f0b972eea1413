//! Fire-and-forget output of a tick
//!
//! The core never plays audio, spawns prefabs or draws UI itself. Everything a
//! presentation layer should react to is returned as a [`ForgeEvent`].

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::connector::ConnectorPair;
use crate::core::types::ComponentId;
use crate::core::types::ItemId;

/// Audio cue requested by the core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    GunShot,
    GunEmpty,
    GunReload,
    BowRelease,
    EnemyGrowl,
    EnemyAttack,
    EnemyHit,
    EnemyDeath,
}

/// Animator trigger requested by an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationTrigger {
    Walk,
    Idle,
    Attack,
    Dead,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForgeEvent {
    /// Two clusters were merged into a new item
    ItemFinished {
        item: ItemId,
        pair: ConnectorPair,
        members: Vec<ComponentId>,
        base: Option<ComponentId>,
    },
    Sound {
        cue: SoundCue,
        at: Vec3,
    },
    /// A gun fired one bullet
    ProjectileSpawned {
        gun: ComponentId,
        position: Vec3,
        /// Unit flight direction
        direction: Vec3,
        /// Impulse to apply to the bullet body
        force: Vec3,
        damage: f32,
    },
    ArrowLaunched {
        bow: ComponentId,
        position: Vec3,
        direction: Vec3,
        force: Vec3,
        damage: f32,
    },
    /// Ammo used for a reload should be removed from the world
    AmmoConsumed {
        gun: ComponentId,
    },
    /// A bow mirrored a component onto its other side
    ComponentDuplicated {
        original: ComponentId,
        copy: ComponentId,
    },
    /// Floating damage number
    Popup {
        position: Vec3,
        text: String,
    },
    Animation {
        trigger: AnimationTrigger,
    },
    PlayerDamaged {
        amount: f32,
    },
    /// A resource produced one crafting material
    MaterialSpawned {
        material: String,
        position: Vec3,
        velocity: Vec3,
    },
    ResourceDepleted {
        position: Vec3,
        /// Set when the node should topple
        fall_velocity: Option<Vec3>,
        despawn_after: f32,
    },
    /// A loose component was packed away into an inventory
    ComponentStored {
        component: ComponentId,
    },
}
