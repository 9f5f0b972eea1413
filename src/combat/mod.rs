//! Damage dealing and damage taking
//!
//! Offensive parts carry a damage stat plus one efficiency stat per
//! resistance type; damageable things name the resistance that hurts them.
//! Resource nodes turn the damage they take into crafting materials.

pub mod damageable;
pub mod offensive;
pub mod resource;

pub use damageable::{popup_text, DamageableEntity};
pub use offensive::OffensiveEntity;
pub use resource::{ResourceNode, ResourceSpec};
