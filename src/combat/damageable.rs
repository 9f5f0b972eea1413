//! Things that can be hurt

use serde::{Deserialize, Serialize};

use super::offensive::OffensiveEntity;
use crate::stats::{FloatStat, ModifierName, StatChange};

/// Text shown in the floating damage popup
pub fn popup_text(damage: f32) -> String {
    format!("{}", (damage * 10.0).ceil())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageableEntity {
    /// The efficiency stat an attacker needs to hurt this
    pub resistance: ModifierName,
    pub health: FloatStat,
    /// Tags an attacker's body must carry to count
    pub valid_tags: Vec<String>,
}

impl DamageableEntity {
    pub fn new(resistance: ModifierName, health: f32, valid_tags: &[&str]) -> Self {
        Self {
            resistance,
            health: FloatStat::new(ModifierName::Health, health),
            valid_tags: valid_tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health.current() <= f32::EPSILON
    }

    /// Apply a hit. Returns the damage dealt, or `None` when the hit was
    /// ignored (wrong tag, no damage, already dead).
    pub fn on_hit(&mut self, tag: &str, attacker: &mut OffensiveEntity, velocity: f32) -> Option<f32> {
        if !self.valid_tags.iter().any(|t| t == tag) {
            return None;
        }

        let damage = attacker.calculate_current_damage(self.resistance, velocity);
        if damage.abs() <= f32::EPSILON || self.is_dead() {
            return None;
        }

        self.health.set_current(self.health.current() - damage);
        Some(damage)
    }

    pub fn drain_changes(&mut self) -> Vec<StatChange> {
        self.health.drain_changes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_reduces_health() {
        let mut tree = DamageableEntity::new(ModifierName::WoodEfficiency, 30.0, &["Tool"]);
        let mut axe = OffensiveEntity::new(vec![
            FloatStat::new(ModifierName::Damage, 12.0),
            FloatStat::new(ModifierName::WoodEfficiency, 100.0),
        ]);

        assert_eq!(tree.on_hit("Tool", &mut axe, 0.0), Some(12.0));
        assert_eq!(tree.health.current(), 18.0);
        assert_eq!(tree.drain_changes()[0].difference, 12.0);
    }

    #[test]
    fn test_invalid_tag_ignored() {
        let mut tree = DamageableEntity::new(ModifierName::WoodEfficiency, 30.0, &["Tool"]);
        let mut axe = OffensiveEntity::new(vec![
            FloatStat::new(ModifierName::Damage, 12.0),
            FloatStat::new(ModifierName::WoodEfficiency, 100.0),
        ]);
        assert_eq!(tree.on_hit("Projectile", &mut axe, 0.0), None);
        assert_eq!(tree.health.current(), 30.0);
    }

    #[test]
    fn test_dead_entity_ignores_hits() {
        let mut target = DamageableEntity::new(ModifierName::Health, 5.0, &["Projectile"]);
        let mut first = OffensiveEntity::projectile(10.0, ModifierName::Health);
        let mut second = OffensiveEntity::projectile(10.0, ModifierName::Health);

        assert_eq!(target.on_hit("Projectile", &mut first, 0.0), Some(10.0));
        assert!(target.is_dead());
        assert_eq!(target.on_hit("Projectile", &mut second, 0.0), None);
    }

    #[test]
    fn test_popup_text_rounds_up() {
        assert_eq!(popup_text(1.23), "13");
        assert_eq!(popup_text(2.0), "20");
    }
}
