//! Offensive entities (bullets, arrows, axe heads)

use serde::{Deserialize, Serialize};

use crate::data::OffensiveSpec;
use crate::stats::{find_stat, find_stat_mut, FloatStat, ModifierName};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffensiveEntity {
    /// Damage plus the efficiency stats for every resistance this can hit
    stats: Vec<FloatStat>,
    /// Scale damage by impact speed
    use_velocity: bool,
    min_velocity: f32,
    max_velocity: f32,
    /// Bullets and arrows hurt only once
    deal_damage_once: bool,
    has_dealt_damage: bool,
}

impl OffensiveEntity {
    pub fn new(stats: Vec<FloatStat>) -> Self {
        Self {
            stats,
            use_velocity: false,
            min_velocity: 0.0,
            max_velocity: 0.0,
            deal_damage_once: false,
            has_dealt_damage: false,
        }
    }

    pub fn from_spec(spec: &OffensiveSpec) -> Self {
        Self {
            stats: spec.stats.iter().map(|s| s.build()).collect(),
            use_velocity: spec.use_velocity,
            min_velocity: spec.min_velocity,
            max_velocity: spec.max_velocity,
            deal_damage_once: spec.deal_damage_once,
            has_dealt_damage: false,
        }
    }

    /// A projectile: hurts once, full damage regardless of speed
    pub fn projectile(damage: f32, resistance: ModifierName) -> Self {
        let mut entity = Self::new(vec![
            FloatStat::new(ModifierName::Damage, damage),
            FloatStat::new(resistance, 100.0),
        ]);
        entity.deal_damage_once = true;
        entity
    }

    pub fn with_velocity_window(mut self, min: f32, max: f32) -> Self {
        self.use_velocity = true;
        self.min_velocity = min;
        self.max_velocity = max;
        self
    }

    pub fn stat(&self, name: ModifierName) -> Option<&FloatStat> {
        find_stat(&self.stats, name)
    }

    pub fn stat_mut(&mut self, name: ModifierName) -> Option<&mut FloatStat> {
        find_stat_mut(&mut self.stats, name)
    }

    pub fn has_dealt_damage(&self) -> bool {
        self.has_dealt_damage
    }

    /// Picked up again: a thrown or shot part may hurt once more
    pub fn reset_dealt_damage(&mut self) {
        self.has_dealt_damage = false;
    }

    /// Damage against something weak to `resistance`, hit at `velocity`.
    ///
    /// Calling this counts as dealing damage for deal-once entities, even when
    /// the result is 0.
    pub fn calculate_current_damage(&mut self, resistance: ModifierName, velocity: f32) -> f32 {
        if self.deal_damage_once && self.has_dealt_damage {
            return 0.0;
        }
        if self.deal_damage_once {
            self.has_dealt_damage = true;
        }

        let damage = self.stat(ModifierName::Damage).map_or(0.0, |s| s.current());
        let damage = match self.stat(resistance) {
            Some(efficiency) => damage * (efficiency.current() / 100.0),
            None => 0.0,
        };

        if !self.use_velocity {
            return damage;
        }
        if velocity < self.min_velocity {
            return 0.0;
        }
        if self.max_velocity <= self.min_velocity {
            return damage;
        }

        let clamped = velocity.clamp(self.min_velocity, self.max_velocity);
        let fraction = ((clamped - self.min_velocity) / (self.max_velocity - self.min_velocity))
            .clamp(0.0, 1.0);
        fraction * damage
    }
}
