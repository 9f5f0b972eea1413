//! Float stats with a current and maximum value

use serde::{Deserialize, Serialize};

use super::calculation::{simple_method, CalculationMethod};
use super::modifier::{Modifier, ModifierName};

/// A change to a stat's current value, as seen by observers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatChange {
    pub name: ModifierName,
    pub current: f32,
    pub maximum: f32,
    /// Old value minus new value (positive when the stat dropped)
    pub difference: f32,
}

fn default_method() -> CalculationMethod {
    simple_method
}

/// A stat with a current value bounded by a derived maximum.
///
/// Changes are queued rather than dispatched through callbacks. The owner
/// drains them with [`FloatStat::drain_changes`] once it is done mutating, so
/// a reaction (death handling, another stat changing) never runs while this
/// stat is still borrowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatStat {
    name: ModifierName,
    current: f32,
    current_maximum: f32,
    base_amount: f32,
    #[serde(default)]
    modifiers: Vec<Modifier>,
    #[serde(skip, default = "default_method")]
    method: CalculationMethod,
    #[serde(skip)]
    changes: Vec<StatChange>,
}

impl FloatStat {
    /// Create a stat and compute its initial maximum from `base_amount`
    pub fn new(name: ModifierName, base_amount: f32) -> Self {
        let mut stat = Self {
            name,
            current: 0.0,
            current_maximum: 0.0,
            base_amount,
            modifiers: Vec::new(),
            method: simple_method,
            changes: Vec::new(),
        };
        stat.current_maximum = (stat.method)(base_amount, &stat.modifiers);
        stat.current = stat.current_maximum;
        stat
    }

    /// Swap the calculation method; takes effect on the next recalculation
    pub fn with_method(mut self, method: CalculationMethod) -> Self {
        self.method = method;
        self
    }

    pub fn name(&self) -> ModifierName {
        self.name
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn current_maximum(&self) -> f32 {
        self.current_maximum
    }

    pub fn base_amount(&self) -> f32 {
        self.base_amount
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Set the current value, clamped into `[0, current_maximum]`.
    /// Queues a change carrying the signed difference (old - requested).
    pub fn set_current(&mut self, value: f32) {
        let difference = self.current - value;
        self.current = value.clamp(0.0, self.current_maximum.max(0.0));
        self.changes.push(StatChange {
            name: self.name,
            current: self.current,
            maximum: self.current_maximum,
            difference,
        });
    }

    /// Overwrite the maximum directly and refill the current value.
    /// Used when a weapon hands its damage down to a projectile.
    pub fn set_current_maximum(&mut self, value: f32) {
        self.current_maximum = value;
        self.current = value;
    }

    /// Recompute the maximum from the base amount and modifiers.
    ///
    /// The current value is reset to the new maximum; any deficit is lost.
    pub fn recalculate(&mut self) {
        let old = self.current;
        self.current_maximum = (self.method)(self.base_amount, &self.modifiers);
        self.current = self.current_maximum;
        self.changes.push(StatChange {
            name: self.name,
            current: self.current,
            maximum: self.current_maximum,
            difference: old - self.current,
        });
    }

    /// Take every queued change, oldest first
    pub fn drain_changes(&mut self) -> Vec<StatChange> {
        std::mem::take(&mut self.changes)
    }

    pub(super) fn clear_modifiers(&mut self) {
        self.modifiers.clear();
    }

    pub(super) fn push_modifier(&mut self, modifier: Modifier) {
        self.modifiers.push(modifier);
    }
}

/// Find a stat by name
pub fn find_stat(stats: &[FloatStat], name: ModifierName) -> Option<&FloatStat> {
    stats.iter().find(|stat| stat.name == name)
}

/// Find a stat by name, mutably
pub fn find_stat_mut(stats: &mut [FloatStat], name: ModifierName) -> Option<&mut FloatStat> {
    stats.iter_mut().find(|stat| stat.name == name)
}
