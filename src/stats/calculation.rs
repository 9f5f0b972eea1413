//! Stat calculation methods

use super::modifier::{Modifier, ModifierKind};

/// Signature shared by every calculation method
pub type CalculationMethod = fn(starting_base: f32, modifiers: &[Modifier]) -> f32;

/// Floor applied to both multiplicative stages
pub const MIN_MULTIPLIER: f32 = 0.1;

/// The three-stage formula used by every stat:
///
/// `(starting_base + base_total) * increased_total * more_total`
///
/// Base amounts are summed and floored at zero. Increased percentages are
/// summed onto 1. More percentages each contribute `1 + amount / 100` and are
/// multiplied together. Both multipliers are floored at [`MIN_MULTIPLIER`].
pub fn simple_method(starting_base: f32, modifiers: &[Modifier]) -> f32 {
    let mut base_total = 0.0_f32;
    let mut increased_total = 1.0_f32;
    let mut more_total = 1.0_f32;

    for modifier in modifiers {
        match modifier.kind() {
            ModifierKind::Base => base_total += modifier.amount(),
            ModifierKind::Increased => increased_total += modifier.amount() / 100.0,
            ModifierKind::More => more_total *= 1.0 + modifier.amount() / 100.0,
        }
    }

    let base_total = base_total.clamp(0.0, f32::MAX);
    let increased_total = increased_total.clamp(MIN_MULTIPLIER, f32::MAX);
    let more_total = more_total.clamp(MIN_MULTIPLIER, f32::MAX);

    (starting_base + base_total) * increased_total * more_total
}
