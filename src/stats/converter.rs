//! Applying modifier lists to stats

use super::modifier::Modifier;
use super::stat::FloatStat;

/// Append every modifier whose name matches the stat, then recalculate
pub fn add_list_to_stat(stat: &mut FloatStat, modifiers: &[Modifier]) {
    for modifier in modifiers {
        if modifier.name() == stat.name() {
            stat.push_modifier(*modifier);
        }
    }

    stat.recalculate();
}

/// Apply an aggregate modifier list to a set of stats.
///
/// With `clear_first` every stat drops its old modifiers before the new ones
/// are added, so repeated calls with the same list always yield the same
/// result. This is the single entry point used whenever a component graph
/// changes.
pub fn add_modifiers_to_stats(modifiers: &[Modifier], clear_first: bool, stats: &mut [FloatStat]) {
    if clear_first {
        for stat in stats.iter_mut() {
            stat.clear_modifiers();
        }
    }

    for stat in stats.iter_mut() {
        add_list_to_stat(stat, modifiers);
    }
}
