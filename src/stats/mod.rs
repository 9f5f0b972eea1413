//! Modifier & stat engine
//!
//! Stats derive their maximum from a base amount plus a layered list of
//! modifiers. Modifier lists are only ever rebuilt through
//! [`add_modifiers_to_stats`] so every maximum is a full recomputation.

pub mod calculation;
pub mod converter;
pub mod modifier;
pub mod stat;

pub use calculation::{simple_method, CalculationMethod};
pub use converter::{add_list_to_stat, add_modifiers_to_stats};
pub use modifier::{Modifier, ModifierKind, ModifierName};
pub use stat::{find_stat, find_stat_mut, FloatStat, StatChange};
