//! Modifier definitions

use serde::{Deserialize, Serialize};

/// Every stat a modifier can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierName {
    Damage,
    FireRate,
    Accuracy,
    Velocity,
    MagazineSize,
    StrikeEfficiency,
    StoneEfficiency,
    WoodEfficiency,
    Health,
}

/// How a modifier combines with the others on the same stat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKind {
    /// Flat amount added to the starting base
    Base,
    /// Percentage, summed with all other increases
    Increased,
    /// Percentage, multiplied with all other "more" modifiers
    More,
}

/// A named, typed adjustment to a stat. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    name: ModifierName,
    kind: ModifierKind,
    amount: f32,
}

impl Modifier {
    pub fn new(name: ModifierName, kind: ModifierKind, amount: f32) -> Self {
        Self { name, kind, amount }
    }

    pub fn base(name: ModifierName, amount: f32) -> Self {
        Self::new(name, ModifierKind::Base, amount)
    }

    pub fn increased(name: ModifierName, amount: f32) -> Self {
        Self::new(name, ModifierKind::Increased, amount)
    }

    pub fn more(name: ModifierName, amount: f32) -> Self {
        Self::new(name, ModifierKind::More, amount)
    }

    pub fn name(&self) -> ModifierName {
        self.name
    }

    pub fn kind(&self) -> ModifierKind {
        self.kind
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }
}
