//! Core type definitions used throughout the codebase
//!
//! Everything that the game engine would normally own as an object reference
//! is addressed here by a stable arena ID instead. IDs are never reused within
//! a single workshop, so a lookup with a stale ID fails rather than aliasing a
//! newer entity.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// A single modular part (barrel, stock, limb...)
    ComponentId,
    "component"
);
arena_id!(
    /// A merged aggregate of components
    ItemId,
    "item"
);
arena_id!(
    /// Passive connector half-edge
    InputId,
    "input"
);
arena_id!(
    /// Active connector half-edge
    OutputId,
    "output"
);
arena_id!(
    /// Node in the pose hierarchy
    NodeId,
    "node"
);
arena_id!(
    /// Physical body handle
    BodyId,
    "body"
);
arena_id!(
    /// A hand (grabber) that can hold components
    HandId,
    "hand"
);
arena_id!(
    /// A crafting material lying in the world
    MaterialId,
    "material"
);

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// Hands out monotonically increasing raw IDs.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_raw(&mut self) -> u32 {
        if self.next == 0 {
            self.next = 1;
        }
        let id = self.next;
        self.next += 1;
        id
    }
}
