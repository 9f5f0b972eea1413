//! Partforge - modular part assembly for a crafting-and-combat game

pub mod assembly;
pub mod bases;
pub mod combat;
pub mod connector;
pub mod core;
pub mod crafting;
pub mod data;
pub mod events;
pub mod fsm;
pub mod inventory;
pub mod scene;
pub mod stats;
