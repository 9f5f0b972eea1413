//! Finite state machines
//!
//! [`FsmSystem`] is a deterministic machine over boxed states sharing one
//! context type. [`enemy`] builds the enemy behavior on top of it.

pub mod enemy;
pub mod system;

pub use enemy::{Enemy, EnemyContext, EnemyState, EnemyTask, START_ATTACKING, START_CHASING};
pub use system::{FsmState, FsmSystem, StateId};
