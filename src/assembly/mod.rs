//! Components, items and the workshop that owns them
//!
//! The [`Workshop`] is the arena for everything that takes part in assembly:
//! components, their connectors and pose nodes, items, physical bodies and
//! hands. Merging two clusters into one item happens in two steps: the
//! connection itself is immediate, the item rebuild runs at the end of the
//! tick once queued body destruction has been flushed.

pub mod component;
pub mod grab;
pub mod item;
pub mod merge;
pub mod workshop;

pub use component::{Capabilities, GunEngine, ItemComponent, LineDrawer, LineTarget, Reloader, ShootingPoint};
pub use item::{BodyOwner, Grab, Hand, Item, RigidBody};
pub use merge::ConnectOutcome;
pub use workshop::{InputFrame, TimerTask, Workshop};
