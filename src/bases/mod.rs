//! Item base behaviors
//!
//! A base is the one component of an item that gives the whole item special
//! behavior. Every variant reacts to a finished merge by first recomputing
//! its stats from the item's modifiers, then applying its own extension.

pub mod bow;
pub mod gun;
pub mod tool;

use ahash::AHashMap;

use crate::assembly::Workshop;
use crate::connector::ConnectorPair;
use crate::core::error::{ForgeError, Result};
use crate::core::types::{ComponentId, InputId, NodeId};
use crate::data::{BaseKind, BaseSpec, StatSpec};
use crate::stats::{add_modifiers_to_stats, find_stat, FloatStat, ModifierName};

pub use bow::{Arrow, ArrowRelease, BowBase};
pub use gun::{GunBase, ReloadOutcome, ShotOutcome};
pub use tool::ToolBase;

#[derive(Debug, Clone)]
pub enum BaseBehavior {
    Generic,
    Tool(ToolBase),
    Gun(GunBase),
    Bow(BowBase),
}

#[derive(Debug, Clone)]
pub struct ItemBase {
    owner: ComponentId,
    stats: Vec<FloatStat>,
    behavior: BaseBehavior,
}

impl ItemBase {
    /// Build a base for `owner`. `inputs` are the owner's input connectors in
    /// template order; bows resolve their pairings against them.
    pub fn from_spec(
        owner: ComponentId,
        spec: &BaseSpec,
        inputs: &[InputId],
        arrow_anchor: Option<NodeId>,
    ) -> Result<Self> {
        let behavior = match spec.kind {
            BaseKind::Generic => BaseBehavior::Generic,
            BaseKind::Tool => BaseBehavior::Tool(ToolBase::default()),
            BaseKind::Gun => BaseBehavior::Gun(GunBase::new()),
            BaseKind::Bow => {
                let anchor = arrow_anchor
                    .ok_or_else(|| ForgeError::Catalog(format!("bow {} has no arrow anchor", owner)))?;

                let mut pairings = AHashMap::new();
                for [left, right] in &spec.pairings {
                    let (Some(left), Some(right)) = (inputs.get(*left), inputs.get(*right)) else {
                        return Err(ForgeError::Catalog(format!(
                            "bow {} pairs inputs {} and {} out of range",
                            owner, left, right
                        )));
                    };
                    pairings.insert(*left, *right);
                    pairings.insert(*right, *left);
                }
                BaseBehavior::Bow(BowBase::new(pairings, anchor, spec.arrow_size))
            }
        };

        Ok(Self {
            owner,
            stats: spec.stats.iter().map(StatSpec::build).collect(),
            behavior,
        })
    }

    pub fn owner(&self) -> ComponentId {
        self.owner
    }

    pub fn kind(&self) -> BaseKind {
        match self.behavior {
            BaseBehavior::Generic => BaseKind::Generic,
            BaseBehavior::Tool(_) => BaseKind::Tool,
            BaseBehavior::Gun(_) => BaseKind::Gun,
            BaseBehavior::Bow(_) => BaseKind::Bow,
        }
    }

    pub fn is_gun(&self) -> bool {
        matches!(self.behavior, BaseBehavior::Gun(_))
    }

    pub fn stats(&self) -> &[FloatStat] {
        &self.stats
    }

    /// Current value of a stat, 0 when the base does not track it
    pub fn stat(&self, name: ModifierName) -> f32 {
        find_stat(&self.stats, name).map_or(0.0, |stat| stat.current())
    }

    pub fn behavior(&self) -> &BaseBehavior {
        &self.behavior
    }

    pub fn gun(&self) -> Option<&GunBase> {
        match &self.behavior {
            BaseBehavior::Gun(gun) => Some(gun),
            _ => None,
        }
    }

    pub fn bow(&self) -> Option<&BowBase> {
        match &self.behavior {
            BaseBehavior::Bow(bow) => Some(bow),
            _ => None,
        }
    }

    pub fn tool(&self) -> Option<&ToolBase> {
        match &self.behavior {
            BaseBehavior::Tool(tool) => Some(tool),
            _ => None,
        }
    }

    /// Recompute every stat from the owner's item modifiers
    pub fn update_stats(&mut self, workshop: &Workshop) -> Result<()> {
        refresh_stats(self.owner, &mut self.stats, workshop)
    }

    /// React to a finished merge. `new_members` is the cluster that joined
    /// the base's side.
    pub fn on_component_connection(
        &mut self,
        workshop: &mut Workshop,
        pair: ConnectorPair,
        new_members: &[ComponentId],
    ) -> Result<()> {
        refresh_stats(self.owner, &mut self.stats, workshop)?;

        let Self {
            owner,
            stats,
            behavior,
        } = self;
        match behavior {
            BaseBehavior::Generic => Ok(()),
            BaseBehavior::Tool(tool) => tool.on_component_connection(stats, workshop, new_members),
            BaseBehavior::Gun(gun) => gun.on_component_connection(*owner, workshop, new_members),
            BaseBehavior::Bow(bow) => bow.on_component_connection(*owner, stats, workshop, pair),
        }
    }

    pub fn update_trigger(&mut self, workshop: &mut Workshop, pressure: f32) -> Result<()> {
        match &mut self.behavior {
            BaseBehavior::Gun(gun) => gun.update_trigger(self.owner, &self.stats, workshop, pressure),
            _ => Ok(()),
        }
    }

    pub(crate) fn shoot(&mut self, workshop: &mut Workshop) -> Result<ShotOutcome> {
        match &mut self.behavior {
            BaseBehavior::Gun(gun) => gun.shoot(self.owner, &self.stats, workshop),
            _ => Ok(ShotOutcome::NoEngine),
        }
    }

    pub(crate) fn reload(&mut self, workshop: &mut Workshop, tag: &str) -> Result<ReloadOutcome> {
        match &mut self.behavior {
            BaseBehavior::Gun(gun) => gun.reload(self.owner, &self.stats, workshop, tag),
            _ => Ok(ReloadOutcome::WrongAmmo),
        }
    }

    pub(crate) fn arm_arrow(&mut self, workshop: &mut Workshop, arrow: Arrow) -> Result<bool> {
        match &mut self.behavior {
            BaseBehavior::Bow(bow) => bow.arm_arrow(self.owner, workshop, arrow),
            _ => Ok(false),
        }
    }

    pub(crate) fn draw_arrow(&mut self, z: f32) {
        if let BaseBehavior::Bow(bow) = &mut self.behavior {
            bow.draw_arrow(z);
        }
    }

    pub(crate) fn release_arrow(&mut self, workshop: &mut Workshop) -> Result<ArrowRelease> {
        match &mut self.behavior {
            BaseBehavior::Bow(bow) => bow.release_arrow(self.owner, &self.stats, workshop),
            _ => Ok(ArrowRelease::NotArmed),
        }
    }

    /// A cooldown elapsed
    pub fn rearm(&mut self) {
        match &mut self.behavior {
            BaseBehavior::Gun(gun) => gun.rearm(),
            BaseBehavior::Bow(bow) => bow.rearm(),
            _ => {}
        }
    }
}

/// Clear and re-apply the item's modifiers to `stats`
pub(crate) fn refresh_stats(owner: ComponentId, stats: &mut [FloatStat], workshop: &Workshop) -> Result<()> {
    let modifiers = workshop.modifiers_of(owner)?;
    add_modifiers_to_stats(&modifiers, true, stats);
    // Nothing observes base stats; keep the change queues empty
    for stat in stats.iter_mut() {
        stat.drain_changes();
    }
    Ok(())
}
