//! Bow base
//!
//! Attaching a part to one side of a bow spawns a mirrored copy on the
//! paired input. Copies propagate breadth first through everything already
//! hanging off the attached part, so a pre-built limb chain is mirrored in
//! one go. Line drawers on each original/copy pair form the string.

use ahash::{AHashMap, AHashSet};
use glam::Vec3;
use serde::Serialize;

use super::refresh_stats;
use crate::assembly::{LineDrawer, LineTarget, TimerTask, Workshop};
use crate::combat::OffensiveEntity;
use crate::connector::ConnectorPair;
use crate::core::error::Result;
use crate::core::types::{ComponentId, InputId, NodeId};
use crate::events::{ForgeEvent, SoundCue};
use crate::scene::orientate_new_piece;
use crate::stats::{find_stat, FloatStat, ModifierName};

/// A projectile a bow can fire
#[derive(Debug, Clone, Serialize)]
pub struct Arrow {
    /// Length from nock to tip; limits how far back it can be drawn
    pub size: f32,
    pub offensive: OffensiveEntity,
}

impl Arrow {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            offensive: OffensiveEntity::projectile(0.0, ModifierName::Health),
        }
    }
}

#[derive(Debug, Clone)]
struct ArmedArrow {
    arrow: Arrow,
    /// Nock position in arrow-anchor space
    local_position: Vec3,
}

#[derive(Debug, Clone)]
pub enum ArrowRelease {
    NotArmed,
    /// Not drawn far enough; the arrow snaps back to the string
    Reset,
    Launched(Arrow),
}

#[derive(Debug, Clone)]
pub struct BowBase {
    /// Symmetric input mirror map; consumed as copies are made
    pairings: AHashMap<InputId, InputId>,
    drawer_pairings: Vec<(ComponentId, ComponentId)>,
    /// String rest point in arrow-anchor space
    middle: Vec3,
    arrow_anchor: NodeId,
    /// Size of arrows made for this bow
    arrow_size: f32,
    can_grab_arrows: bool,
    current_arrow: Option<ArmedArrow>,
}

impl BowBase {
    pub fn new(pairings: AHashMap<InputId, InputId>, arrow_anchor: NodeId, arrow_size: f32) -> Self {
        Self {
            pairings,
            drawer_pairings: Vec::new(),
            middle: Vec3::ZERO,
            arrow_anchor,
            arrow_size,
            can_grab_arrows: true,
            current_arrow: None,
        }
    }

    pub fn pairing(&self, input: InputId) -> Option<InputId> {
        self.pairings.get(&input).copied()
    }

    pub fn drawer_pairings(&self) -> &[(ComponentId, ComponentId)] {
        &self.drawer_pairings
    }

    pub fn middle(&self) -> Vec3 {
        self.middle
    }

    pub fn arrow_anchor(&self) -> NodeId {
        self.arrow_anchor
    }

    /// A fresh arrow sized for this bow
    pub fn make_arrow(&self) -> Arrow {
        Arrow::new(self.arrow_size)
    }

    pub fn can_grab_arrows(&self) -> bool {
        self.can_grab_arrows
    }

    pub fn is_armed(&self) -> bool {
        self.current_arrow.is_some()
    }

    /// Nock position of the armed arrow in arrow-anchor space
    pub fn arrow_position(&self) -> Option<Vec3> {
        self.current_arrow.as_ref().map(|armed| armed.local_position)
    }

    pub(crate) fn rearm(&mut self) {
        self.can_grab_arrows = true;
    }

    pub(crate) fn on_component_connection(
        &mut self,
        owner: ComponentId,
        stats: &mut [FloatStat],
        workshop: &mut Workshop,
        pair: ConnectorPair,
    ) -> Result<()> {
        let mut visited = AHashSet::new();
        let mut layer = vec![pair];

        while !layer.is_empty() {
            let mut next = Vec::new();
            for pair in layer {
                if !visited.insert(pair.input) {
                    continue;
                }
                if !self.make_copy(owner, stats, workshop, pair)? {
                    continue;
                }

                let source = workshop.connectors.output(pair.output)?.component;
                for input in workshop.component(source)?.inputs.clone() {
                    if let Some(output) = workshop.connectors.input(input)?.connected_to() {
                        next.push(ConnectorPair::new(input, output));
                    }
                }
            }
            layer = next;
        }
        Ok(())
    }

    /// Mirror the part behind `pair.output` onto the input paired with
    /// `pair.input`. Returns false when that input has no mirror.
    fn make_copy(
        &mut self,
        owner: ComponentId,
        stats: &mut [FloatStat],
        workshop: &mut Workshop,
        pair: ConnectorPair,
    ) -> Result<bool> {
        let Some(mirror) = self.pairings.get(&pair.input).copied() else {
            tracing::warn!(bow = %owner, input = %pair.input, "No mirrored input; part not duplicated");
            return Ok(false);
        };
        let Some(item) = workshop.component(owner)?.item else {
            return Ok(false);
        };

        let source = workshop.connectors.output(pair.output)?.component;
        let template = workshop.component(source)?.template.clone();
        let mirror_node = workshop.connectors.input(mirror)?.node;
        let spawn_pose = workshop.scene.world_pose(mirror_node)?;

        let copy = workshop.spawn_member(&template, spawn_pose, item)?;
        let (copy_node, copy_output) = {
            let component = workshop.component(copy)?;
            (component.node, component.outputs.first().copied())
        };
        let Some(copy_output) = copy_output else {
            tracing::warn!(bow = %owner, template = %template, "Duplicated part has no output");
            return Ok(false);
        };
        let copy_output_node = workshop.connectors.output(copy_output)?.node;
        orientate_new_piece(&mut workshop.scene, copy_output_node, copy_node, mirror_node)?;

        self.pairings.remove(&pair.input);
        workshop.disable_component(copy)?;
        workshop.connectors.link(mirror, copy_output)?;
        workshop.component_mut(copy)?.can_be_grabbed = false;
        workshop.item_mut(item)?.components.push(copy);

        // Inputs mirror in reverse order
        let source_inputs = workshop.component(source)?.inputs.clone();
        let copy_inputs = workshop.component(copy)?.inputs.clone();
        for (i, input) in source_inputs.iter().enumerate() {
            let mirrored = copy_inputs
                .len()
                .checked_sub(i + 1)
                .and_then(|j| copy_inputs.get(j));
            if let Some(mirrored) = mirrored {
                self.pairings.insert(*input, *mirrored);
            }
        }

        let source_drawer = workshop.component(source)?.capabilities.line_drawer;
        let copy_drawer = workshop.component(copy)?.capabilities.line_drawer;
        if let (Some(source_drawer), Some(copy_drawer)) = (source_drawer, copy_drawer) {
            workshop.component_mut(source)?.capabilities.line_drawer = Some(LineDrawer {
                start: source_drawer.start,
                target: Some(LineTarget::Node(copy_drawer.start)),
            });
            workshop.component_mut(copy)?.capabilities.line_drawer = Some(LineDrawer {
                start: copy_drawer.start,
                target: Some(LineTarget::Node(source_drawer.start)),
            });
            self.drawer_pairings.push((source, copy));
            self.recompute_middle(workshop)?;
        }

        workshop.events.push(ForgeEvent::ComponentDuplicated { original: source, copy });
        refresh_stats(owner, stats, workshop)?;

        tracing::debug!(bow = %owner, original = %source, %copy, "Bow part mirrored");
        Ok(true)
    }

    /// Average of every string midpoint, in arrow-anchor space
    fn recompute_middle(&mut self, workshop: &Workshop) -> Result<()> {
        if self.drawer_pairings.is_empty() {
            return Ok(());
        }

        let mut sum = Vec3::ZERO;
        for (first, second) in &self.drawer_pairings {
            sum += (drawer_start(workshop, *first)? + drawer_start(workshop, *second)?) * 0.5;
        }
        let average = sum / self.drawer_pairings.len() as f32;

        let anchor = workshop.scene.world_pose(self.arrow_anchor)?;
        self.middle = anchor.inverse_transform_point(average);
        Ok(())
    }

    /// Nock an arrow on the string. Refused while an arrow is armed or the
    /// bow is cooling down.
    pub(crate) fn arm_arrow(&mut self, owner: ComponentId, workshop: &mut Workshop, arrow: Arrow) -> Result<bool> {
        if self.current_arrow.is_some() || !self.can_grab_arrows {
            return Ok(false);
        }

        self.retarget_drawers(workshop, |_, _| Some(LineTarget::Arrow(owner)))?;
        self.current_arrow = Some(ArmedArrow {
            arrow,
            local_position: self.middle,
        });
        self.can_grab_arrows = false;
        Ok(true)
    }

    /// Pull the armed arrow to `z` along the anchor's forward axis, bounded
    /// by the arrow's length and the string rest point
    pub(crate) fn draw_arrow(&mut self, z: f32) {
        let middle_z = self.middle.z;
        if let Some(armed) = self.current_arrow.as_mut() {
            let z = z.max(-armed.arrow.size).min(middle_z);
            armed.local_position = Vec3::new(0.0, 0.0, z);
        }
    }

    pub(crate) fn release_arrow(
        &mut self,
        owner: ComponentId,
        stats: &[FloatStat],
        workshop: &mut Workshop,
    ) -> Result<ArrowRelease> {
        let Some(armed) = self.current_arrow.as_mut() else {
            return Ok(ArrowRelease::NotArmed);
        };

        let distance = armed.local_position.length();
        if distance < self.middle.length() + workshop.config().minimum_shoot_distance {
            armed.local_position = self.middle;
            return Ok(ArrowRelease::Reset);
        }

        let Some(ArmedArrow {
            mut arrow,
            local_position,
        }) = self.current_arrow.take()
        else {
            return Ok(ArrowRelease::NotArmed);
        };

        self.retarget_drawers(workshop, |_, partner| Some(LineTarget::Node(partner)))?;

        let damage = find_stat(stats, ModifierName::Damage).map_or(0.0, FloatStat::current);
        let velocity = find_stat(stats, ModifierName::Velocity).map_or(0.0, FloatStat::current);
        if let Some(stat) = arrow.offensive.stat_mut(ModifierName::Damage) {
            stat.set_current_maximum(damage);
        }

        let anchor = workshop.scene.world_pose(self.arrow_anchor)?;
        let direction = anchor.forward();
        let position = anchor.transform_point(local_position);
        workshop.events.push(ForgeEvent::ArrowLaunched {
            bow: owner,
            position,
            direction,
            force: direction * distance * velocity,
            damage,
        });
        workshop.events.push(ForgeEvent::Sound {
            cue: SoundCue::BowRelease,
            at: position,
        });
        let cooldown = workshop.config().arrow_cooldown;
        workshop.timers.schedule(cooldown, TimerTask::BowRearm(owner));

        tracing::debug!(bow = %owner, distance, damage, "Arrow released");
        Ok(ArrowRelease::Launched(arrow))
    }

    /// Point every string half somewhere; `target(start, partner_start)`
    fn retarget_drawers(
        &self,
        workshop: &mut Workshop,
        target: impl Fn(NodeId, NodeId) -> Option<LineTarget>,
    ) -> Result<()> {
        for (first, second) in &self.drawer_pairings {
            let (Some(a), Some(b)) = (
                workshop.component(*first)?.capabilities.line_drawer,
                workshop.component(*second)?.capabilities.line_drawer,
            ) else {
                continue;
            };
            workshop.component_mut(*first)?.capabilities.line_drawer = Some(LineDrawer {
                start: a.start,
                target: target(a.start, b.start),
            });
            workshop.component_mut(*second)?.capabilities.line_drawer = Some(LineDrawer {
                start: b.start,
                target: target(b.start, a.start),
            });
        }
        Ok(())
    }
}

fn drawer_start(workshop: &Workshop, component: ComponentId) -> Result<Vec3> {
    match workshop.component(component)?.capabilities.line_drawer {
        Some(drawer) => Ok(workshop.scene.world_pose(drawer.start)?.position),
        None => Ok(workshop.world_pose(component)?.position),
    }
}

impl Workshop {
    /// Nock `arrow` on a bow base. False when refused or `bow` is no bow.
    pub fn arm_arrow(&mut self, bow: ComponentId, arrow: Arrow) -> Result<bool> {
        if !self.base(bow).is_some_and(|base| base.bow().is_some()) {
            return Ok(false);
        }
        self.with_base(bow, |base, workshop| base.arm_arrow(workshop, arrow))
    }

    pub fn draw_arrow(&mut self, bow: ComponentId, z: f32) -> Result<()> {
        if !self.base(bow).is_some_and(|base| base.bow().is_some()) {
            return Ok(());
        }
        self.with_base(bow, |base, _| {
            base.draw_arrow(z);
            Ok(())
        })
    }

    pub fn release_arrow(&mut self, bow: ComponentId) -> Result<ArrowRelease> {
        if !self.base(bow).is_some_and(|base| base.bow().is_some()) {
            return Ok(ArrowRelease::NotArmed);
        }
        self.with_base(bow, |base, workshop| base.release_arrow(workshop))
    }
}
