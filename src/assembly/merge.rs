//! Connection validity and the two-step merge protocol
//!
//! 1. `try_connect` validates the union of both clusters, aligns the output
//!    side onto the input, releases every member, queues their bodies for
//!    destruction and queues a [`PendingMerge`]. The connectors are linked
//!    immediately.
//! 2. At the end of the frame, after the destroy queue has been flushed,
//!    `finish_merge` builds the new item, notifies the bases and regrabs.

use ahash::{AHashMap, AHashSet};
use glam::Vec3;

use super::item::{BodyOwner, Item};
use super::workshop::{Destroy, Workshop};
use crate::connector::ConnectorPair;
use crate::core::error::Result;
use crate::core::types::{ComponentId, HandId, InputId, ItemId, NodeId, OutputId};
use crate::events::ForgeEvent;
use crate::scene::{orientate_new_piece, Pose};

/// Result of offering an output to an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected,
    /// The merged item would hold two unique parts of one kind
    Rejected,
    /// The output already has a partner
    AlreadyConnected,
    /// The input already has a partner
    Occupied,
}

impl ConnectOutcome {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectOutcome::Connected)
    }
}

/// Hand that held the input side when the connection happened
#[derive(Debug, Clone, Copy)]
pub(crate) struct Regrab {
    hand: HandId,
    component: ComponentId,
    grab_point: Vec3,
}

/// Item rebuild waiting for the end of the frame
#[derive(Debug, Clone, Copy)]
pub(crate) struct PendingMerge {
    pair: ConnectorPair,
    regrab: Option<Regrab>,
}

impl Workshop {
    /// Components that will end up in one item with `id`, counting merges
    /// that are queued but not yet finished
    pub fn cluster(&self, id: ComponentId) -> Result<Vec<ComponentId>> {
        let mut members = self.item_members(id)?;

        let mut groups = Vec::with_capacity(self.pending_merges.len());
        for pending in &self.pending_merges {
            let input = self.connectors.input(pending.pair.input)?.component;
            let output = self.connectors.output(pending.pair.output)?.component;
            let mut group = self.item_members(input)?;
            group.extend(self.item_members(output)?);
            groups.push(group);
        }

        let mut merged = vec![false; groups.len()];
        loop {
            let mut changed = false;
            for (group, done) in groups.iter().zip(merged.iter_mut()) {
                if *done || !group.iter().any(|c| members.contains(c)) {
                    continue;
                }
                for component in group {
                    if !members.contains(component) {
                        members.push(*component);
                    }
                }
                *done = true;
                changed = true;
            }
            if !changed {
                break;
            }
        }

        Ok(members)
    }

    /// True when joining the two clusters keeps every unique kind single
    pub fn is_valid_connection(&self, first: ComponentId, second: ComponentId) -> Result<bool> {
        let mut all = self.cluster(first)?;
        for component in self.cluster(second)? {
            if !all.contains(&component) {
                all.push(component);
            }
        }

        let mut counts: AHashMap<&str, usize> = AHashMap::new();
        for id in &all {
            let component = self.component(*id)?;
            if component.unique {
                *counts.entry(component.kind.as_str()).or_insert(0) += 1;
            }
        }

        let mut duplicates: Vec<(&str, usize)> = counts.into_iter().filter(|(_, n)| *n > 1).collect();
        if duplicates.is_empty() {
            return Ok(true);
        }
        duplicates.sort();
        for (kind, count) in duplicates {
            tracing::debug!(kind, count, "Connection rejected: unique kind repeated");
        }
        Ok(false)
    }

    /// Offer `output` to `input`.
    ///
    /// A rejected connection changes nothing and emits no event.
    pub fn try_connect(&mut self, output: OutputId, input: InputId) -> Result<ConnectOutcome> {
        let source = self.connectors.output(output)?;
        let target = self.connectors.input(input)?;
        if source.connected() {
            return Ok(ConnectOutcome::AlreadyConnected);
        }
        if target.connected() {
            return Ok(ConnectOutcome::Occupied);
        }

        let (source_component, source_node) = (source.component, source.node);
        let (target_component, target_node) = (target.component, target.node);

        if !self.is_valid_connection(source_component, target_component)? {
            return Ok(ConnectOutcome::Rejected);
        }

        for component in [source_component, target_component] {
            if let Some(body) = self.attached_body(component)? {
                if let Some(body) = self.bodies.get_mut(&body) {
                    body.kinematic = true;
                }
            }
        }

        let moving = self.cluster(source_component)?;
        if !moving.contains(&target_component) {
            self.orientate_cluster(&moving, source_component, source_node, target_node)?;
        }

        self.on_connector_connection(output, input)?;
        self.connectors.link(input, output)?;

        tracing::debug!(%output, %input, "Connectors linked");
        Ok(ConnectOutcome::Connected)
    }

    /// Align `source_node` onto `target_node` by moving the source's root.
    /// Every other root of the moving cluster (parts whose merge is still
    /// queued) follows rigidly.
    fn orientate_cluster(
        &mut self,
        moving: &[ComponentId],
        source: ComponentId,
        source_node: NodeId,
        target_node: NodeId,
    ) -> Result<()> {
        let parent = self.root_node(source)?;
        let mut followers = Vec::new();
        for member in moving {
            let root = self.root_node(*member)?;
            if root != parent && !followers.contains(&root) {
                followers.push(root);
            }
        }

        let before = self.scene.world_pose(parent)?;
        orientate_new_piece(&mut self.scene, source_node, parent, target_node)?;
        let delta = self.scene.world_pose(parent)?.mul_pose(&before.inverse());

        for root in followers {
            let pose = self.scene.world_pose(root)?;
            self.scene.set_world_pose(root, delta.mul_pose(&pose))?;
        }
        Ok(())
    }

    /// Topmost scene node carrying a component: its item's node once merged
    fn root_node(&self, id: ComponentId) -> Result<NodeId> {
        match self.component(id)?.item {
            Some(item) => Ok(self.item(item)?.node),
            None => Ok(self.component(id)?.node),
        }
    }

    /// Input side reaction to a new connection: release, drop bodies and
    /// queue the item rebuild
    fn on_connector_connection(&mut self, output: OutputId, input: InputId) -> Result<()> {
        let input_component = self.connectors.input(input)?.component;
        let output_component = self.connectors.output(output)?.component;

        let regrab = self.currently_grabbed(input_component)?.and_then(|held| {
            let component = self.components.get(&held)?;
            Some(Regrab {
                hand: component.grabbed_by?,
                component: held,
                grab_point: component.grab_point,
            })
        });

        let input_item = self.component(input_component)?.item;
        if input_item.is_some() && input_item == self.component(output_component)?.item {
            return Ok(());
        }

        let mut members = self.item_members(input_component)?;
        members.extend(self.item_members(output_component)?);

        for member in members {
            self.force_release(member)?;
            if let Some(body) = self.attached_body(member)? {
                self.destroy_queue.push(Destroy::Body(body));
            }
        }

        self.pending_merges.push(PendingMerge {
            pair: ConnectorPair::new(input, output),
            regrab,
        });
        Ok(())
    }

    pub(crate) fn run_pending_merges(&mut self) -> Result<()> {
        for pending in std::mem::take(&mut self.pending_merges) {
            self.finish_merge(pending)?;
        }
        Ok(())
    }

    fn finish_merge(&mut self, pending: PendingMerge) -> Result<()> {
        let pair = pending.pair;
        let input_component = self.connectors.input(pair.input)?.component;
        let output_component = self.connectors.output(pair.output)?.component;

        let input_item = self.component(input_component)?.item;
        let output_item = self.component(output_component)?.item;
        if input_item.is_some() && input_item == output_item {
            tracing::debug!(pair = ?pair, "Merge skipped: already one item");
            if let Some(regrab) = pending.regrab {
                self.force_grab(regrab.hand, regrab.component, regrab.grab_point)?;
            }
            return Ok(());
        }

        let input_side = self.item_members(input_component)?;
        let output_side = self.item_members(output_component)?;
        let mut members = Vec::with_capacity(input_side.len() + output_side.len());
        let mut seen = AHashSet::new();
        for member in input_side.iter().chain(output_side.iter()) {
            if seen.insert(*member) {
                members.push(*member);
            }
        }

        let id = ItemId(self.item_ids.next_raw());
        let node = self.scene.create_node("item", Pose::IDENTITY, None)?;

        for old in [input_item, output_item].into_iter().flatten() {
            self.remove_item(old)?;
        }

        let mut base = None;
        for member in &members {
            if self.component(*member)?.is_base() {
                if let Some(previous) = base {
                    tracing::warn!(%previous, replacement = %member, "Item has several bases; the last one wins");
                }
                base = Some(*member);
            }
        }

        let pose = self.world_pose(base.unwrap_or(input_component))?;
        self.scene.set_world_pose(node, pose)?;

        for member in &members {
            let component_node = self.component(*member)?.node;
            self.scene.set_parent(component_node, Some(node))?;
            let stale_body = {
                let component = self.component_mut(*member)?;
                component.item = Some(id);
                component.body.take()
            };
            if let Some(body) = stale_body {
                self.bodies.remove(&body);
            }
        }

        let body = self.create_body(BodyOwner::Item(id));
        self.items.insert(
            id,
            Item {
                id,
                node,
                components: members.clone(),
                base,
                currently_grabbed: None,
                body: Some(body),
            },
        );

        self.item_finished(id, pair, &members, &input_side, &output_side)?;

        let (final_members, final_base) = {
            let item = self.item(id)?;
            (item.components.clone(), item.base)
        };
        tracing::info!(item = %id, members = final_members.len(), base = ?final_base, "Item finished");
        self.events.push(ForgeEvent::ItemFinished {
            item: id,
            pair,
            members: final_members,
            base: final_base,
        });

        if let Some(regrab) = pending.regrab {
            self.force_grab(regrab.hand, regrab.component, regrab.grab_point)?;
        }
        Ok(())
    }

    /// Notify every base among the members, in member order, then lock
    /// non-base members out of grabbing
    fn item_finished(
        &mut self,
        item: ItemId,
        pair: ConnectorPair,
        members: &[ComponentId],
        input_side: &[ComponentId],
        output_side: &[ComponentId],
    ) -> Result<()> {
        for member in members {
            if !self.bases.contains_key(member) {
                continue;
            }
            let new_members = if input_side.contains(member) {
                output_side
            } else {
                input_side
            };
            self.with_base(*member, |base, workshop| {
                base.on_component_connection(workshop, pair, new_members)
            })?;
        }

        let item = self.item(item)?;
        if let Some(base) = item.base {
            for member in item.components.clone() {
                if member != base {
                    self.component_mut(member)?.can_be_grabbed = false;
                }
            }
        }
        Ok(())
    }

    /// Destroy an item's node and body, keeping its members alive as roots
    fn remove_item(&mut self, id: ItemId) -> Result<()> {
        let Some(item) = self.items.remove(&id) else {
            return Ok(());
        };
        self.scene.detach_children(item.node)?;
        self.scene.remove(item.node)?;
        if let Some(body) = item.body {
            self.bodies.remove(&body);
        }
        Ok(())
    }
}
