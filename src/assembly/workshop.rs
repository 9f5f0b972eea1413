//! Workshop arena and per-tick driver

use ahash::AHashMap;
use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::component::{Capabilities, GunEngine, ItemComponent, LineDrawer, Reloader, ShootingPoint};
use super::item::{BodyOwner, Hand, Item, RigidBody};
use super::merge::PendingMerge;
use crate::bases::ItemBase;
use crate::combat::OffensiveEntity;
use crate::connector::{ConnectorGraph, ConnectorProbe, LayerMask, ProbeRay, ProbeTarget};
use crate::core::config::ForgeConfig;
use crate::core::error::{ForgeError, Result};
use crate::core::scheduler::Scheduler;
use crate::core::types::{BodyId, ComponentId, HandId, IdAllocator, ItemId, NodeId, Tick};
use crate::data::{BaseKind, ComponentCatalog, ComponentTemplate};
use crate::events::ForgeEvent;
use crate::scene::{Pose, SceneGraph};
use crate::stats::Modifier;

/// Deferred work owned by the workshop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    /// Automatic gun may fire again
    GunRearm(ComponentId),
    /// Bow may accept a new arrow
    BowRearm(ComponentId),
}

/// Controller state read during one tick
#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    triggers: AHashMap<HandId, f32>,
}

impl InputFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trigger(mut self, hand: HandId, pressure: f32) -> Self {
        self.triggers.insert(hand, pressure);
        self
    }

    /// Trigger pressure of a hand in `[0, 1]`; 0 when not reported
    pub fn trigger(&self, hand: HandId) -> f32 {
        self.triggers.get(&hand).copied().unwrap_or(0.0).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Destroy {
    Body(BodyId),
}

/// Arena of everything taking part in assembly
pub struct Workshop {
    config: ForgeConfig,
    catalog: ComponentCatalog,
    pub(crate) scene: SceneGraph,
    pub(crate) connectors: ConnectorGraph,
    pub(crate) components: AHashMap<ComponentId, ItemComponent>,
    pub(crate) items: AHashMap<ItemId, Item>,
    pub(crate) bodies: AHashMap<BodyId, RigidBody>,
    pub(crate) hands: AHashMap<HandId, Hand>,
    pub(crate) bases: AHashMap<ComponentId, ItemBase>,
    component_ids: IdAllocator,
    pub(crate) item_ids: IdAllocator,
    body_ids: IdAllocator,
    hand_ids: IdAllocator,
    pub(crate) destroy_queue: Vec<Destroy>,
    pub(crate) pending_merges: Vec<PendingMerge>,
    pub(crate) timers: Scheduler<TimerTask>,
    pub(crate) events: Vec<ForgeEvent>,
    pub(crate) rng: ChaCha8Rng,
    tick: Tick,
}

impl Workshop {
    pub fn new(config: ForgeConfig, catalog: ComponentCatalog) -> Result<Self> {
        Self::with_seed(config, catalog, 0)
    }

    pub fn with_seed(config: ForgeConfig, catalog: ComponentCatalog, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            catalog,
            scene: SceneGraph::new(),
            connectors: ConnectorGraph::new(),
            components: AHashMap::new(),
            items: AHashMap::new(),
            bodies: AHashMap::new(),
            hands: AHashMap::new(),
            bases: AHashMap::new(),
            component_ids: IdAllocator::new(),
            item_ids: IdAllocator::new(),
            body_ids: IdAllocator::new(),
            hand_ids: IdAllocator::new(),
            destroy_queue: Vec::new(),
            pending_merges: Vec::new(),
            timers: Scheduler::new(),
            events: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            tick: 0,
        })
    }

    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ComponentCatalog {
        &self.catalog
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn connectors(&self) -> &ConnectorGraph {
        &self.connectors
    }

    pub fn component(&self, id: ComponentId) -> Result<&ItemComponent> {
        self.components.get(&id).ok_or(ForgeError::ComponentNotFound(id))
    }

    pub(crate) fn component_mut(&mut self, id: ComponentId) -> Result<&mut ItemComponent> {
        self.components
            .get_mut(&id)
            .ok_or(ForgeError::ComponentNotFound(id))
    }

    pub fn item(&self, id: ItemId) -> Result<&Item> {
        self.items.get(&id).ok_or(ForgeError::ItemNotFound(id))
    }

    pub(crate) fn item_mut(&mut self, id: ItemId) -> Result<&mut Item> {
        self.items.get_mut(&id).ok_or(ForgeError::ItemNotFound(id))
    }

    /// Items ordered by id
    pub fn items(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self.items.values().collect();
        items.sort_by_key(|item| item.id);
        items
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn base(&self, id: ComponentId) -> Option<&ItemBase> {
        self.bases.get(&id)
    }

    pub fn body(&self, id: BodyId) -> Result<&RigidBody> {
        self.bodies.get(&id).ok_or(ForgeError::BodyNotFound(id))
    }

    /// The body moving a component: its item's body once merged
    pub fn attached_body(&self, id: ComponentId) -> Result<Option<BodyId>> {
        let component = self.component(id)?;
        match component.item {
            Some(item) => Ok(self.item(item)?.body),
            None => Ok(component.body),
        }
    }

    pub fn world_pose(&self, id: ComponentId) -> Result<Pose> {
        self.scene.world_pose(self.component(id)?.node)
    }

    pub fn add_hand(&mut self) -> HandId {
        let id = HandId(self.hand_ids.next_raw());
        self.hands.insert(id, Hand::default());
        id
    }

    pub fn hand(&self, id: HandId) -> Option<&Hand> {
        self.hands.get(&id)
    }

    /// Add or replace a template used for spawning
    pub fn register_template(&mut self, template: ComponentTemplate) {
        self.catalog.add(template);
    }

    /// Spawn a standalone component with its own body
    pub fn spawn_component(&mut self, template: &str, pose: Pose) -> Result<ComponentId> {
        let id = self.build_component(template, pose, None)?;
        let body = self.create_body(BodyOwner::Component(id));
        self.component_mut(id)?.body = Some(body);
        Ok(id)
    }

    /// Remove a loose component from the workshop entirely. Parts of an item,
    /// or with a merge still queued, stay and `false` is returned.
    pub fn despawn_component(&mut self, id: ComponentId) -> Result<bool> {
        if self.component(id)?.item.is_some() {
            return Ok(false);
        }
        if !self.connectors.remove_component(id) {
            return Ok(false);
        }

        self.force_release(id)?;
        self.bases.remove(&id);
        if let Some(component) = self.components.remove(&id) {
            if let Some(body) = component.body {
                self.bodies.remove(&body);
            }
            self.scene.remove(component.node)?;
        }

        tracing::debug!(component = %id, "Despawned component");
        Ok(true)
    }

    /// Spawn a body-less component directly under `item`
    pub(crate) fn spawn_member(&mut self, template: &str, pose: Pose, item: ItemId) -> Result<ComponentId> {
        let item_node = self.item(item)?.node;
        let id = self.build_component(template, pose, Some(item_node))?;
        self.component_mut(id)?.item = Some(item);
        Ok(id)
    }

    fn build_component(&mut self, template: &str, pose: Pose, parent: Option<NodeId>) -> Result<ComponentId> {
        let template = self.catalog.require(template)?.clone();
        let id = ComponentId(self.component_ids.next_raw());

        let node = match parent {
            Some(parent) => {
                let local = self.scene.world_pose(parent)?.relative(&pose);
                self.scene.create_node(template.name.clone(), local, Some(parent))?
            }
            None => self.scene.create_node(template.name.clone(), pose, None)?,
        };

        let mut inputs = Vec::with_capacity(template.inputs.len());
        for spec in &template.inputs {
            let connector = self.scene.create_node("input", spec.to_pose(), Some(node))?;
            inputs.push(self.connectors.add_input(id, connector, 0));
        }

        let mut outputs = Vec::with_capacity(template.outputs.len());
        for spec in &template.outputs {
            let connector = self.scene.create_node("output", spec.to_pose(), Some(node))?;
            outputs.push(self.connectors.add_output(
                id,
                connector,
                self.config.connector_probe_distance,
                LayerMask::ALL,
            ));
        }

        let mut capabilities = Capabilities {
            base: template.base.as_ref().map(|b| b.kind),
            engine: template.engine.map(|e| GunEngine {
                automatic: e.automatic,
            }),
            reloader: template.reloader.then(Reloader::default),
            offensive: template.offensive.as_ref().map(OffensiveEntity::from_spec),
            ..Capabilities::default()
        };
        if let Some(spec) = &template.shooting_point {
            let muzzle = self.scene.create_node("muzzle", spec.to_pose(), Some(node))?;
            capabilities.shooting_point = Some(ShootingPoint { muzzle });
        }
        if let Some(spec) = &template.line_drawer {
            let start = self.scene.create_node("line_start", spec.to_pose(), Some(node))?;
            capabilities.line_drawer = Some(LineDrawer {
                start,
                target: None,
            });
        }

        self.components.insert(
            id,
            ItemComponent {
                id,
                template: template.name.clone(),
                display_name: template.display_name.clone(),
                unique: template.unique,
                kind: template.kind.clone(),
                node,
                inputs: inputs.clone(),
                outputs,
                item: None,
                body: None,
                modifiers: template.modifiers.clone(),
                capabilities,
                grabbed_by: None,
                grab_point: Vec3::ZERO,
                can_be_grabbed: true,
                enabled: true,
            },
        );

        if let Some(spec) = &template.base {
            let anchor = match (&spec.arrow_anchor, spec.kind) {
                (Some(anchor), _) => Some(self.scene.create_node("arrow_anchor", anchor.to_pose(), Some(node))?),
                (None, BaseKind::Bow) => Some(self.scene.create_node("arrow_anchor", Pose::IDENTITY, Some(node))?),
                (None, _) => None,
            };
            let mut base = ItemBase::from_spec(id, spec, &inputs, anchor)?;
            base.update_stats(self)?;
            self.bases.insert(id, base);
        }

        tracing::debug!(component = %id, template = %template.name, "Spawned component");
        Ok(id)
    }

    pub(crate) fn create_body(&mut self, owner: BodyOwner) -> BodyId {
        let id = BodyId(self.body_ids.next_raw());
        self.bodies.insert(id, RigidBody::dynamic(owner));
        id
    }

    /// Turn off every connector on a component and hide their nodes from
    /// probing
    pub(crate) fn disable_component(&mut self, id: ComponentId) -> Result<()> {
        let component = self.component_mut(id)?;
        component.enabled = false;
        let inputs = component.inputs.clone();
        let outputs = component.outputs.clone();
        for input in inputs {
            self.connectors.set_input_enabled(input, false)?;
            let node = self.connectors.input(input)?.node;
            self.scene.set_active(node, false)?;
        }
        for output in outputs {
            self.connectors.set_output_enabled(output, false)?;
            let node = self.connectors.output(output)?.node;
            self.scene.set_active(node, false)?;
        }
        Ok(())
    }

    /// Members of the component's item, or just the component itself
    pub fn item_members(&self, id: ComponentId) -> Result<Vec<ComponentId>> {
        match self.component(id)?.item {
            Some(item) => Ok(self.item(item)?.components.clone()),
            None => Ok(vec![id]),
        }
    }

    /// Every modifier on the component's item (or on the component alone)
    pub fn modifiers_of(&self, id: ComponentId) -> Result<Vec<Modifier>> {
        let mut modifiers = Vec::new();
        for member in self.item_members(id)? {
            modifiers.extend_from_slice(&self.component(member)?.modifiers);
        }
        Ok(modifiers)
    }

    /// Run `f` on a base taken out of the arena, so it can mutate the rest of
    /// the workshop. The base is put back even when `f` fails.
    pub(crate) fn with_base<R>(
        &mut self,
        id: ComponentId,
        f: impl FnOnce(&mut ItemBase, &mut Workshop) -> Result<R>,
    ) -> Result<R> {
        let mut base = self
            .bases
            .remove(&id)
            .ok_or(ForgeError::ComponentNotFound(id))?;
        let result = f(&mut base, self);
        self.bases.insert(id, base);
        result
    }

    /// Advance one frame.
    ///
    /// Order: due timers, trigger input, connector probing, destroy queue,
    /// deferred merges. Merges therefore always see the destroy queue flushed
    /// and finish before the next probing pass.
    pub fn tick(&mut self, dt: f32, probe: &dyn ConnectorProbe, input: &InputFrame) -> Result<Vec<ForgeEvent>> {
        self.tick += 1;

        for task in self.timers.advance(dt) {
            self.run_timer(task)?;
        }

        self.update_guns(input)?;
        self.probe_connections(probe)?;

        self.end_frame()
    }

    /// Flush queued destruction, run deferred merges and hand back every
    /// event produced since the last call
    pub fn end_frame(&mut self) -> Result<Vec<ForgeEvent>> {
        self.flush_destroy_queue();
        self.run_pending_merges()?;
        Ok(std::mem::take(&mut self.events))
    }

    fn run_timer(&mut self, task: TimerTask) -> Result<()> {
        match task {
            TimerTask::GunRearm(id) | TimerTask::BowRearm(id) => {
                if let Some(base) = self.bases.get_mut(&id) {
                    base.rearm();
                }
            }
        }
        Ok(())
    }

    pub(crate) fn flush_destroy_queue(&mut self) {
        for destroy in std::mem::take(&mut self.destroy_queue) {
            match destroy {
                Destroy::Body(body) => {
                    let Some(removed) = self.bodies.remove(&body) else {
                        continue;
                    };
                    match removed.owner {
                        BodyOwner::Component(id) => {
                            if let Some(component) = self.components.get_mut(&id) {
                                component.body = None;
                            }
                        }
                        BodyOwner::Item(id) => {
                            if let Some(item) = self.items.get_mut(&id) {
                                item.body = None;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Inputs a probe can hit this frame, by id
    fn probe_targets(&self) -> Result<Vec<ProbeTarget>> {
        let mut targets = Vec::new();
        for input in self.connectors.inputs() {
            if !input.enabled || !self.scene.is_active(input.node)? {
                continue;
            }
            targets.push(ProbeTarget {
                input: input.id,
                component: input.component,
                position: self.scene.world_pose(input.node)?.position,
                layer: input.layer,
            });
        }
        targets.sort_by_key(|t| t.input);
        Ok(targets)
    }

    /// Cast every searching output once and connect what it hits
    pub fn probe_connections(&mut self, probe: &dyn ConnectorProbe) -> Result<usize> {
        let mut targets = self.probe_targets()?;
        let mut connected = 0;

        for output_id in self.connectors.probing_outputs() {
            let output = self.connectors.output(output_id)?;
            if !self.component(output.component)?.enabled {
                continue;
            }

            let pose = self.scene.world_pose(output.node)?;
            let ray = ProbeRay {
                origin: pose.position,
                direction: pose.forward(),
                distance: output.distance,
                mask: output.mask,
                source: output_id,
                source_component: output.component,
            };

            let Some(hit) = probe.cast(&ray, &targets) else {
                continue;
            };

            if self.try_connect(output_id, hit.input)?.is_connected() {
                connected += 1;
                // Pieces moved; later rays must see the new positions
                targets = self.probe_targets()?;
            }
        }

        Ok(connected)
    }

    fn update_guns(&mut self, input: &InputFrame) -> Result<()> {
        let mut guns: Vec<ComponentId> = self
            .bases
            .iter()
            .filter(|(_, base)| base.is_gun())
            .map(|(id, _)| *id)
            .collect();
        guns.sort();

        for gun in guns {
            let Some(hand) = self.holding_hand(gun)? else {
                continue;
            };
            let pressure = input.trigger(hand);
            self.with_base(gun, |base, workshop| base.update_trigger(workshop, pressure))?;
        }
        Ok(())
    }
}
