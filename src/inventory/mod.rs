//! Player inventory
//!
//! A fixed number of slots. Stackable entries with the same display name
//! share a slot up to the stack limit; everything else takes a slot of its
//! own. Storing a loose component removes it from the workshop, taking it
//! out spawns a fresh one from the same template.

use serde::{Deserialize, Serialize};

use crate::assembly::Workshop;
use crate::core::config::ForgeConfig;
use crate::core::error::Result;
use crate::core::types::ComponentId;
use crate::events::ForgeEvent;
use crate::scene::Pose;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoredKind {
    Component,
    Material,
}

/// How an entry is shown and whether it stacks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItemData {
    pub display_name: String,
    #[serde(default)]
    pub stackable: bool,
}

impl InventoryItemData {
    pub fn new(display_name: impl Into<String>, stackable: bool) -> Self {
        Self {
            display_name: display_name.into(),
            stackable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySlot {
    pub data: InventoryItemData,
    pub kind: StoredKind,
    /// Template (components) or material type (materials) to respawn
    pub source: String,
    pub stacks: u32,
}

/// What came out of a slot
#[derive(Debug, Clone, PartialEq)]
pub enum Withdrawn {
    Component(ComponentId),
    /// The host spawns the material itself
    Material(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    max_items: usize,
    max_stacks: u32,
    slots: Vec<InventorySlot>,
    /// Bumped on every change so a UI can tell when to redraw
    revision: u64,
}

impl Inventory {
    pub fn new(max_items: usize, max_stacks: u32) -> Self {
        Self {
            max_items,
            max_stacks: max_stacks.max(1),
            slots: Vec::new(),
            revision: 0,
        }
    }

    pub fn from_config(config: &ForgeConfig) -> Self {
        Self::new(config.inventory_max_items, config.inventory_max_stacks)
    }

    pub fn slots(&self) -> &[InventorySlot] {
        &self.slots
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Shrinking below the current slot count keeps existing entries
    pub fn set_max_items(&mut self, max_items: usize) {
        self.max_items = max_items;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.max_items
    }

    /// Put one entry in. Stackable entries first top up a matching slot;
    /// anything that does not fit is refused.
    pub fn add_new_item(&mut self, data: InventoryItemData, kind: StoredKind, source: impl Into<String>) -> bool {
        if data.stackable {
            let max_stacks = self.max_stacks;
            let existing = self
                .slots
                .iter_mut()
                .find(|slot| slot.data.display_name == data.display_name && slot.stacks < max_stacks);
            if let Some(slot) = existing {
                slot.stacks += 1;
                self.changed();
                return true;
            }
        }

        if self.is_full() {
            tracing::debug!(item = %data.display_name, "Inventory full");
            return false;
        }

        self.slots.push(InventorySlot {
            data,
            kind,
            source: source.into(),
            stacks: 1,
        });
        self.changed();
        true
    }

    /// Take one entry out of a slot. Stacked slots shrink by one; the last
    /// one empties the slot.
    pub fn remove_item(&mut self, index: usize) -> Option<InventorySlot> {
        let slot = self.slots.get_mut(index)?;
        let taken = if slot.data.stackable && slot.stacks > 1 {
            slot.stacks -= 1;
            InventorySlot {
                stacks: 1,
                ..slot.clone()
            }
        } else {
            self.slots.remove(index)
        };
        self.changed();
        Some(taken)
    }

    /// Pack a loose component away. Parts of an item are refused.
    pub fn store_component(&mut self, workshop: &mut Workshop, id: ComponentId) -> Result<bool> {
        let component = workshop.component(id)?;
        if component.item.is_some() {
            return Ok(false);
        }

        let template = component.template.clone();
        let stackable = workshop.catalog().require(&template)?.stackable;
        let data = InventoryItemData::new(component.display_name.clone(), stackable);

        // Check for room first so a refused add leaves the part in the world
        if !self.has_room_for(&data) || !workshop.despawn_component(id)? {
            return Ok(false);
        }
        self.add_new_item(data, StoredKind::Component, template);
        workshop.events.push(ForgeEvent::ComponentStored { component: id });
        Ok(true)
    }

    /// Materials always stack
    pub fn store_material(&mut self, material: &str) -> bool {
        self.add_new_item(InventoryItemData::new(material, true), StoredKind::Material, material)
    }

    /// Take one entry out, respawning components at `pose`
    pub fn withdraw(&mut self, workshop: &mut Workshop, index: usize, pose: Pose) -> Result<Option<Withdrawn>> {
        let Some(slot) = self.slots.get(index) else {
            return Ok(None);
        };
        // Resolve the template before touching the slot
        if slot.kind == StoredKind::Component {
            workshop.catalog().require(&slot.source)?;
        }

        let Some(slot) = self.remove_item(index) else {
            return Ok(None);
        };
        match slot.kind {
            StoredKind::Component => Ok(Some(Withdrawn::Component(
                workshop.spawn_component(&slot.source, pose)?,
            ))),
            StoredKind::Material => Ok(Some(Withdrawn::Material(slot.source))),
        }
    }

    fn has_room_for(&self, data: &InventoryItemData) -> bool {
        let stacks_up = data.stackable
            && self
                .slots
                .iter()
                .any(|slot| slot.data.display_name == data.display_name && slot.stacks < self.max_stacks);
        stacks_up || !self.is_full()
    }

    fn changed(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stackable_items_share_a_slot() {
        let mut inventory = Inventory::new(2, 3);
        for _ in 0..3 {
            assert!(inventory.store_material("wood"));
        }
        assert_eq!(inventory.slots().len(), 1);
        assert_eq!(inventory.slots()[0].stacks, 3);

        // Full stack spills into a new slot
        assert!(inventory.store_material("wood"));
        assert_eq!(inventory.slots().len(), 2);
        assert_eq!(inventory.slots()[1].stacks, 1);
    }

    #[test]
    fn test_full_inventory_refuses() {
        let mut inventory = Inventory::new(1, 2);
        let sword = InventoryItemData::new("sword", false);
        assert!(inventory.add_new_item(sword.clone(), StoredKind::Component, "sword"));
        assert!(!inventory.add_new_item(sword, StoredKind::Component, "sword"));
        assert!(!inventory.store_material("stone"));
        assert_eq!(inventory.revision(), 1);
    }

    #[test]
    fn test_non_stackable_never_stacks() {
        let mut inventory = Inventory::new(3, 5);
        let barrel = InventoryItemData::new("Barrel", false);
        inventory.add_new_item(barrel.clone(), StoredKind::Component, "barrel");
        inventory.add_new_item(barrel, StoredKind::Component, "barrel");
        assert_eq!(inventory.slots().len(), 2);
        assert!(inventory.slots().iter().all(|slot| slot.stacks == 1));
    }

    #[test]
    fn test_remove_takes_one_from_a_stack() {
        let mut inventory = Inventory::new(2, 5);
        inventory.store_material("stone");
        inventory.store_material("stone");

        let taken = inventory.remove_item(0).unwrap();
        assert_eq!(taken.stacks, 1);
        assert_eq!(taken.source, "stone");
        assert_eq!(inventory.slots()[0].stacks, 1);

        inventory.remove_item(0).unwrap();
        assert!(inventory.slots().is_empty());
        assert!(inventory.remove_item(0).is_none());
    }
}
