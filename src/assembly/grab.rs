//! Hands grabbing and releasing components

use glam::Vec3;

use super::item::Grab;
use super::workshop::Workshop;
use crate::core::error::Result;
use crate::core::types::{ComponentId, HandId, ItemId};

impl Workshop {
    /// The member a hand holds the component's item by, or the component
    /// itself while standalone
    pub fn currently_grabbed(&self, id: ComponentId) -> Result<Option<ComponentId>> {
        let component = self.component(id)?;
        match component.item {
            Some(item) => Ok(self.item(item)?.currently_grabbed),
            None => Ok(component.grabbed_by.map(|_| id)),
        }
    }

    /// Hand holding the component, directly or through its item
    pub fn holding_hand(&self, id: ComponentId) -> Result<Option<HandId>> {
        match self.currently_grabbed(id)? {
            Some(held) => Ok(self.component(held)?.grabbed_by),
            None => Ok(None),
        }
    }

    /// Grab a component. Returns `false` when the hand is busy, the component
    /// is held elsewhere or it is locked against grabbing.
    pub fn grab(&mut self, hand: HandId, id: ComponentId, grab_point: Vec3) -> Result<bool> {
        if !self.component(id)?.can_be_grabbed {
            return Ok(false);
        }
        self.grab_unchecked(hand, id, grab_point)
    }

    /// Grab ignoring the component's grab lock; used to hand a freshly
    /// merged item back to whoever held it
    pub(crate) fn force_grab(&mut self, hand: HandId, id: ComponentId, grab_point: Vec3) -> Result<bool> {
        self.grab_unchecked(hand, id, grab_point)
    }

    fn grab_unchecked(&mut self, hand: HandId, id: ComponentId, grab_point: Vec3) -> Result<bool> {
        let busy = self.hands.get(&hand).map_or(true, |h| h.holding.is_some());
        if busy || self.holding_hand(id)?.is_some() {
            return Ok(false);
        }

        let item = {
            let component = self.component_mut(id)?;
            component.grabbed_by = Some(hand);
            component.grab_point = grab_point;
            component.item
        };
        if let Some(hand) = self.hands.get_mut(&hand) {
            hand.holding = Some(Grab {
                component: id,
                grab_point,
            });
        }

        if let Some(item) = item {
            self.item_mut(item)?.currently_grabbed = Some(id);
            self.set_item_grabbable(item, false)?;
        }

        tracing::debug!(%hand, component = %id, "Grabbed");
        Ok(true)
    }

    /// Let go of whatever the hand holds
    pub fn release(&mut self, hand: HandId) -> Result<Option<ComponentId>> {
        let Some(grab) = self.hands.get_mut(&hand).and_then(|h| h.holding.take()) else {
            return Ok(None);
        };

        let item = {
            let component = self.component_mut(grab.component)?;
            component.grabbed_by = None;
            component.item
        };

        if let Some(item) = item {
            self.item_mut(item)?.currently_grabbed = None;
            self.set_item_grabbable(item, true)?;
        }

        Ok(Some(grab.component))
    }

    /// Make whichever hand holds the component (or its item) let go
    pub fn force_release(&mut self, id: ComponentId) -> Result<()> {
        if let Some(hand) = self.holding_hand(id)? {
            self.release(hand)?;
        }
        Ok(())
    }

    /// With a base only the base is toggled; otherwise every member is
    fn set_item_grabbable(&mut self, item: ItemId, grabbable: bool) -> Result<()> {
        let item = self.item(item)?;
        let targets = match item.base {
            Some(base) => vec![base],
            None => item.components.clone(),
        };
        for target in targets {
            self.component_mut(target)?.can_be_grabbed = grabbable;
        }
        Ok(())
    }
}
