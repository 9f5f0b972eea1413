//! Tool base: pushes the item's damage into its striking parts

use crate::assembly::Workshop;
use crate::core::error::Result;
use crate::core::types::ComponentId;
use crate::stats::{find_stat, FloatStat, ModifierName};

#[derive(Debug, Clone, Default)]
pub struct ToolBase {
    offensive_parts: Vec<ComponentId>,
}

impl ToolBase {
    pub fn offensive_parts(&self) -> &[ComponentId] {
        &self.offensive_parts
    }

    pub(crate) fn on_component_connection(
        &mut self,
        stats: &[FloatStat],
        workshop: &mut Workshop,
        new_members: &[ComponentId],
    ) -> Result<()> {
        for member in new_members {
            if workshop.component(*member)?.capabilities.offensive.is_some()
                && !self.offensive_parts.contains(member)
            {
                self.offensive_parts.push(*member);
            }
        }

        let damage = find_stat(stats, ModifierName::Damage).map_or(0.0, FloatStat::current);
        for part in &self.offensive_parts {
            let component = workshop.component_mut(*part)?;
            let Some(offensive) = component.capabilities.offensive.as_mut() else {
                continue;
            };
            if let Some(stat) = offensive.stat_mut(ModifierName::Damage) {
                stat.set_current_maximum(damage);
            }
        }

        tracing::debug!(parts = self.offensive_parts.len(), damage, "Tool damage updated");
        Ok(())
    }
}
