//! Crafting station - turns loose materials into components
//!
//! Materials entering and leaving the station's detection area are reported
//! by the host. Once every cost of the selected recipe is covered the station
//! consumes exactly what it needs and hands back the template to spawn.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::assembly::Workshop;
use crate::core::error::Result;
use crate::core::types::{ComponentId, MaterialId};
use crate::data::{ComponentCatalog, RecipeCost};
use crate::scene::Pose;

/// Materials needed to build one component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Template spawned on success
    pub component: String,
    pub materials: Vec<RecipeCost>,
}

/// Outcome of a successful craft
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CraftResult {
    pub component: String,
    /// Materials the host should destroy
    pub consumed: Vec<MaterialId>,
}

#[derive(Debug, Clone, Default)]
pub struct CraftingStation {
    recipes: Vec<Recipe>,
    selected: Option<usize>,
    /// Material type -> materials currently inside the station
    filled: AHashMap<String, BTreeSet<MaterialId>>,
}

impl CraftingStation {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self {
            recipes,
            selected: None,
            filled: AHashMap::new(),
        }
    }

    /// One recipe per catalog template that has a cost
    pub fn from_catalog(catalog: &ComponentCatalog) -> Self {
        Self::new(
            catalog
                .craftable()
                .map(|template| Recipe {
                    component: template.name.clone(),
                    materials: template.recipe.clone(),
                })
                .collect(),
        )
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn selected(&self) -> Option<&Recipe> {
        self.selected.and_then(|i| self.recipes.get(i))
    }

    /// Select the recipe producing `component`. Unknown names clear the
    /// selection and return false.
    pub fn select_recipe(&mut self, component: &str) -> bool {
        self.selected = self.recipes.iter().position(|r| r.component == component);
        self.selected.is_some()
    }

    pub fn material_added(&mut self, material: &str, id: MaterialId) {
        self.filled.entry(material.to_string()).or_default().insert(id);
    }

    pub fn material_removed(&mut self, material: &str, id: MaterialId) {
        if let Some(spots) = self.filled.get_mut(material) {
            spots.remove(&id);
            if spots.is_empty() {
                self.filled.remove(material);
            }
        }
    }

    /// How many materials of a type are inside the station
    pub fn count(&self, material: &str) -> usize {
        self.filled.get(material).map_or(0, BTreeSet::len)
    }

    /// `(material, present, required)` for every cost of the selected recipe
    pub fn costs(&self) -> Vec<(String, usize, u32)> {
        let Some(recipe) = self.selected() else {
            return Vec::new();
        };
        recipe
            .materials
            .iter()
            .map(|cost| (cost.material.clone(), self.count(&cost.material), cost.amount))
            .collect()
    }

    pub fn can_craft(&self) -> bool {
        let Some(recipe) = self.selected() else {
            return false;
        };
        recipe
            .materials
            .iter()
            .all(|cost| self.count(&cost.material) >= cost.amount as usize)
    }

    /// Consume the selected recipe's materials, lowest ids first. Leftovers
    /// stay in the station.
    pub fn try_craft(&mut self) -> Option<CraftResult> {
        if !self.can_craft() {
            return None;
        }
        let recipe = self.selected()?.clone();

        let mut consumed = Vec::new();
        for cost in &recipe.materials {
            let Some(spots) = self.filled.get_mut(&cost.material) else {
                continue;
            };
            let taken: Vec<MaterialId> = spots.iter().take(cost.amount as usize).copied().collect();
            for id in &taken {
                spots.remove(id);
            }
            if spots.is_empty() {
                self.filled.remove(&cost.material);
            }
            consumed.extend(taken);
        }

        tracing::debug!(component = %recipe.component, consumed = consumed.len(), "Crafted component");
        Some(CraftResult {
            component: recipe.component,
            consumed,
        })
    }

    /// Per-tick check: craft when possible and spawn the result at `output`
    pub fn update(&mut self, workshop: &mut Workshop, output: Pose) -> Result<Option<(ComponentId, CraftResult)>> {
        let Some(result) = self.try_craft() else {
            return Ok(None);
        };
        let component = workshop.spawn_component(&result.component, output)?;
        Ok(Some((component, result)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station() -> CraftingStation {
        let mut station = CraftingStation::new(vec![Recipe {
            component: "axe_head".into(),
            materials: vec![
                RecipeCost {
                    material: "stone".into(),
                    amount: 2,
                },
                RecipeCost {
                    material: "wood".into(),
                    amount: 1,
                },
            ],
        }]);
        assert!(station.select_recipe("axe_head"));
        station
    }

    #[test]
    fn test_nothing_selected_cannot_craft() {
        let mut station = CraftingStation::from_catalog(&ComponentCatalog::new());
        assert!(!station.select_recipe("axe_head"));
        assert!(!station.can_craft());
        assert!(station.try_craft().is_none());
    }

    #[test]
    fn test_missing_material_blocks_craft() {
        let mut station = station();
        station.material_added("stone", MaterialId(1));
        station.material_added("stone", MaterialId(2));
        assert!(!station.can_craft());
        assert_eq!(
            station.costs(),
            vec![("stone".to_string(), 2, 2), ("wood".to_string(), 0, 1)]
        );
    }

    #[test]
    fn test_craft_consumes_exactly_what_it_needs() {
        let mut station = station();
        for id in [5, 3, 9] {
            station.material_added("stone", MaterialId(id));
        }
        station.material_added("wood", MaterialId(4));

        let result = station.try_craft().unwrap();

        assert_eq!(result.component, "axe_head");
        assert_eq!(result.consumed, vec![MaterialId(3), MaterialId(5), MaterialId(4)]);
        assert_eq!(station.count("stone"), 1);
        assert_eq!(station.count("wood"), 0);
        assert!(!station.can_craft());
    }

    #[test]
    fn test_removed_material_no_longer_counts() {
        let mut station = station();
        station.material_added("wood", MaterialId(1));
        station.material_removed("wood", MaterialId(1));
        station.material_removed("wood", MaterialId(1));
        assert_eq!(station.count("wood"), 0);
    }
}
