//! Component catalog - templates every spawnable part is built from
//!
//! Templates come from TOML (`[[components]]` tables) or from the built-in
//! set used by the demo and the tests.

use serde::Deserialize;
use std::path::Path;

use super::template::{
    BaseKind, BaseSpec, ComponentTemplate, EngineSpec, OffensiveSpec, PoseSpec, RecipeCost,
    StatSpec,
};
use crate::core::error::{ForgeError, Result};
use crate::stats::{Modifier, ModifierName};

const X: [f32; 3] = [1.0, 0.0, 0.0];
const Y: [f32; 3] = [0.0, 1.0, 0.0];
const Z: [f32; 3] = [0.0, 0.0, 1.0];
const NEG_Y: [f32; 3] = [0.0, -1.0, 0.0];
const NEG_Z: [f32; 3] = [0.0, 0.0, -1.0];

#[derive(Debug, Deserialize)]
struct TomlCatalog {
    #[serde(default)]
    components: Vec<ComponentTemplate>,
}

/// Catalog of all spawnable component templates
#[derive(Debug, Clone, Default)]
pub struct ComponentCatalog {
    templates: Vec<ComponentTemplate>,
}

impl ComponentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in gun, bow and axe parts
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();

        // Guns
        catalog.add(
            ComponentTemplate::new("gun_frame", "frame", true)
                .with_input(PoseSpec::new([0.0, 0.0, 0.1], Z, Y))
                .with_input(PoseSpec::new([0.0, 0.0, -0.1], NEG_Z, Y))
                .with_input(PoseSpec::new([0.0, 0.05, 0.0], Y, Z))
                .with_input(PoseSpec::new([0.0, -0.05, 0.0], NEG_Y, Z))
                .with_modifier(Modifier::base(ModifierName::Accuracy, 40.0))
                .with_base(BaseSpec {
                    kind: BaseKind::Gun,
                    stats: vec![
                        StatSpec::new(ModifierName::Damage, 0.0),
                        StatSpec::new(ModifierName::FireRate, 0.0),
                        StatSpec::new(ModifierName::Accuracy, 0.0),
                        StatSpec::new(ModifierName::Velocity, 0.0),
                        StatSpec::new(ModifierName::MagazineSize, 0.0),
                    ],
                    pairings: Vec::new(),
                    arrow_anchor: None,
                    arrow_size: 0.0,
                }),
        );

        let mut barrel = ComponentTemplate::new("barrel", "barrel", true)
            .with_output(PoseSpec::new([0.0, 0.0, -0.1], NEG_Z, Y))
            .with_modifier(Modifier::base(ModifierName::Damage, 10.0))
            .with_modifier(Modifier::base(ModifierName::Velocity, 400.0))
            .with_modifier(Modifier::increased(ModifierName::Accuracy, 20.0));
        barrel.shooting_point = Some(PoseSpec::new([0.0, 0.0, 0.1], Z, Y));
        catalog.add(barrel);

        catalog.add(
            ComponentTemplate::new("stock", "stock", true)
                .with_output(PoseSpec::new([0.0, 0.0, 0.1], Z, Y))
                .with_modifier(Modifier::base(ModifierName::Accuracy, 30.0))
                .with_modifier(Modifier::more(ModifierName::Velocity, 10.0)),
        );

        let mut auto_engine = ComponentTemplate::new("auto_engine", "engine", true)
            .with_output(PoseSpec::new([0.0, -0.03, 0.0], NEG_Y, Z))
            .with_modifier(Modifier::base(ModifierName::FireRate, 10.0))
            .with_modifier(Modifier::more(ModifierName::Damage, -20.0));
        auto_engine.engine = Some(EngineSpec { automatic: true });
        catalog.add(auto_engine);

        let mut manual_engine = ComponentTemplate::new("manual_engine", "engine", true)
            .with_output(PoseSpec::new([0.0, -0.03, 0.0], NEG_Y, Z))
            .with_modifier(Modifier::base(ModifierName::FireRate, 2.0))
            .with_modifier(Modifier::increased(ModifierName::Damage, 50.0));
        manual_engine.engine = Some(EngineSpec { automatic: false });
        catalog.add(manual_engine);

        let mut reloader = ComponentTemplate::new("magazine_well", "reloader", true)
            .with_output(PoseSpec::new([0.0, 0.03, 0.0], Y, Z))
            .with_modifier(Modifier::base(ModifierName::MagazineSize, 6.0));
        reloader.reloader = true;
        catalog.add(reloader);

        // Bows
        catalog.add(
            ComponentTemplate::new("bow_riser", "riser", true)
                .with_input(PoseSpec::new([0.0, 0.1, 0.0], Y, Z))
                .with_input(PoseSpec::new([0.0, -0.1, 0.0], NEG_Y, Z))
                .with_modifier(Modifier::base(ModifierName::Damage, 5.0))
                .with_modifier(Modifier::base(ModifierName::Velocity, 20.0))
                .with_base(BaseSpec {
                    kind: BaseKind::Bow,
                    stats: vec![
                        StatSpec::new(ModifierName::Damage, 0.0),
                        StatSpec::new(ModifierName::Velocity, 0.0),
                    ],
                    pairings: vec![[0, 1]],
                    arrow_anchor: Some(PoseSpec::default()),
                    arrow_size: 0.7,
                }),
        );

        let mut limb = ComponentTemplate::new("limb", "limb", false)
            .with_output(PoseSpec::new([0.0, -0.1, 0.0], NEG_Y, Z))
            .with_input(PoseSpec::new([0.0, 0.1, 0.0], Y, Z))
            .with_modifier(Modifier::base(ModifierName::Damage, 2.0))
            .with_modifier(Modifier::increased(ModifierName::Velocity, 25.0));
        limb.line_drawer = Some(PoseSpec::new([0.0, 0.1, -0.05], Z, Y));
        catalog.add(limb);

        // Tools
        catalog.add(
            ComponentTemplate::new("axe_handle", "handle", true)
                .with_input(PoseSpec::new([0.0, 0.2, 0.0], Y, X))
                .with_modifier(Modifier::base(ModifierName::Damage, 3.0))
                .with_base(BaseSpec {
                    kind: BaseKind::Tool,
                    stats: vec![StatSpec::new(ModifierName::Damage, 0.0)],
                    pairings: Vec::new(),
                    arrow_anchor: None,
                    arrow_size: 0.0,
                }),
        );

        let mut axe_head = ComponentTemplate::new("axe_head", "head", true)
            .with_output(PoseSpec::new([0.0, -0.05, 0.0], NEG_Y, X))
            .with_modifier(Modifier::base(ModifierName::Damage, 12.0))
            .with_modifier(Modifier::increased(ModifierName::Damage, 25.0));
        axe_head.offensive = Some(OffensiveSpec {
            stats: vec![
                StatSpec::new(ModifierName::Damage, 1.0),
                StatSpec::new(ModifierName::WoodEfficiency, 100.0),
                StatSpec::new(ModifierName::StoneEfficiency, 40.0),
            ],
            use_velocity: true,
            min_velocity: 1.0,
            max_velocity: 6.0,
            deal_damage_once: false,
        });
        axe_head.recipe = vec![
            RecipeCost {
                material: "stone".into(),
                amount: 2,
            },
            RecipeCost {
                material: "wood".into(),
                amount: 1,
            },
        ];
        catalog.add(axe_head);

        catalog
    }

    /// Add a template, replacing any previous one with the same name
    pub fn add(&mut self, template: ComponentTemplate) {
        self.templates.retain(|t| t.name != template.name);
        self.templates.push(template);
    }

    /// Add a template unless one with the same name already exists
    pub fn register_if_absent(&mut self, template: ComponentTemplate) -> bool {
        if self.get(&template.name).is_some() {
            return false;
        }
        self.templates.push(template);
        true
    }

    /// Get a template by name
    pub fn get(&self, name: &str) -> Option<&ComponentTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    pub fn require(&self, name: &str) -> Result<&ComponentTemplate> {
        self.get(name)
            .ok_or_else(|| ForgeError::TemplateNotFound(name.to_string()))
    }

    /// Templates that can be crafted at a station
    pub fn craftable(&self) -> impl Iterator<Item = &ComponentTemplate> {
        self.templates.iter().filter(|t| !t.recipe.is_empty())
    }

    pub fn all(&self) -> &[ComponentTemplate] {
        &self.templates
    }

    /// Load templates from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse templates from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let data: TomlCatalog = toml::from_str(content)?;

        let mut catalog = Self::new();
        for template in data.components {
            validate_template(&template)?;
            if catalog.get(&template.name).is_some() {
                return Err(ForgeError::Catalog(format!(
                    "duplicate template name '{}'",
                    template.name
                )));
            }
            catalog.templates.push(template);
        }
        Ok(catalog)
    }
}

fn validate_template(template: &ComponentTemplate) -> Result<()> {
    if template.name.is_empty() {
        return Err(ForgeError::Catalog("template with empty name".into()));
    }

    let Some(base) = &template.base else {
        return Ok(());
    };

    for [left, right] in &base.pairings {
        if *left >= template.inputs.len() || *right >= template.inputs.len() || left == right {
            return Err(ForgeError::Catalog(format!(
                "'{}' pairs inputs {} and {} but has {} inputs",
                template.name,
                left,
                right,
                template.inputs.len()
            )));
        }
    }

    if base.kind == BaseKind::Bow && base.arrow_size <= 0.0 {
        return Err(ForgeError::Catalog(format!(
            "bow '{}' needs a positive arrow_size",
            template.name
        )));
    }

    Ok(())
}
