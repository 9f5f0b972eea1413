//! Partforge demo
//!
//! Assembles a gun and a bow from the catalog through connector probing and
//! fires both at an enemy. An axe then chops a tree into the inventory. The
//! outcome is printed as a JSON summary.

use std::path::PathBuf;

use clap::Parser;
use glam::Vec3;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use partforge::assembly::{InputFrame, Workshop};
use partforge::bases::ArrowRelease;
use partforge::combat::{OffensiveEntity, ResourceNode, ResourceSpec};
use partforge::connector::RaySphereProbe;
use partforge::core::config::ForgeConfig;
use partforge::core::error::Result;
use partforge::core::types::ComponentId;
use partforge::data::ComponentCatalog;
use partforge::events::ForgeEvent;
use partforge::fsm::Enemy;
use partforge::inventory::Inventory;
use partforge::scene::Pose;
use partforge::stats::ModifierName;

const DT: f32 = 1.0 / 60.0;

#[derive(Parser, Debug)]
#[command(name = "partforge")]
#[command(about = "Assemble weapons from parts and fire them at an enemy")]
struct Args {
    /// Component catalog (TOML); built-in parts when omitted
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Workshop config (TOML); defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ticks to hold the trigger
    #[arg(long, default_value_t = 120)]
    ticks: u32,

    /// Random seed for bullet spread and enemy growls
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Serialize, Default)]
struct Summary {
    items: Vec<ItemSummary>,
    projectiles: usize,
    arrows: usize,
    hits: usize,
    damage_dealt: f32,
    enemy_state: String,
    enemy_health: f32,
    materials_harvested: usize,
    inventory_slots: usize,
    events: usize,
}

#[derive(Serialize)]
struct ItemSummary {
    id: String,
    members: Vec<String>,
    base: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("partforge=debug")))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ForgeConfig::load(path)?,
        None => ForgeConfig::default(),
    };
    let catalog = match &args.catalog {
        Some(path) => ComponentCatalog::load_from_toml(path)?,
        None => ComponentCatalog::with_defaults(),
    };

    let probe = RaySphereProbe::new(config.connector_hit_radius);
    let mut workshop = Workshop::with_seed(config.clone(), catalog, args.seed)?;
    let mut summary = Summary::default();

    let gun = assemble_gun(&mut workshop, &probe, &mut summary)?;
    let bow = assemble_bow(&mut workshop, &probe, &mut summary)?;

    let mut enemy = Enemy::new(Vec3::new(0.0, 0.0, 8.0), 30.0, 5.0, &config, args.seed);
    enemy.set_player(Some(Vec3::ZERO), false);
    enemy.player_detected();

    let hand = workshop.add_hand();
    workshop.grab(hand, gun, Vec3::ZERO)?;

    for _ in 0..args.ticks {
        let input = InputFrame::new().with_trigger(hand, 1.0);
        let events = workshop.tick(DT, &probe, &input)?;
        resolve(&events, &mut enemy, &mut summary);
        summary.events += events.len() + enemy.update(DT).len();
    }
    workshop.release(hand)?;

    if let Some(arrow) = workshop.base(bow).and_then(|b| b.bow()).map(|b| b.make_arrow()) {
        workshop.arm_arrow(bow, arrow)?;
        workshop.draw_arrow(bow, -0.5)?;
        if let ArrowRelease::Launched(_) = workshop.release_arrow(bow)? {
            let events = workshop.end_frame()?;
            resolve(&events, &mut enemy, &mut summary);
            summary.events += events.len();
        }
    }

    let mut inventory = Inventory::from_config(&config);
    harvest(&mut workshop, &probe, &mut inventory, &config, args.seed, &mut summary)?;
    summary.inventory_slots = inventory.slots().len();

    summary.events += enemy.drain_events().len();
    summary.enemy_state = enemy.state().name().to_string();
    summary.enemy_health = enemy.health().current();
    for item in workshop.items() {
        summary.items.push(ItemSummary {
            id: item.id.to_string(),
            members: item
                .components
                .iter()
                .map(|c| workshop.component(*c).map(|c| c.template.clone()))
                .collect::<Result<_>>()?,
            base: item.base.map(|b| b.to_string()),
        });
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Frame with barrel, stock, automatic engine and magazine, loaded
fn assemble_gun(workshop: &mut Workshop, probe: &RaySphereProbe, summary: &mut Summary) -> Result<ComponentId> {
    let frame = workshop.spawn_component("gun_frame", Pose::IDENTITY)?;
    workshop.spawn_component("barrel", Pose::from_position(Vec3::new(0.0, 0.0, 0.22)))?;
    workshop.spawn_component("stock", Pose::from_position(Vec3::new(0.0, 0.0, -0.22)))?;
    workshop.spawn_component("auto_engine", Pose::from_position(Vec3::new(0.0, 0.1, 0.0)))?;
    let magazine = workshop.spawn_component("magazine_well", Pose::from_position(Vec3::new(0.0, -0.1, 0.0)))?;

    let events = workshop.tick(DT, probe, &InputFrame::new())?;
    summary.events += events.len();

    workshop.reload_via(magazine, "Ammo")?;
    summary.events += workshop.end_frame()?.len();
    Ok(frame)
}

/// Riser with one limb; the second limb is mirrored automatically
fn assemble_bow(workshop: &mut Workshop, probe: &RaySphereProbe, summary: &mut Summary) -> Result<ComponentId> {
    let offset = Vec3::new(3.0, 0.0, 0.0);
    let riser = workshop.spawn_component("bow_riser", Pose::from_position(offset))?;
    workshop.spawn_component("limb", Pose::from_position(offset + Vec3::new(0.0, 0.22, 0.0)))?;

    let events = workshop.tick(DT, probe, &InputFrame::new())?;
    summary.events += events.len();
    Ok(riser)
}

/// Chop a tree with a fresh axe until it is gone, keeping the wood
fn harvest(
    workshop: &mut Workshop,
    probe: &RaySphereProbe,
    inventory: &mut Inventory,
    config: &ForgeConfig,
    seed: u64,
    summary: &mut Summary,
) -> Result<()> {
    let offset = Vec3::new(6.0, 0.0, 0.0);
    workshop.spawn_component("axe_handle", Pose::from_position(offset))?;
    let head = workshop.spawn_component("axe_head", Pose::from_position(offset + Vec3::new(0.0, 0.26, 0.0)))?;
    summary.events += workshop.tick(DT, probe, &InputFrame::new())?.len();

    let Some(mut blade) = workshop.component(head)?.capabilities.offensive.clone() else {
        return Ok(());
    };
    let spec = ResourceSpec::new("wood", ModifierName::WoodEfficiency);
    let mut tree = ResourceNode::new(spec, offset + Vec3::Z, config, seed)?;

    while !tree.is_dead() {
        if tree.on_hit("Tool", &mut blade, 6.0, offset).is_none() {
            break;
        }
        for event in tree.drain_events() {
            if let ForgeEvent::MaterialSpawned { material, .. } = &event {
                summary.materials_harvested += 1;
                inventory.store_material(material);
            }
            summary.events += 1;
        }
    }
    Ok(())
}

/// Anything fired this tick that points at the enemy hits it
fn resolve(events: &[ForgeEvent], enemy: &mut Enemy, summary: &mut Summary) {
    for event in events {
        let (position, direction, damage) = match event {
            ForgeEvent::ProjectileSpawned {
                position,
                direction,
                damage,
                ..
            } => {
                summary.projectiles += 1;
                (*position, *direction, *damage)
            }
            ForgeEvent::ArrowLaunched {
                position,
                direction,
                damage,
                ..
            } => {
                summary.arrows += 1;
                (*position, *direction, *damage)
            }
            _ => continue,
        };

        let to_enemy = (enemy.position() - position).normalize_or_zero();
        if direction.dot(to_enemy) < 0.98 {
            continue;
        }
        let mut projectile = OffensiveEntity::projectile(damage, ModifierName::Health);
        if let Some(dealt) = enemy.on_hit("Projectile", &mut projectile, 0.0) {
            summary.hits += 1;
            summary.damage_dealt += dealt;
        }
    }
}
