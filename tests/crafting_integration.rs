//! Crafting station integration tests

use glam::Vec3;

use partforge::assembly::{InputFrame, Workshop};
use partforge::connector::RaySphereProbe;
use partforge::core::config::ForgeConfig;
use partforge::core::types::MaterialId;
use partforge::crafting::CraftingStation;
use partforge::data::ComponentCatalog;
use partforge::scene::Pose;
use partforge::stats::ModifierName;

fn workshop() -> Workshop {
    Workshop::new(ForgeConfig::default(), ComponentCatalog::with_defaults()).unwrap()
}

#[test]
fn test_default_catalog_offers_axe_head() {
    let workshop = workshop();
    let station = CraftingStation::from_catalog(workshop.catalog());

    let names: Vec<&str> = station.recipes().iter().map(|r| r.component.as_str()).collect();
    assert_eq!(names, vec!["axe_head"]);
}

#[test]
fn test_station_spawns_crafted_part() {
    let mut workshop = workshop();
    let mut station = CraftingStation::from_catalog(workshop.catalog());
    assert!(station.select_recipe("axe_head"));

    let output = Pose::from_position(Vec3::new(1.0, 1.0, 0.0));
    station.material_added("stone", MaterialId(4));
    station.material_added("wood", MaterialId(9));
    assert_eq!(station.update(&mut workshop, output).unwrap(), None);
    assert_eq!(workshop.component_count(), 0);

    station.material_added("stone", MaterialId(2));
    station.material_added("stone", MaterialId(7));
    let (head, result) = station.update(&mut workshop, output).unwrap().unwrap();

    assert_eq!(result.component, "axe_head");
    assert_eq!(result.consumed, vec![MaterialId(2), MaterialId(4), MaterialId(9)]);
    assert_eq!(station.count("stone"), 1);
    assert_eq!(station.count("wood"), 0);

    let component = workshop.component(head).unwrap();
    assert_eq!(component.template, "axe_head");
    assert!(component.body.is_some());
    assert!(workshop
        .world_pose(head)
        .unwrap()
        .position
        .abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-5));

    // The leftover stone is not enough for another head
    assert_eq!(station.update(&mut workshop, output).unwrap(), None);
}

#[test]
fn test_crafted_head_fits_a_handle() {
    let mut workshop = workshop();
    let mut station = CraftingStation::from_catalog(workshop.catalog());
    station.select_recipe("axe_head");
    for (material, id) in [("stone", 1), ("stone", 2), ("wood", 3)] {
        station.material_added(material, MaterialId(id));
    }

    let handle = workshop.spawn_component("axe_handle", Pose::IDENTITY).unwrap();
    let (head, _) = station
        .update(&mut workshop, Pose::from_position(Vec3::new(0.0, 0.26, 0.0)))
        .unwrap()
        .unwrap();

    let probe = RaySphereProbe::new(ForgeConfig::default().connector_hit_radius);
    workshop.tick(1.0 / 60.0, &probe, &InputFrame::new()).unwrap();

    let item = workshop.component(head).unwrap().item.unwrap();
    assert_eq!(workshop.item(item).unwrap().base, Some(handle));
    let damage = workshop
        .component(head)
        .unwrap()
        .capabilities
        .offensive
        .as_ref()
        .unwrap()
        .stat(ModifierName::Damage)
        .unwrap()
        .current();
    assert!((damage - 18.75).abs() < 1e-4);
}

#[test]
fn test_removed_material_no_longer_counts() {
    let mut station = CraftingStation::from_catalog(&ComponentCatalog::with_defaults());
    station.select_recipe("axe_head");
    station.material_added("stone", MaterialId(1));
    station.material_added("stone", MaterialId(2));
    station.material_added("wood", MaterialId(3));
    assert!(station.can_craft());

    station.material_removed("stone", MaterialId(2));
    assert!(!station.can_craft());
    assert_eq!(station.costs()[0], ("stone".to_string(), 1, 2));
}
