//! Assembly integration tests
//!
//! Connecting parts, validity of merges, reorientation and the end-of-tick
//! item rebuild.

use glam::Vec3;

use partforge::assembly::{ConnectOutcome, InputFrame, Workshop};
use partforge::connector::RaySphereProbe;
use partforge::core::config::ForgeConfig;
use partforge::core::types::{ComponentId, InputId, OutputId};
use partforge::data::{BaseKind, BaseSpec, ComponentCatalog, ComponentTemplate, PoseSpec};
use partforge::events::ForgeEvent;
use partforge::scene::Pose;
use partforge::stats::ModifierName;

const EPS: f32 = 1e-4;

fn workshop() -> Workshop {
    let mut workshop = Workshop::new(ForgeConfig::default(), ComponentCatalog::with_defaults()).unwrap();
    workshop.register_template(
        ComponentTemplate::new("socket_stock", "stock", true)
            .with_input(PoseSpec::new([0.0, 0.0, 0.1], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0])),
    );
    workshop.register_template(
        ComponentTemplate::new("plain_barrel", "barrel", true)
            .with_output(PoseSpec::new([0.0, 0.0, -0.1], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0])),
    );
    workshop.register_template(
        ComponentTemplate::new("coupler", "coupler", false)
            .with_input(PoseSpec::new([0.0, 0.0, 0.1], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]))
            .with_output(PoseSpec::new([0.0, 0.0, -0.1], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0])),
    );
    workshop
}

fn generic_base() -> BaseSpec {
    BaseSpec {
        kind: BaseKind::Generic,
        stats: Vec::new(),
        pairings: Vec::new(),
        arrow_anchor: None,
        arrow_size: 0.0,
    }
}

fn faces_coincide(workshop: &Workshop, output: OutputId, input: InputId) -> bool {
    let scene = workshop.scene();
    let output_pose = scene
        .world_pose(workshop.connectors().output(output).unwrap().node)
        .unwrap();
    let input_pose = scene
        .world_pose(workshop.connectors().input(input).unwrap().node)
        .unwrap();
    output_pose.position.abs_diff_eq(input_pose.position, EPS)
        && output_pose.forward().abs_diff_eq(-input_pose.forward(), EPS)
}

fn probe() -> RaySphereProbe {
    RaySphereProbe::new(ForgeConfig::default().connector_hit_radius)
}

fn first_input(workshop: &Workshop, id: ComponentId) -> InputId {
    workshop.component(id).unwrap().inputs[0]
}

fn first_output(workshop: &Workshop, id: ComponentId) -> OutputId {
    workshop.component(id).unwrap().outputs[0]
}

#[test]
fn test_stock_and_barrel_merge_into_one_item_without_base() {
    let mut workshop = workshop();
    let stock = workshop.spawn_component("socket_stock", Pose::IDENTITY).unwrap();
    let barrel = workshop
        .spawn_component("plain_barrel", Pose::from_position(Vec3::new(2.0, 0.0, 0.0)))
        .unwrap();

    let outcome = workshop
        .try_connect(first_output(&workshop, barrel), first_input(&workshop, stock))
        .unwrap();
    assert_eq!(outcome, ConnectOutcome::Connected);

    // The item is only rebuilt at the end of the frame
    assert!(workshop.items().is_empty());
    let events = workshop.end_frame().unwrap();

    let items = workshop.items();
    assert_eq!(items.len(), 1);
    let item = items[0];
    assert_eq!(item.components.len(), 2);
    assert!(item.contains(stock));
    assert!(item.contains(barrel));
    assert_eq!(item.base, None);
    assert_eq!(workshop.component(stock).unwrap().item, Some(item.id));
    assert_eq!(workshop.component(barrel).unwrap().item, Some(item.id));

    let finished: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, ForgeEvent::ItemFinished { .. }))
        .collect();
    assert_eq!(finished.len(), 1);
}

#[test]
fn test_connectors_are_linked_both_ways() {
    let mut workshop = workshop();
    let stock = workshop.spawn_component("socket_stock", Pose::IDENTITY).unwrap();
    let barrel = workshop.spawn_component("plain_barrel", Pose::IDENTITY).unwrap();
    let input = first_input(&workshop, stock);
    let output = first_output(&workshop, barrel);

    assert!(!workshop.connectors().input(input).unwrap().connected());
    assert!(!workshop.connectors().output(output).unwrap().connected());

    workshop.try_connect(output, input).unwrap();

    let connectors = workshop.connectors();
    assert_eq!(connectors.input(input).unwrap().connected_to(), Some(output));
    assert_eq!(connectors.output(output).unwrap().connected_to(), Some(input));

    // A matched pair is exclusive
    let other = workshop.spawn_component("plain_barrel", Pose::IDENTITY).unwrap();
    let outcome = workshop
        .try_connect(first_output(&workshop, other), input)
        .unwrap();
    assert_eq!(outcome, ConnectOutcome::Occupied);
    assert_eq!(
        workshop.try_connect(output, input).unwrap(),
        ConnectOutcome::AlreadyConnected
    );
}

#[test]
fn test_two_engines_never_merge() {
    let mut workshop = workshop();
    let frame = workshop.spawn_component("gun_frame", Pose::IDENTITY).unwrap();
    let auto = workshop.spawn_component("auto_engine", Pose::IDENTITY).unwrap();
    let manual = workshop.spawn_component("manual_engine", Pose::IDENTITY).unwrap();
    let frame_inputs = workshop.component(frame).unwrap().inputs.clone();

    assert!(workshop
        .try_connect(first_output(&workshop, auto), frame_inputs[2])
        .unwrap()
        .is_connected());
    workshop.end_frame().unwrap();

    assert!(!workshop.is_valid_connection(manual, frame).unwrap());
    assert!(!workshop.is_valid_connection(frame, manual).unwrap());
    assert!(!workshop.is_valid_connection(auto, manual).unwrap());

    let outcome = workshop
        .try_connect(first_output(&workshop, manual), frame_inputs[3])
        .unwrap();
    assert_eq!(outcome, ConnectOutcome::Rejected);

    // Nothing changed and nothing was announced
    assert!(!workshop.connectors().input(frame_inputs[3]).unwrap().connected());
    assert!(workshop.end_frame().unwrap().is_empty());
    assert_eq!(workshop.component(manual).unwrap().item, None);
    assert_eq!(workshop.items().len(), 1);
}

#[test]
fn test_engines_rejected_while_merge_is_pending() {
    let mut workshop = workshop();
    let frame = workshop.spawn_component("gun_frame", Pose::IDENTITY).unwrap();
    let auto = workshop.spawn_component("auto_engine", Pose::IDENTITY).unwrap();
    let manual = workshop.spawn_component("manual_engine", Pose::IDENTITY).unwrap();
    let frame_inputs = workshop.component(frame).unwrap().inputs.clone();

    workshop
        .try_connect(first_output(&workshop, auto), frame_inputs[2])
        .unwrap();
    let outcome = workshop
        .try_connect(first_output(&workshop, manual), frame_inputs[3])
        .unwrap();

    assert_eq!(outcome, ConnectOutcome::Rejected);
}

#[test]
fn test_output_is_turned_onto_the_input() {
    let mut workshop = workshop();
    let stock = workshop
        .spawn_component(
            "socket_stock",
            Pose::from_euler_degrees(Vec3::new(1.0, 2.0, 3.0), [0.0, 40.0, 0.0]),
        )
        .unwrap();
    let barrel = workshop
        .spawn_component(
            "plain_barrel",
            Pose::from_euler_degrees(Vec3::new(5.0, 0.0, 0.0), [30.0, -20.0, 10.0]),
        )
        .unwrap();
    let input = first_input(&workshop, stock);
    let output = first_output(&workshop, barrel);

    workshop.try_connect(output, input).unwrap();
    workshop.end_frame().unwrap();

    let scene = workshop.scene();
    let input_pose = scene
        .world_pose(workshop.connectors().input(input).unwrap().node)
        .unwrap();
    let output_pose = scene
        .world_pose(workshop.connectors().output(output).unwrap().node)
        .unwrap();
    assert!(output_pose.forward().abs_diff_eq(-input_pose.forward(), EPS));
    assert!(output_pose.up().abs_diff_eq(input_pose.up(), EPS));
    assert!(output_pose.position.abs_diff_eq(input_pose.position, EPS));

    // The input side never moves
    let stock_pose = workshop.world_pose(stock).unwrap();
    assert!(stock_pose.position.abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), EPS));
}

#[test]
fn test_merge_replaces_bodies_with_one_item_body() {
    let mut workshop = workshop();
    let stock = workshop.spawn_component("socket_stock", Pose::IDENTITY).unwrap();
    let barrel = workshop.spawn_component("plain_barrel", Pose::IDENTITY).unwrap();
    let stock_body = workshop.component(stock).unwrap().body.unwrap();
    let barrel_body = workshop.component(barrel).unwrap().body.unwrap();

    workshop
        .try_connect(first_output(&workshop, barrel), first_input(&workshop, stock))
        .unwrap();
    assert!(workshop.body(stock_body).unwrap().kinematic);
    workshop.end_frame().unwrap();

    assert!(workshop.body(stock_body).is_err());
    assert!(workshop.body(barrel_body).is_err());

    let item_body = workshop.items()[0].body.unwrap();
    assert_eq!(workshop.attached_body(stock).unwrap(), Some(item_body));
    assert_eq!(workshop.attached_body(barrel).unwrap(), Some(item_body));
    assert!(!workshop.body(item_body).unwrap().kinematic);
}

#[test]
fn test_hand_holding_the_input_side_keeps_the_item() {
    let mut workshop = workshop();
    let stock = workshop.spawn_component("socket_stock", Pose::IDENTITY).unwrap();
    let barrel = workshop.spawn_component("plain_barrel", Pose::IDENTITY).unwrap();
    let hand = workshop.add_hand();
    assert!(workshop.grab(hand, stock, Vec3::new(0.0, 0.0, 0.05)).unwrap());

    workshop
        .try_connect(first_output(&workshop, barrel), first_input(&workshop, stock))
        .unwrap();
    // Released while the merge is pending
    assert!(workshop.hand(hand).unwrap().holding.is_none());

    workshop.end_frame().unwrap();

    let grab = workshop.hand(hand).unwrap().holding.unwrap();
    assert_eq!(grab.component, stock);
    assert_eq!(grab.grab_point, Vec3::new(0.0, 0.0, 0.05));
    assert_eq!(workshop.items()[0].currently_grabbed, Some(stock));
    assert_eq!(workshop.holding_hand(barrel).unwrap(), Some(hand));
}

#[test]
fn test_probing_assembles_a_gun() {
    let mut workshop = workshop();
    let frame = workshop.spawn_component("gun_frame", Pose::IDENTITY).unwrap();
    let barrel = workshop
        .spawn_component("barrel", Pose::from_position(Vec3::new(0.0, 0.0, 0.22)))
        .unwrap();
    let stock = workshop
        .spawn_component("stock", Pose::from_position(Vec3::new(0.0, 0.0, -0.22)))
        .unwrap();
    let engine = workshop
        .spawn_component("auto_engine", Pose::from_position(Vec3::new(0.0, 0.1, 0.0)))
        .unwrap();
    let magazine = workshop
        .spawn_component("magazine_well", Pose::from_position(Vec3::new(0.0, -0.1, 0.0)))
        .unwrap();

    assert_eq!(workshop.probe_connections(&probe()).unwrap(), 4);
    workshop.end_frame().unwrap();

    let items = workshop.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].base, Some(frame));
    for part in [frame, barrel, stock, engine, magazine] {
        assert!(items[0].contains(part));
    }

    // Only the base stays grabbable
    assert!(workshop.component(frame).unwrap().can_be_grabbed);
    assert!(!workshop.component(barrel).unwrap().can_be_grabbed);

    // Parts snapped onto their sockets
    assert!(workshop
        .world_pose(barrel)
        .unwrap()
        .position
        .abs_diff_eq(Vec3::new(0.0, 0.0, 0.2), EPS));
    assert!(workshop
        .world_pose(engine)
        .unwrap()
        .position
        .abs_diff_eq(Vec3::new(0.0, 0.08, 0.0), EPS));

    let base = workshop.base(frame).unwrap();
    let gun = base.gun().unwrap();
    assert_eq!(gun.engine(), Some(engine));
    assert!(gun.is_automatic());
    assert_eq!(gun.end_points(), &[barrel]);
    assert_eq!(
        workshop.component(magazine).unwrap().capabilities.reloader.unwrap().gun_base,
        Some(frame)
    );

    assert!((base.stat(ModifierName::Damage) - 8.0).abs() < EPS);
    assert!((base.stat(ModifierName::Accuracy) - 84.0).abs() < EPS);
    assert!((base.stat(ModifierName::Velocity) - 440.0).abs() < EPS);
    assert!((base.stat(ModifierName::FireRate) - 10.0).abs() < EPS);
    assert!((base.stat(ModifierName::MagazineSize) - 6.0).abs() < EPS);
}

#[test]
fn test_tick_connects_and_finishes_in_one_frame() {
    let mut workshop = workshop();
    let frame = workshop.spawn_component("gun_frame", Pose::IDENTITY).unwrap();
    workshop
        .spawn_component("barrel", Pose::from_position(Vec3::new(0.0, 0.0, 0.22)))
        .unwrap();

    let events = workshop.tick(1.0 / 60.0, &probe(), &InputFrame::new()).unwrap();

    assert!(events.iter().any(|e| matches!(
        e,
        ForgeEvent::ItemFinished { base: Some(base), .. } if *base == frame
    )));
    // Nothing left to connect on the next frame
    let events = workshop.tick(1.0 / 60.0, &probe(), &InputFrame::new()).unwrap();
    assert!(events.is_empty());
}

#[test]
fn test_far_parts_do_not_connect() {
    let mut workshop = workshop();
    workshop.spawn_component("gun_frame", Pose::IDENTITY).unwrap();
    workshop
        .spawn_component("barrel", Pose::from_position(Vec3::new(0.0, 0.0, 0.5)))
        .unwrap();

    assert_eq!(workshop.probe_connections(&probe()).unwrap(), 0);
    assert!(workshop.end_frame().unwrap().is_empty());
    assert!(workshop.items().is_empty());
}

#[test]
fn test_unknown_template_is_an_error() {
    let mut workshop = workshop();
    assert!(workshop.spawn_component("laser", Pose::IDENTITY).is_err());
}

#[test]
fn test_chain_connected_in_one_tick_keeps_faces_together() {
    let mut workshop = workshop();
    let tail = workshop
        .spawn_component("plain_barrel", Pose::from_position(Vec3::new(0.0, 0.0, 0.48)))
        .unwrap();
    let middle = workshop
        .spawn_component("coupler", Pose::from_position(Vec3::new(0.0, 0.0, 0.24)))
        .unwrap();
    let head = workshop.spawn_component("socket_stock", Pose::IDENTITY).unwrap();

    let events = workshop.tick(1.0 / 60.0, &probe(), &InputFrame::new()).unwrap();
    assert!(events.iter().any(|e| matches!(e, ForgeEvent::ItemFinished { .. })));

    let items = workshop.items();
    assert_eq!(items.len(), 1);
    for part in [tail, middle, head] {
        assert!(items[0].contains(part));
    }

    assert!(faces_coincide(
        &workshop,
        first_output(&workshop, tail),
        first_input(&workshop, middle)
    ));
    assert!(faces_coincide(
        &workshop,
        first_output(&workshop, middle),
        first_input(&workshop, head)
    ));

    // The whole chain slid onto the head, which never moved
    assert!(workshop.world_pose(head).unwrap().position.abs_diff_eq(Vec3::ZERO, EPS));
    assert!(workshop
        .world_pose(middle)
        .unwrap()
        .position
        .abs_diff_eq(Vec3::new(0.0, 0.0, 0.2), EPS));
    assert!(workshop
        .world_pose(tail)
        .unwrap()
        .position
        .abs_diff_eq(Vec3::new(0.0, 0.0, 0.4), EPS));
}

#[test]
fn test_merging_two_items_replaces_both() {
    let mut workshop = workshop();
    let stock = workshop.spawn_component("socket_stock", Pose::IDENTITY).unwrap();
    let front = workshop.spawn_component("coupler", Pose::IDENTITY).unwrap();
    workshop
        .try_connect(first_output(&workshop, front), first_input(&workshop, stock))
        .unwrap();
    workshop.end_frame().unwrap();

    let back = workshop.spawn_component("coupler", Pose::from_position(Vec3::new(1.0, 0.0, 0.0))).unwrap();
    let barrel = workshop.spawn_component("plain_barrel", Pose::from_position(Vec3::new(1.0, 0.0, 0.0))).unwrap();
    workshop
        .try_connect(first_output(&workshop, barrel), first_input(&workshop, back))
        .unwrap();
    workshop.end_frame().unwrap();

    let old: Vec<_> = workshop
        .items()
        .iter()
        .map(|item| (item.id, item.node, item.body.unwrap()))
        .collect();
    assert_eq!(old.len(), 2);

    workshop
        .try_connect(first_output(&workshop, back), first_input(&workshop, front))
        .unwrap();
    let events = workshop.end_frame().unwrap();

    for (id, node, body) in &old {
        assert!(workshop.item(*id).is_err());
        assert!(!workshop.scene().contains(*node));
        assert!(workshop.body(*body).is_err());
    }

    let items = workshop.items();
    assert_eq!(items.len(), 1);
    let item = items[0];
    assert_eq!(item.components.len(), 4);
    for part in [stock, front, back, barrel] {
        assert!(item.contains(part));
        assert_eq!(workshop.component(part).unwrap().item, Some(item.id));
        assert_eq!(workshop.attached_body(part).unwrap(), item.body);
    }
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, ForgeEvent::ItemFinished { .. }))
            .count(),
        1
    );
    assert_eq!(workshop.body_count(), 1);
}

#[test]
fn test_last_base_wins_when_two_join() {
    let mut workshop = workshop();
    workshop.register_template(
        ComponentTemplate::new("base_socket", "socket", false)
            .with_input(PoseSpec::new([0.0, 0.0, 0.1], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]))
            .with_base(generic_base()),
    );
    workshop.register_template(
        ComponentTemplate::new("base_plug", "plug", false)
            .with_output(PoseSpec::new([0.0, 0.0, -0.1], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]))
            .with_base(generic_base()),
    );
    let socket = workshop.spawn_component("base_socket", Pose::IDENTITY).unwrap();
    let plug = workshop.spawn_component("base_plug", Pose::IDENTITY).unwrap();

    workshop
        .try_connect(first_output(&workshop, plug), first_input(&workshop, socket))
        .unwrap();
    let events = workshop.end_frame().unwrap();

    // Members are visited input side first
    let item = workshop.items()[0];
    assert_eq!(item.components, vec![socket, plug]);
    assert_eq!(item.base, Some(plug));
    assert!(events.iter().any(|e| matches!(
        e,
        ForgeEvent::ItemFinished { base: Some(base), .. } if *base == plug
    )));

    assert!(workshop.component(plug).unwrap().can_be_grabbed);
    assert!(!workshop.component(socket).unwrap().can_be_grabbed);
}
