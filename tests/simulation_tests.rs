//! Vehicle kinematics, command layer, and re-routing validation

use road_sim::simulation::{Command, JunctionId, SimError, SimWorld};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// World with A(0,0), B(10,0), C(10,10); A-B 5, B-C 5, direct A-C 20
fn triangle_world() -> (SimWorld, JunctionId, JunctionId, JunctionId) {
    let mut world = SimWorld::new();
    let a = world.graph.add_junction("A", 0.0, 0.0).unwrap();
    let b = world.graph.add_junction("B", 10.0, 0.0).unwrap();
    let c = world.graph.add_junction("C", 10.0, 10.0).unwrap();
    world.graph.add_road(a, b, 5.0).unwrap();
    world.graph.add_road(b, c, 5.0).unwrap();
    world.graph.add_road(a, c, 20.0).unwrap();
    (world, a, b, c)
}

#[test]
fn vehicle_arrives_on_the_fifth_tick() {
    // One segment of length 30, speed 60, ticks of 0.1: six units per tick,
    // cumulative distance first reaches 30 on tick five.
    let mut world = SimWorld::new();
    let s = world.graph.add_junction("S", 0.0, 0.0).unwrap();
    let e = world.graph.add_junction("E", 30.0, 0.0).unwrap();
    world.graph.add_road(s, e, 30.0).unwrap();

    let id = world.spawn_vehicle(s, e, 60.0).unwrap();

    for tick in 1..=4 {
        world.tick(0.1);
        assert!(
            world.vehicle(id).is_some(),
            "vehicle should still be traveling after tick {}",
            tick
        );
    }

    world.tick(0.1);
    assert!(world.vehicle(id).is_none());
    assert_eq!(world.stats.vehicles_arrived, 1);
    assert_eq!(world.vehicle_count(), 0);
}

#[test]
fn zero_delta_tick_leaves_the_vehicle_unchanged() {
    let mut world = SimWorld::new();
    let s = world.graph.add_junction("S", 0.0, 0.0).unwrap();
    let e = world.graph.add_junction("E", 30.0, 0.0).unwrap();
    world.graph.add_road(s, e, 30.0).unwrap();

    let id = world.spawn_vehicle(s, e, 60.0).unwrap();
    world.tick(0.1);
    world.tick(0.1);

    let before = world.vehicle(id).unwrap();
    let cursor = before.cursor();
    let position = before.position();

    world.tick(0.0);

    let after = world.vehicle(id).unwrap();
    assert_eq!(after.cursor(), cursor);
    assert!(approx(after.position().x, position.x));
    assert!(approx(after.position().y, position.y));
}

#[test]
fn vehicle_position_interpolates_along_the_segment() {
    let mut world = SimWorld::new();
    let s = world.graph.add_junction("S", 0.0, 0.0).unwrap();
    let e = world.graph.add_junction("E", 30.0, 0.0).unwrap();
    world.graph.add_road(s, e, 30.0).unwrap();

    let id = world.spawn_vehicle(s, e, 60.0).unwrap();
    world.tick(0.1);

    let vehicle = world.vehicle(id).unwrap();
    assert!(approx(vehicle.position().x, 6.0));
    assert!(approx(vehicle.position().y, 0.0));
}

#[test]
fn at_most_one_segment_boundary_is_crossed_per_tick() {
    // Speed 100 over two length-10 segments: a single tick of one second
    // could cover the whole path, but the residual past the first boundary
    // is dropped.
    let mut world = SimWorld::new();
    let x = world.graph.add_junction("X", 0.0, 0.0).unwrap();
    let y = world.graph.add_junction("Y", 10.0, 0.0).unwrap();
    let z = world.graph.add_junction("Z", 20.0, 0.0).unwrap();
    world.graph.add_road(x, y, 10.0).unwrap();
    world.graph.add_road(y, z, 10.0).unwrap();

    let id = world.spawn_vehicle(x, z, 100.0).unwrap();

    world.tick(1.0);
    let vehicle = world.vehicle(id).expect("vehicle must not skip segments");
    assert_eq!(vehicle.cursor(), (1, 0.0));
    assert!(approx(vehicle.position().x, 10.0));

    world.tick(1.0);
    assert!(world.vehicle(id).is_none());
    assert_eq!(world.stats.vehicles_arrived, 1);
}

#[test]
fn zero_length_segments_do_not_divide_by_zero() {
    // P and Q are coincident; the P-Q segment has length zero.
    let mut world = SimWorld::new();
    let p = world.graph.add_junction("P", 5.0, 5.0).unwrap();
    let q = world.graph.add_junction("Q", 5.0, 5.0).unwrap();
    let r = world.graph.add_junction("R", 11.0, 5.0).unwrap();
    world.graph.add_road(p, q, 1.0).unwrap();
    world.graph.add_road(q, r, 1.0).unwrap();

    let id = world.spawn_vehicle(p, r, 1.0).unwrap();

    let mut ticks = 0;
    while world.vehicle(id).is_some() {
        world.tick(0.1);
        ticks += 1;
        if let Some(vehicle) = world.vehicle(id) {
            assert!(vehicle.position().x.is_finite());
            assert!(vehicle.position().y.is_finite());
        }
        assert!(ticks < 200, "vehicle never arrived");
    }
    assert_eq!(world.stats.vehicles_arrived, 1);
}

#[test]
fn speed_factor_scales_the_tick() {
    let mut world = SimWorld::new();
    let s = world.graph.add_junction("S", 0.0, 0.0).unwrap();
    let e = world.graph.add_junction("E", 30.0, 0.0).unwrap();
    world.graph.add_road(s, e, 30.0).unwrap();
    world.speed_factor = 2.0;

    let id = world.spawn_vehicle(s, e, 60.0).unwrap();

    world.tick(0.1);
    world.tick(0.1);
    assert!(world.vehicle(id).is_some());
    world.tick(0.1);
    assert!(world.vehicle(id).is_none());
}

#[test]
fn spawn_rejects_identical_endpoints() {
    let (mut world, a, _, _) = triangle_world();
    let err = world.spawn_vehicle(a, a, 60.0).unwrap_err();
    assert!(matches!(err, SimError::NoPathFound(_, _)));
    assert_eq!(world.vehicle_count(), 0);
}

#[test]
fn spawn_rejects_unreachable_destinations() {
    let (mut world, a, _, _) = triangle_world();
    let island = world.graph.add_junction("Island", 99.0, 99.0).unwrap();

    let err = world.spawn_vehicle(a, island, 60.0).unwrap_err();
    assert!(matches!(err, SimError::NoPathFound(_, _)));
}

#[test]
fn weight_decrease_on_the_route_never_worsens_the_path() {
    let (mut world, a, b, c) = triangle_world();
    let id = world.spawn_vehicle(a, c, 60.0).unwrap();

    let old_cost = world
        .graph
        .path_cost(world.vehicle(id).unwrap().path())
        .unwrap();
    assert!(approx(old_cost, 10.0));

    world.tick(0.05);
    world
        .apply(Command::SetWeight {
            from: "B".into(),
            to: "C".into(),
            weight: 1.0,
        })
        .unwrap();

    let vehicle = world.vehicle(id).unwrap();
    let new_cost = world.graph.path_cost(vehicle.path()).unwrap();
    assert!(new_cost <= old_cost);
    assert!(approx(new_cost, 6.0));
    assert_eq!(vehicle.path(), &[a, b, c]);
    assert_eq!(vehicle.cursor(), (0, 0.0), "journey restarts from the top");
}

#[test]
fn weight_increase_reroutes_onto_the_direct_edge() {
    let (mut world, a, _, c) = triangle_world();
    let id = world.spawn_vehicle(a, c, 60.0).unwrap();

    world
        .apply(Command::SetWeight {
            from: "A".into(),
            to: "B".into(),
            weight: 30.0,
        })
        .unwrap();

    let vehicle = world.vehicle(id).unwrap();
    assert_eq!(vehicle.path(), &[a, c]);
    assert_eq!(vehicle.cursor(), (0, 0.0));
}

#[test]
fn adding_a_shortcut_reroutes_in_flight_vehicles() {
    let mut world = SimWorld::new();
    let a = world.graph.add_junction("A", 0.0, 0.0).unwrap();
    let b = world.graph.add_junction("B", 10.0, 0.0).unwrap();
    let c = world.graph.add_junction("C", 10.0, 10.0).unwrap();
    world.graph.add_road(a, b, 5.0).unwrap();
    world.graph.add_road(b, c, 5.0).unwrap();

    let id = world.spawn_vehicle(a, c, 60.0).unwrap();
    world.tick(0.05);

    world
        .apply(Command::AddEdge {
            from: "A".into(),
            to: "C".into(),
            weight: 3.0,
        })
        .unwrap();

    let vehicle = world.vehicle(id).unwrap();
    assert_eq!(vehicle.path(), &[a, c]);
    assert_eq!(vehicle.cursor(), (0, 0.0));
}

#[test]
fn removing_a_cut_junction_evicts_stranded_vehicles() {
    let mut world = SimWorld::new();
    let a = world.graph.add_junction("A", 0.0, 0.0).unwrap();
    let b = world.graph.add_junction("B", 10.0, 0.0).unwrap();
    let c = world.graph.add_junction("C", 10.0, 10.0).unwrap();
    world.graph.add_road(a, b, 5.0).unwrap();
    world.graph.add_road(b, c, 5.0).unwrap();

    world.spawn_vehicle(a, c, 60.0).unwrap();
    world.apply(Command::RemoveNode { name: "B".into() }).unwrap();

    assert_eq!(world.vehicle_count(), 0);
    assert_eq!(world.stats.vehicles_evicted, 1);
    assert_eq!(world.graph.junction_count(), 2);
    assert_eq!(world.graph.road_count(), 0);
}

#[test]
fn removing_the_only_road_evicts_its_vehicle() {
    let mut world = SimWorld::new();
    let a = world.graph.add_junction("A", 0.0, 0.0).unwrap();
    let b = world.graph.add_junction("B", 10.0, 0.0).unwrap();
    world.graph.add_road(a, b, 5.0).unwrap();

    world.spawn_vehicle(a, b, 60.0).unwrap();
    world
        .apply(Command::RemoveEdge {
            from: "A".into(),
            to: "B".into(),
        })
        .unwrap();

    assert_eq!(world.vehicle_count(), 0);
    assert_eq!(world.stats.vehicles_evicted, 1);
}

#[test]
fn surviving_vehicles_keep_their_routes_when_another_is_evicted() {
    // Two vehicles; deleting D strands only the second one.
    let mut world = SimWorld::new();
    let a = world.graph.add_junction("A", 0.0, 0.0).unwrap();
    let b = world.graph.add_junction("B", 10.0, 0.0).unwrap();
    let c = world.graph.add_junction("C", 10.0, 10.0).unwrap();
    let d = world.graph.add_junction("D", 0.0, 10.0).unwrap();
    world.graph.add_road(a, b, 5.0).unwrap();
    world.graph.add_road(b, c, 5.0).unwrap();
    world.graph.add_road(a, d, 5.0).unwrap();

    let survivor = world.spawn_vehicle(a, c, 60.0).unwrap();
    let stranded = world.spawn_vehicle(a, d, 60.0).unwrap();

    world.apply(Command::RemoveNode { name: "D".into() }).unwrap();

    assert!(world.vehicle(stranded).is_none());
    let vehicle = world.vehicle(survivor).expect("survivor must stay");
    assert_eq!(vehicle.path(), &[a, b, c]);
    assert_eq!(world.stats.vehicles_evicted, 1);
}

#[test]
fn moving_a_junction_restarts_in_flight_vehicles() {
    let (mut world, a, _, c) = triangle_world();
    let id = world.spawn_vehicle(a, c, 60.0).unwrap();
    world.tick(0.05);
    assert_ne!(world.vehicle(id).unwrap().cursor(), (0, 0.0));

    world
        .apply(Command::MoveNode {
            name: "B".into(),
            x: 40.0,
            y: 0.0,
        })
        .unwrap();

    assert_eq!(world.vehicle(id).unwrap().cursor(), (0, 0.0));
}

#[test]
fn commands_reject_unknown_names_and_bad_weights() {
    let (mut world, ..) = triangle_world();

    assert!(matches!(
        world.apply(Command::AddEdge {
            from: "A".into(),
            to: "Nowhere".into(),
            weight: 5.0,
        }),
        Err(SimError::UnknownNode(_))
    ));
    assert!(matches!(
        world.apply(Command::SetWeight {
            from: "A".into(),
            to: "B".into(),
            weight: 0.0,
        }),
        Err(SimError::InvalidWeight(_))
    ));
    assert!(matches!(
        world.apply(Command::AddNode {
            name: "a".into(),
            x: 1.0,
            y: 1.0,
        }),
        Err(SimError::DuplicateIdentity(_))
    ));

    // Rejected commands leave the store untouched
    let a = world.graph.resolve("A").unwrap();
    let b = world.graph.resolve("B").unwrap();
    assert_eq!(world.graph.weight(a, b), Some(5.0));
    assert_eq!(world.graph.junction_count(), 3);
}

#[test]
fn random_spawn_needs_at_least_two_junctions() {
    let mut world = SimWorld::new_with_seed(7);
    assert_eq!(world.spawn_random_vehicle().unwrap(), None);

    world.graph.add_junction("Lonely", 0.0, 0.0).unwrap();
    assert_eq!(world.spawn_random_vehicle().unwrap(), None);
}

#[test]
fn random_spawn_routes_between_distinct_junctions() {
    let mut world = SimWorld::create_demo_world_with_seed(42);

    let id = world
        .spawn_random_vehicle()
        .unwrap()
        .expect("demo network is fully connected");

    let vehicle = world.vehicle(id).unwrap();
    assert!(vehicle.path().len() >= 2);
    assert_ne!(vehicle.start(), vehicle.end());
    assert_eq!(world.stats.vehicles_spawned, 1);
}
