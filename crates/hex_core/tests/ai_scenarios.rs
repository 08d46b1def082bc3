//! End-to-end AI scenarios on hand-built boards.

use hex_core::behavior::{BehaviorNode, NodeStatus};
use hex_core::influence::InfluenceMap;
use hex_core::math::Fixed;
use hex_core::pathfinding::Pathfinder;
use hex_core::tactical::{Order, UnitController};
use hex_core::terrain::Terrain;
use hex_core::unit::{PlayerId, UnitKind, UnitStats};
use hex_test_utils::fixtures::{at, fixed, WorldBuilder};

#[test]
fn attack_base_order_strikes_adjacent_enemy_once_per_turn() {
    let (mut world, units) = WorldBuilder::new(8, 8)
        .ring_with_water(6, 6)
        .base(PlayerId::ONE, 0, 0)
        .base(PlayerId::TWO, 6, 6)
        .unit(UnitKind::Infantry, PlayerId::ONE, 2, 2)
        .unit(UnitKind::Artillery, PlayerId::TWO, 3, 2)
        .build();
    let (attacker, target) = (units[0], units[1]);

    let atk = world.unit(attacker).unwrap().stats().attack;
    let def = world.unit(target).unwrap().stats().defense;
    let terrain_bonus = world.grid().cell(at(3, 2)).unwrap().defense_bonus();
    let expected = atk.saturating_sub(def + terrain_bonus).max(1);
    let start_health = world.unit(target).unwrap().health();

    let mut controller = UnitController::new(attacker);
    controller.give_order(Order::AttackBase, None);

    assert_eq!(controller.execute_turn(&mut world), Some(NodeStatus::Running));
    let hit = world.unit(target).unwrap();
    assert_eq!(hit.health(), start_health - expected);
    assert!(world.unit(attacker).unwrap().has_attacked());

    // Latched: no second attack, and the base is unreachable so no move.
    assert_eq!(controller.execute_turn(&mut world), Some(NodeStatus::Running));
    assert_eq!(world.unit(target).unwrap().health(), start_health - expected);
    assert_eq!(world.unit(attacker).unwrap().cell(), at(2, 2));
}

#[test]
fn move_beyond_budget_changes_nothing() {
    let (mut world, _) = WorldBuilder::new(6, 1).build();
    let slow = UnitStats {
        movement: 2,
        ..UnitStats::infantry()
    };
    let id = world.spawn_unit(slow, PlayerId::ONE, at(0, 0)).unwrap();
    assert_eq!(world.path_cost(id, at(3, 0)), Some(fixed(3)));

    let hash = world.state_hash();
    assert!(!world.can_move_to(id, at(3, 0)));
    assert!(world.move_unit(id, at(3, 0)).is_err());

    let unit = world.unit(id).unwrap();
    assert_eq!(unit.cell(), at(0, 0));
    assert_eq!(unit.remaining_movement(), 2);
    assert!(!unit.has_moved());
    assert_eq!(world.unit_at(at(0, 0)).map(|u| u.id()), Some(id));
    assert!(world.unit_at(at(3, 0)).is_none());
    assert_eq!(world.state_hash(), hash);
}

#[test]
fn goal_ringed_by_water_has_no_path() {
    let (world, _) = WorldBuilder::new(7, 7).ring_with_water(4, 4).build();
    let finder = Pathfinder::new(world.grid());
    let profile = UnitStats::infantry().movement_profile();

    assert!(finder.find_path(at(0, 0), at(4, 4), &profile).is_none());
    assert!(finder
        .find_cheapest_path(at(0, 0), at(4, 4), PlayerId::ONE, &profile)
        .is_none());
    assert!(finder
        .find_tactical_path(at(0, 0), at(4, 4), &profile, &[])
        .is_none());
}

#[test]
fn isolated_unit_influence_stays_home() {
    let mut builder = WorldBuilder::new(3, 3);
    for row in 0..3 {
        for col in 0..3 {
            if (col, row) != (1, 1) {
                builder = builder.terrain(col, row, Terrain::Water);
            }
        }
    }
    let (world, _) = builder
        .unit(UnitKind::Infantry, PlayerId::ONE, 1, 1)
        .build();

    let mut map = InfluenceMap::default();
    map.update(&world, PlayerId::ONE);
    assert_eq!(map.friendly(at(1, 1)), fixed(10));
    for cell in world.grid().cells().filter(|c| c.coord() != at(1, 1)) {
        assert_eq!(map.friendly(cell.coord()), Fixed::ZERO);
    }
}

#[test]
fn influence_decays_to_zero_along_a_corridor() {
    let (world, _) = WorldBuilder::new(12, 1)
        .unit(UnitKind::Cavalry, PlayerId::TWO, 0, 0)
        .build();
    let mut map = InfluenceMap::default();
    map.update(&world, PlayerId::ONE);

    let values: Vec<Fixed> = (0..12).map(|col| map.enemy(at(col, 0))).collect();
    assert_eq!(values[0], fixed(12));
    let live = values.iter().take_while(|v| **v > Fixed::ZERO).count();
    assert_eq!(live, 8);
    for pair in values[..live].windows(2) {
        assert!(pair[0] > pair[1]);
    }
    assert!(values[live..].iter().all(|v| *v == Fixed::ZERO));
    assert!(map.is_danger_zone(at(0, 0)));
}

struct Ran(Vec<&'static str>);

fn act(name: &'static str, status: NodeStatus) -> BehaviorNode<Ran, ()> {
    BehaviorNode::action(move |ran: &mut Ran, _: &mut ()| {
        ran.0.push(name);
        status
    })
}

#[test]
fn sequence_with_false_condition_never_runs_action() {
    let tree = BehaviorNode::sequence(vec![
        BehaviorNode::condition(|_: &Ran, _: &()| false),
        act("x", NodeStatus::Success),
    ]);
    let mut ran = Ran(Vec::new());
    assert_eq!(tree.evaluate(&mut ran, &mut ()), NodeStatus::Failure);
    assert!(ran.0.is_empty());
}

#[test]
fn selector_runs_children_in_order_until_success() {
    let tree = BehaviorNode::selector(vec![
        act("fail", NodeStatus::Failure),
        act("succeed", NodeStatus::Success),
    ]);
    let mut ran = Ran(Vec::new());
    assert_eq!(tree.evaluate(&mut ran, &mut ()), NodeStatus::Success);
    assert_eq!(ran.0, vec!["fail", "succeed"]);
}
