//! Per-unit tactical AI.
//!
//! Each unit gets a [`UnitController`] holding a fixed behavior tree:
//!
//! ```text
//! Selector
//! ├── Sequence: under threat → Defend
//! ├── Sequence: has order → Selector
//! │   ├── Sequence: order == AttackBase      → AttackBase
//! │   ├── Sequence: order == DefendZone      → DefendZone
//! │   ├── Sequence: order == GatherResources → GatherResources
//! │   └── Sequence: order == Retreat         → Retreat
//! └── Idle
//! ```
//!
//! The strategic layer writes orders; the tree turns them into at most
//! one move and one attack per turn.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::behavior::{BehaviorNode, NodeStatus};
use crate::error::GameError;
use crate::events::GameEvent;
use crate::hex::HexCoord;
use crate::math::ceil_points;
use crate::pathfinding::Pathfinder;
use crate::unit::UnitId;
use crate::world::World;

/// Health percentage below which a unit near enemies switches to defense.
const THREATENED_HEALTH_PERCENT: u32 = 70;

/// Health percentage below which a defending unit retreats.
const RETREAT_HEALTH_PERCENT: u32 = 30;

/// How far beyond attack range a defender goes to intercept.
const INTERCEPT_MARGIN: u32 = 3;

/// Outer edge of the defensive perimeter around a held cell.
const PERIMETER_RADIUS: u32 = 3;

/// A retreating unit is safe this close to its destination.
const RETREAT_ARRIVAL_DISTANCE: u32 = 2;

/// Standing order from the strategic layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Order {
    /// Nothing to do.
    #[default]
    Idle,
    /// March on the enemy base, fighting on the way.
    AttackBase,
    /// Hold an area (own base by default).
    DefendZone,
    /// Walk to the nearest resource node.
    GatherResources,
    /// Fall back to a rally point or the own base.
    Retreat,
}

impl Order {
    /// Every order.
    pub const ALL: [Order; 5] = [
        Order::Idle,
        Order::AttackBase,
        Order::DefendZone,
        Order::GatherResources,
        Order::Retreat,
    ];

    /// Canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Order::Idle => "Idle",
            Order::AttackBase => "AttackBase",
            Order::DefendZone => "DefendZone",
            Order::GatherResources => "GatherResources",
            Order::Retreat => "Retreat",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Order {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Order::ALL
            .into_iter()
            .find(|o| o.name() == s)
            .ok_or_else(|| GameError::DataParseError {
                what: "order".into(),
                message: format!("unknown order `{s}`"),
            })
    }
}

/// Per-unit blackboard the tree reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitBrain {
    /// Controlled unit.
    pub unit: UnitId,
    /// Current order.
    pub order: Order,
    /// Order target, if any.
    pub target: Option<HexCoord>,
}

impl UnitBrain {
    fn set_order(&mut self, world: &mut World, order: Order, target: Option<HexCoord>) {
        if self.order == order && self.target == target {
            return;
        }
        debug!(unit = self.unit, from = %self.order, to = %order, "order changed");
        self.order = order;
        self.target = target;
        world.record(GameEvent::OrderChanged {
            unit: self.unit,
            order: order.name().into(),
            target,
        });
    }
}

type TacticalTree = BehaviorNode<UnitBrain, World>;

/// Behavior-tree driven controller for one unit.
#[derive(Debug)]
pub struct UnitController {
    brain: UnitBrain,
    tree: TacticalTree,
}

impl UnitController {
    /// Idle controller for `unit`.
    #[must_use]
    pub fn new(unit: UnitId) -> Self {
        Self {
            brain: UnitBrain {
                unit,
                order: Order::Idle,
                target: None,
            },
            tree: build_tree(),
        }
    }

    /// Controlled unit.
    #[must_use]
    pub const fn unit_id(&self) -> UnitId {
        self.brain.unit
    }

    /// Current order.
    #[must_use]
    pub const fn order(&self) -> Order {
        self.brain.order
    }

    /// Current order target.
    #[must_use]
    pub const fn target(&self) -> Option<HexCoord> {
        self.brain.target
    }

    /// Replace the standing order.
    pub fn give_order(&mut self, order: Order, target: Option<HexCoord>) {
        self.brain.order = order;
        self.brain.target = target;
    }

    /// Evaluate the tree once. `None` if the unit no longer exists.
    pub fn execute_turn(&mut self, world: &mut World) -> Option<NodeStatus> {
        world.unit(self.brain.unit)?;
        let before = self.brain.order;
        let status = self.tree.evaluate(&mut self.brain, world);
        debug!(
            unit = self.brain.unit,
            order = %before,
            next_order = %self.brain.order,
            ?status,
            "unit turn"
        );
        Some(status)
    }
}

fn build_tree() -> TacticalTree {
    BehaviorNode::selector(vec![
        BehaviorNode::sequence(vec![
            BehaviorNode::condition(is_under_threat),
            BehaviorNode::action(defend),
        ]),
        BehaviorNode::sequence(vec![
            BehaviorNode::condition(|brain: &UnitBrain, _: &World| brain.order != Order::Idle),
            BehaviorNode::selector(vec![
                order_branch(Order::AttackBase, attack_base),
                order_branch(Order::DefendZone, defend_zone),
                order_branch(Order::GatherResources, gather_resources),
                order_branch(Order::Retreat, retreat),
            ]),
        ]),
        BehaviorNode::action(|_: &mut UnitBrain, _: &mut World| NodeStatus::Success),
    ])
}

fn order_branch(order: Order, action: fn(&mut UnitBrain, &mut World) -> NodeStatus) -> TacticalTree {
    BehaviorNode::sequence(vec![
        BehaviorNode::condition(move |brain: &UnitBrain, _: &World| brain.order == order),
        BehaviorNode::action(action),
    ])
}

fn is_under_threat(brain: &UnitBrain, world: &World) -> bool {
    let Some(unit) = world.unit(brain.unit) else {
        return false;
    };
    let near = world.enemies_within(brain.unit, unit.stats().attack_range + 1);
    !near.is_empty() && unit.health_below_percent(THREATENED_HEALTH_PERCENT)
}

/// Attack the closest enemy within `range` if allowed.
fn try_attack_closest(unit: UnitId, world: &mut World, range: u32) -> bool {
    let Some(target) = world.closest_enemy(unit, range) else {
        return false;
    };
    if !world.can_attack(unit, target) {
        return false;
    }
    world.attack(unit, target).is_ok()
}

fn attack_range(unit: UnitId, world: &World) -> u32 {
    world.unit(unit).map_or(0, |u| u.stats().attack_range)
}

/// Move once along a tactical path toward `goal`, to the farthest
/// reachable free cell the remaining budget pays for.
fn move_toward(unit: UnitId, world: &mut World, goal: HexCoord) -> bool {
    let Some(me) = world.unit(unit) else {
        return false;
    };
    if me.has_moved() || me.remaining_movement() == 0 {
        return false;
    }
    let budget = me.remaining_movement();
    let start = me.cell();
    let profile = me.stats().movement_profile();
    let threats = world.threats_against(me.owner());

    let Some(path) = Pathfinder::new(world.grid()).find_tactical_path(start, goal, &profile, &threats)
    else {
        debug!(unit, %start, %goal, "no tactical path");
        return false;
    };

    let destination = (1..path.len()).rev().find_map(|i| {
        let cell = path.cells()[i];
        let affordable = path.cost_to(i).is_some_and(|c| ceil_points(c) <= budget);
        (affordable && world.can_move_to(unit, cell)).then_some(cell)
    });

    match destination {
        Some(cell) => {
            trace!(unit, to = %cell, "advancing along tactical path");
            world.move_unit(unit, cell).is_ok()
        }
        None => false,
    }
}

fn defend(brain: &mut UnitBrain, world: &mut World) -> NodeStatus {
    let range = attack_range(brain.unit, world);
    if try_attack_closest(brain.unit, world, range) {
        return NodeStatus::Success;
    }
    let low = world
        .unit(brain.unit)
        .is_some_and(|u| u.health_below_percent(RETREAT_HEALTH_PERCENT));
    if low {
        brain.set_order(world, Order::Retreat, None);
        return NodeStatus::Success;
    }
    NodeStatus::Failure
}

fn attack_base(brain: &mut UnitBrain, world: &mut World) -> NodeStatus {
    let Some(unit) = world.unit(brain.unit) else {
        return NodeStatus::Failure;
    };
    let (cell, range) = (unit.cell(), unit.stats().attack_range);
    let Some(enemy_base) = world.base_of(unit.owner().opponent()) else {
        return NodeStatus::Failure;
    };

    if cell == enemy_base {
        brain.set_order(world, Order::Idle, None);
        return NodeStatus::Success;
    }
    if try_attack_closest(brain.unit, world, range) {
        return NodeStatus::Running;
    }
    move_toward(brain.unit, world, enemy_base);
    NodeStatus::Running
}

fn defend_zone(brain: &mut UnitBrain, world: &mut World) -> NodeStatus {
    let Some(unit) = world.unit(brain.unit) else {
        return NodeStatus::Failure;
    };
    let (cell, range, owner) = (unit.cell(), unit.stats().attack_range, unit.owner());
    let has_movement = unit.remaining_movement() > 0;
    if brain.target.is_none() {
        brain.target = world.base_of(owner);
    }

    if try_attack_closest(brain.unit, world, range) {
        return NodeStatus::Running;
    }
    if !has_movement {
        return NodeStatus::Running;
    }

    if let Some(threat) = world.closest_enemy(brain.unit, range + INTERCEPT_MARGIN) {
        if let Some(threat_cell) = world.unit(threat).map(crate::unit::Unit::cell) {
            move_toward(brain.unit, world, threat_cell);
        }
    } else if let Some(zone) = brain.target {
        let distance = cell.distance(zone);
        if distance > PERIMETER_RADIUS {
            move_toward(brain.unit, world, zone);
        } else if distance == 0 {
            // Standing on the held cell: step out toward the enemy.
            if let Some(enemy_base) = world.base_of(owner.opponent()) {
                move_toward(brain.unit, world, enemy_base);
            }
        }
    }
    NodeStatus::Running
}

fn gather_resources(brain: &mut UnitBrain, world: &mut World) -> NodeStatus {
    let Some(cell) = world.unit(brain.unit).map(crate::unit::Unit::cell) else {
        return NodeStatus::Failure;
    };
    let Some(node) = world.nearest_resource_node(brain.unit) else {
        brain.set_order(world, Order::Idle, None);
        return NodeStatus::Failure;
    };
    if cell == node {
        brain.set_order(world, Order::Idle, None);
        return NodeStatus::Success;
    }
    move_toward(brain.unit, world, node);
    NodeStatus::Running
}

fn retreat(brain: &mut UnitBrain, world: &mut World) -> NodeStatus {
    let Some(unit) = world.unit(brain.unit) else {
        return NodeStatus::Failure;
    };
    let cell = unit.cell();
    let Some(destination) = brain.target.or_else(|| world.base_of(unit.owner())) else {
        return NodeStatus::Failure;
    };
    if cell.distance(destination) <= RETREAT_ARRIVAL_DISTANCE {
        brain.set_order(world, Order::DefendZone, None);
        return NodeStatus::Success;
    }
    move_toward(brain.unit, world, destination);
    NodeStatus::Running
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::grid::HexGrid;
    use crate::terrain::Terrain;
    use crate::unit::{PlayerId, UnitStats};

    fn at(col: i32, row: i32) -> HexCoord {
        HexCoord::from_offset(col, row)
    }

    fn world(w: u32, h: u32) -> World {
        World::new(HexGrid::rectangle(w, h), RulesConfig::default())
    }

    #[test]
    fn test_order_string_roundtrip() {
        for order in Order::ALL {
            assert_eq!(order.to_string().parse::<Order>(), Ok(order));
        }
        assert!("Charge".parse::<Order>().is_err());
    }

    #[test]
    fn test_missing_unit_returns_none() {
        let mut w = world(3, 3);
        let mut controller = UnitController::new(42);
        assert_eq!(controller.execute_turn(&mut w), None);
    }

    #[test]
    fn test_idle_unit_does_nothing() {
        let mut w = world(5, 5);
        let id = w
            .spawn_unit(UnitStats::infantry(), PlayerId::ONE, at(2, 2))
            .unwrap();
        let hash = w.state_hash();
        let mut controller = UnitController::new(id);
        assert_eq!(controller.execute_turn(&mut w), Some(NodeStatus::Success));
        assert_eq!(w.state_hash(), hash);
    }

    #[test]
    fn test_attack_base_marches_and_arrives() {
        let mut w = world(8, 1);
        w.set_base(PlayerId::ONE, at(0, 0)).unwrap();
        w.set_base(PlayerId::TWO, at(7, 0)).unwrap();
        let id = w
            .spawn_unit(UnitStats::infantry(), PlayerId::ONE, at(1, 0))
            .unwrap();
        let mut controller = UnitController::new(id);
        controller.give_order(Order::AttackBase, Some(at(7, 0)));

        assert_eq!(controller.execute_turn(&mut w), Some(NodeStatus::Running));
        assert_eq!(w.unit(id).unwrap().cell(), at(5, 0));

        w.refresh_units(PlayerId::ONE);
        assert_eq!(controller.execute_turn(&mut w), Some(NodeStatus::Running));
        assert_eq!(w.unit(id).unwrap().cell(), at(7, 0));
        assert_eq!(w.winner(), Some(PlayerId::ONE));

        w.refresh_units(PlayerId::ONE);
        assert_eq!(controller.execute_turn(&mut w), Some(NodeStatus::Success));
        assert_eq!(controller.order(), Order::Idle);
    }

    #[test]
    fn test_attack_base_without_enemy_base_falls_to_idle() {
        let mut w = world(4, 4);
        let id = w
            .spawn_unit(UnitStats::infantry(), PlayerId::ONE, at(1, 1))
            .unwrap();
        let mut controller = UnitController::new(id);
        controller.give_order(Order::AttackBase, None);
        // Order branch fails, root selector falls through to Idle.
        assert_eq!(controller.execute_turn(&mut w), Some(NodeStatus::Success));
        assert_eq!(w.unit(id).unwrap().cell(), at(1, 1));
    }

    #[test]
    fn test_gather_moves_then_completes() {
        let mut w = world(6, 1);
        w.set_base(PlayerId::ONE, at(0, 0)).unwrap();
        w.place_resource_node(at(3, 0)).unwrap();
        let id = w
            .spawn_unit(UnitStats::infantry(), PlayerId::ONE, at(1, 0))
            .unwrap();
        let mut controller = UnitController::new(id);
        controller.give_order(Order::GatherResources, None);

        assert_eq!(controller.execute_turn(&mut w), Some(NodeStatus::Running));
        assert_eq!(w.unit(id).unwrap().cell(), at(3, 0));
        assert_eq!(w.resources_of(PlayerId::ONE), 110);

        w.refresh_units(PlayerId::ONE);
        assert_eq!(controller.execute_turn(&mut w), Some(NodeStatus::Success));
        assert_eq!(controller.order(), Order::Idle);
    }

    #[test]
    fn test_gather_without_nodes_goes_idle() {
        let mut w = world(4, 1);
        let id = w
            .spawn_unit(UnitStats::infantry(), PlayerId::ONE, at(0, 0))
            .unwrap();
        let mut controller = UnitController::new(id);
        controller.give_order(Order::GatherResources, None);
        // The branch fails, the idle leaf still succeeds.
        assert_eq!(controller.execute_turn(&mut w), Some(NodeStatus::Success));
        assert_eq!(controller.order(), Order::Idle);
    }

    #[test]
    fn test_retreat_arrives_and_defends() {
        let mut w = world(10, 1);
        w.set_base(PlayerId::ONE, at(0, 0)).unwrap();
        let id = w
            .spawn_unit(UnitStats::infantry(), PlayerId::ONE, at(7, 0))
            .unwrap();
        let mut controller = UnitController::new(id);
        controller.give_order(Order::Retreat, None);

        assert_eq!(controller.execute_turn(&mut w), Some(NodeStatus::Running));
        assert_eq!(w.unit(id).unwrap().cell(), at(3, 0));

        w.refresh_units(PlayerId::ONE);
        w.move_unit(id, at(2, 0)).unwrap();
        assert_eq!(controller.execute_turn(&mut w), Some(NodeStatus::Success));
        assert_eq!(controller.order(), Order::DefendZone);
        assert_eq!(controller.target(), None);
    }

    #[test]
    fn test_threatened_unit_defends() {
        let mut w = world(6, 1);
        let me = w
            .spawn_unit(UnitStats::infantry(), PlayerId::ONE, at(2, 0))
            .unwrap();
        let enemy = w
            .spawn_unit(UnitStats::artillery(), PlayerId::TWO, at(3, 0))
            .unwrap();
        // Soften our unit below 70%.
        for _ in 0..4 {
            w.refresh_units(PlayerId::TWO);
            w.attack(enemy, me).unwrap();
        }
        assert!(w.unit(me).unwrap().health_below_percent(70));

        let before = w.unit(enemy).unwrap().health();
        let mut controller = UnitController::new(me);
        assert_eq!(controller.execute_turn(&mut w), Some(NodeStatus::Success));
        assert!(w.unit(enemy).unwrap().health() < before);
    }

    #[test]
    fn test_badly_hurt_unit_without_target_retreats() {
        let mut w = world(8, 1);
        w.set_base(PlayerId::ONE, at(0, 0)).unwrap();
        let me = w
            .spawn_unit(UnitStats::infantry(), PlayerId::ONE, at(5, 0))
            .unwrap();
        let enemy = w
            .spawn_unit(UnitStats::artillery(), PlayerId::TWO, at(7, 0))
            .unwrap();
        // 10 damage per hit: 100 -> 20.
        for _ in 0..8 {
            w.refresh_units(PlayerId::TWO);
            w.attack(enemy, me).unwrap();
        }
        let mut controller = UnitController::new(me);
        controller.give_order(Order::AttackBase, None);
        // Enemy two hexes away is outside infantry range but inside range + 1.
        assert_eq!(controller.execute_turn(&mut w), Some(NodeStatus::Success));
        assert_eq!(controller.order(), Order::Retreat);
    }

    #[test]
    fn test_defend_zone_returns_to_perimeter() {
        let mut w = world(12, 1);
        w.set_base(PlayerId::ONE, at(0, 0)).unwrap();
        let id = w
            .spawn_unit(UnitStats::infantry(), PlayerId::ONE, at(8, 0))
            .unwrap();
        let mut controller = UnitController::new(id);
        controller.give_order(Order::DefendZone, None);
        assert_eq!(controller.execute_turn(&mut w), Some(NodeStatus::Running));
        assert_eq!(controller.target(), Some(at(0, 0)));
        assert_eq!(w.unit(id).unwrap().cell(), at(4, 0));
    }

    #[test]
    fn test_movement_respects_rounded_budget() {
        // Forest everywhere: 1.5 per step.
        let mut w = world(8, 1);
        for col in 0..8 {
            w.set_terrain(at(col, 0), Terrain::Forest).unwrap();
        }
        w.set_base(PlayerId::TWO, at(7, 0)).unwrap();
        let id = w
            .spawn_unit(UnitStats::artillery(), PlayerId::ONE, at(0, 0))
            .unwrap();
        let mut controller = UnitController::new(id);
        controller.give_order(Order::AttackBase, None);
        controller.execute_turn(&mut w);
        // Artillery has 3 points: two steps cost exactly 3, three would need 5.
        assert_eq!(w.unit(id).unwrap().cell(), at(2, 0));
        assert_eq!(w.unit(id).unwrap().remaining_movement(), 0);
    }
}
