//! Player-level AI: assesses the board, hands out orders, runs units and
//! decides production.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::behavior::NodeStatus;
use crate::config::AiConfig;
use crate::events::GameEvent;
use crate::hex::HexCoord;
use crate::influence::InfluenceMap;
use crate::tactical::{Order, UnitController};
use crate::unit::{PlayerId, UnitId};
use crate::waypoints::{WaypointCategory, WaypointSet};
use crate::world::World;

/// Health percentage below which a unit is pulled back.
const RETREAT_HEALTH_PERCENT: u32 = 30;

/// Aggressiveness at or above which a stronger side goes all in.
const ALL_IN_AGGRESSIVENESS: u32 = 7;

/// Gatherer quota is `units × resource_priority / 15`, a third at priority 5.
const GATHER_QUOTA_DIVISOR: usize = 15;

/// What one AI turn did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnReport {
    /// Order handed to each unit, in unit-id order.
    pub orders: Vec<(UnitId, Order)>,
    /// Tree result of each unit that acted, in unit-id order.
    pub statuses: Vec<(UnitId, NodeStatus)>,
    /// Unit produced at the end of the turn.
    pub produced: Option<UnitId>,
}

/// Running tallies while orders are handed out.
#[derive(Debug, Default)]
struct RoleCounts {
    attackers: usize,
    defenders: usize,
    gatherers: usize,
}

/// The AI brain for one player.
#[derive(Debug)]
pub struct StrategicPlanner {
    player: PlayerId,
    config: AiConfig,
    influence: InfluenceMap,
    waypoints: WaypointSet,
    controllers: BTreeMap<UnitId, UnitController>,
    turns_since_production: u32,
}

impl StrategicPlanner {
    /// Planner for `player`.
    #[must_use]
    pub fn new(player: PlayerId, config: AiConfig) -> Self {
        let influence = InfluenceMap::new(config.influence_range.max(1));
        Self {
            player,
            config,
            influence,
            waypoints: WaypointSet::new(),
            controllers: BTreeMap::new(),
            turns_since_production: 0,
        }
    }

    /// Controlled player.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Influence map as of the last turn.
    #[must_use]
    pub const fn influence(&self) -> &InfluenceMap {
        &self.influence
    }

    /// Waypoints as of the last turn.
    #[must_use]
    pub const fn waypoints(&self) -> &WaypointSet {
        &self.waypoints
    }

    /// Controller of `unit`, if it has acted under this planner.
    #[must_use]
    pub fn controller(&self, unit: UnitId) -> Option<&UnitController> {
        self.controllers.get(&unit)
    }

    /// Play one full turn for this player.
    pub fn execute_turn(&mut self, world: &mut World) -> TurnReport {
        self.refresh(world);
        let orders = self.assign_orders(world);
        let statuses = self.run_units(world);
        let produced = self.consider_production(world);
        self.turns_since_production = self.turns_since_production.saturating_add(1);

        TurnReport {
            orders,
            statuses,
            produced,
        }
    }

    /// Rebuild influence and waypoints from the current board.
    pub fn refresh(&mut self, world: &World) {
        self.influence.update(world, self.player);
        self.waypoints
            .update(world, &self.influence, self.player, self.config.rally_points);
    }

    fn assign_orders(&mut self, world: &mut World) -> Vec<(UnitId, Order)> {
        let own = world.unit_ids_of(self.player);
        self.controllers.retain(|id, _| own.binary_search(id).is_ok());
        if own.is_empty() {
            return Vec::new();
        }

        let own_count = own.len();
        let enemy_count = world
            .units()
            .filter(|u| u.owner() != self.player && u.is_alive())
            .count();
        let stronger = own_count > enemy_count;
        let needs_resources =
            world.resources_of(self.player) < self.config.low_resource_threshold;

        debug!(
            player = %self.player,
            own = own_count,
            enemy = enemy_count,
            resources = world.resources_of(self.player),
            "strategic assessment"
        );

        let mut counts = RoleCounts::default();
        let mut assigned = Vec::with_capacity(own_count);
        for id in own {
            let hurt = world
                .unit(id)
                .is_some_and(|u| u.health_below_percent(RETREAT_HEALTH_PERCENT));
            let order = self.choose_order(hurt, stronger, needs_resources, own_count, &mut counts);
            let target = self.order_target(world, order);

            let controller = self
                .controllers
                .entry(id)
                .or_insert_with(|| UnitController::new(id));
            if controller.order() != order || controller.target() != target {
                world.record(GameEvent::OrderChanged {
                    unit: id,
                    order: order.name().into(),
                    target,
                });
            }
            controller.give_order(order, target);
            assigned.push((id, order));
        }

        debug!(
            player = %self.player,
            attackers = counts.attackers,
            defenders = counts.defenders,
            gatherers = counts.gatherers,
            "orders assigned"
        );
        assigned
    }

    fn choose_order(
        &self,
        hurt: bool,
        stronger: bool,
        needs_resources: bool,
        own_count: usize,
        counts: &mut RoleCounts,
    ) -> Order {
        if hurt {
            return Order::Retreat;
        }
        if stronger && self.config.aggressiveness >= ALL_IN_AGGRESSIVENESS {
            counts.attackers += 1;
            return Order::AttackBase;
        }
        if needs_resources && counts.gatherers < self.gatherer_quota(own_count) {
            counts.gatherers += 1;
            return Order::GatherResources;
        }
        // attackers < own_count * aggressiveness / 10, in integers
        if counts.attackers * 10 < own_count * self.config.aggressiveness as usize {
            counts.attackers += 1;
            Order::AttackBase
        } else {
            counts.defenders += 1;
            Order::DefendZone
        }
    }

    /// How many units may gather at once, scaled by `resource_priority`.
    fn gatherer_quota(&self, own_count: usize) -> usize {
        own_count * self.config.resource_priority as usize / GATHER_QUOTA_DIVISOR
    }

    fn order_target(&self, world: &World, order: Order) -> Option<HexCoord> {
        let best = |category| self.waypoints.highest_priority(category).map(|w| w.cell);
        match order {
            Order::AttackBase => best(WaypointCategory::Attack),
            Order::DefendZone => best(WaypointCategory::Defense),
            Order::GatherResources => best(WaypointCategory::Resource),
            Order::Retreat => best(WaypointCategory::Rally).or_else(|| world.base_of(self.player)),
            Order::Idle => None,
        }
    }

    fn run_units(&mut self, world: &mut World) -> Vec<(UnitId, NodeStatus)> {
        let mut statuses = Vec::with_capacity(self.controllers.len());
        for (&id, controller) in &mut self.controllers {
            if let Some(status) = controller.execute_turn(world) {
                statuses.push((id, status));
            }
        }
        // Drop controllers whose unit is gone.
        self.controllers.retain(|&id, _| world.unit(id).is_some());
        statuses
    }

    fn consider_production(&mut self, world: &mut World) -> Option<UnitId> {
        world.base_of(self.player)?;
        if world.resources_of(self.player) < self.config.production_threshold
            || self.turns_since_production < self.config.production_cooldown
        {
            return None;
        }

        match world.produce_unit(self.player, self.config.production_unit) {
            Ok(id) => {
                info!(player = %self.player, unit = id, "AI produced unit");
                self.turns_since_production = 0;
                Some(id)
            }
            Err(e) => {
                warn!(player = %self.player, error = %e, "AI production failed");
                None
            }
        }
    }
}
