//! The unit registry and every rule that mutates the board.
//!
//! [`World`] owns the grid, all units, player bases and resource totals.
//! It is the only place that changes occupancy, so the link between a
//! unit and its cell always holds in both directions:
//! `cell.occupant() == Some(id)` exactly when `unit(id).cell() == cell`.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use tracing::{debug, info};

use crate::config::RulesConfig;
use crate::error::{GameError, Result};
use crate::events::GameEvent;
use crate::grid::HexGrid;
use crate::hex::HexCoord;
use crate::math::{ceil_points, Fixed};
use crate::pathfinding::{Pathfinder, Threat};
use crate::terrain::Terrain;
use crate::unit::{PlayerId, Unit, UnitId, UnitKind, UnitStats};

/// Result of a resolved attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackOutcome {
    /// Damage dealt (at least 1).
    pub damage: u32,
    /// Whether the target died and was removed.
    pub destroyed: bool,
}

/// The complete mutable state of a match, minus turn bookkeeping.
#[derive(Debug, Clone)]
pub struct World {
    grid: HexGrid,
    units: BTreeMap<UnitId, Unit>,
    next_unit_id: UnitId,
    bases: BTreeMap<PlayerId, HexCoord>,
    resources: BTreeMap<PlayerId, u32>,
    rules: RulesConfig,
    events: Vec<GameEvent>,
}

impl World {
    /// Wrap a grid with no units, bases or resources.
    #[must_use]
    pub fn new(grid: HexGrid, rules: RulesConfig) -> Self {
        Self {
            grid,
            units: BTreeMap::new(),
            next_unit_id: 1,
            bases: BTreeMap::new(),
            resources: BTreeMap::new(),
            rules,
            events: Vec::new(),
        }
    }

    /// The board.
    #[must_use]
    pub const fn grid(&self) -> &HexGrid {
        &self.grid
    }

    /// Change the terrain of one cell.
    ///
    /// Bases and units stay on passable ground, so turning an occupied
    /// or base cell into water is refused.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CellNotFound`] if the cell doesn't exist and
    /// [`GameError::CellBlocked`] if the change would strand a unit or base.
    pub fn set_terrain(&mut self, coord: HexCoord, terrain: Terrain) -> Result<()> {
        let cell = self.grid.cell(coord).ok_or(GameError::CellNotFound(coord))?;
        if !terrain.is_passable() && (cell.is_occupied() || cell.is_base) {
            return Err(GameError::CellBlocked(coord));
        }
        self.grid.set_terrain(coord, terrain);
        Ok(())
    }

    /// Active rules.
    #[must_use]
    pub const fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    // ------------------------------------------------------------------
    // Bases and resources
    // ------------------------------------------------------------------

    /// Register `coord` as `player`'s base and give the player its
    /// starting resources.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CellNotFound`] if the cell doesn't exist.
    pub fn set_base(&mut self, player: PlayerId, coord: HexCoord) -> Result<()> {
        if let Some(old) = self.bases.get(&player).copied() {
            if let Some(cell) = self.grid.cell_mut(old) {
                cell.is_base = false;
                cell.owner = None;
            }
        }
        let cell = self
            .grid
            .cell_mut(coord)
            .ok_or(GameError::CellNotFound(coord))?;
        cell.is_base = true;
        cell.owner = Some(player);
        self.bases.insert(player, coord);
        self.resources
            .entry(player)
            .or_insert(self.rules.starting_resources);
        Ok(())
    }

    /// Base of `player`, if registered.
    #[must_use]
    pub fn base_of(&self, player: PlayerId) -> Option<HexCoord> {
        self.bases.get(&player).copied()
    }

    /// Every player with a base, in id order.
    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.bases.keys().copied()
    }

    /// Place a resource node on `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CellNotFound`] if the cell doesn't exist.
    pub fn place_resource_node(&mut self, coord: HexCoord) -> Result<()> {
        let cell = self
            .grid
            .cell_mut(coord)
            .ok_or(GameError::CellNotFound(coord))?;
        cell.resource_node = true;
        Ok(())
    }

    /// All resource node cells in row-major order.
    #[must_use]
    pub fn resource_nodes(&self) -> Vec<HexCoord> {
        self.grid
            .cells()
            .filter(|c| c.resource_node)
            .map(crate::grid::Cell::coord)
            .collect()
    }

    /// Resource total of `player`.
    #[must_use]
    pub fn resources_of(&self, player: PlayerId) -> u32 {
        self.resources.get(&player).copied().unwrap_or(0)
    }

    /// Grant resources. `cell` is where they were picked up, if anywhere.
    pub fn add_resources(&mut self, player: PlayerId, amount: u32, cell: Option<HexCoord>) {
        let total = self.resources.entry(player).or_insert(0);
        *total = total.saturating_add(amount);
        debug!(%player, amount, total = *total, "resources collected");
        self.events.push(GameEvent::ResourcesCollected {
            player,
            amount,
            cell,
        });
    }

    /// Deduct resources.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InsufficientResources`] and leaves the total
    /// untouched if the player cannot pay.
    pub fn spend_resources(&mut self, player: PlayerId, amount: u32) -> Result<()> {
        let available = self.resources_of(player);
        if available < amount {
            return Err(GameError::InsufficientResources {
                required: amount,
                available,
            });
        }
        self.resources.insert(player, available - amount);
        self.events
            .push(GameEvent::ResourcesSpent { player, amount });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Units
    // ------------------------------------------------------------------

    /// Put a new unit on `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CellNotFound`] for a missing cell and
    /// [`GameError::CellBlocked`] for water or an occupied cell.
    pub fn spawn_unit(&mut self, stats: UnitStats, owner: PlayerId, coord: HexCoord) -> Result<UnitId> {
        let cell = self.grid.cell(coord).ok_or(GameError::CellNotFound(coord))?;
        if !cell.is_passable() {
            return Err(GameError::CellBlocked(coord));
        }

        let id = self.next_unit_id;
        self.next_unit_id += 1;

        let kind = stats.kind;
        self.units.insert(id, Unit::new(id, stats, owner, coord));
        self.grid.set_occupant(coord, Some(id));

        debug!(unit = id, ?kind, %owner, cell = %coord, "unit spawned");
        self.events.push(GameEvent::UnitSpawned {
            unit: id,
            kind,
            owner,
            cell: coord,
        });
        self.debug_validate();
        Ok(id)
    }

    /// Buy a unit of `kind` for `player` and place it on the first free
    /// passable cell next to the player's base.
    ///
    /// # Errors
    ///
    /// Fails if the player has no base, cannot afford the unit, or every
    /// base neighbor is blocked. Nothing is spent on failure.
    pub fn produce_unit(&mut self, player: PlayerId, kind: UnitKind) -> Result<UnitId> {
        let base = self
            .base_of(player)
            .ok_or_else(|| GameError::InvalidState(format!("{player} has no base")))?;
        let stats = kind.stats();
        let available = self.resources_of(player);
        if available < stats.cost {
            return Err(GameError::InsufficientResources {
                required: stats.cost,
                available,
            });
        }
        let spot = self
            .grid
            .neighbors(base)
            .into_iter()
            .find(|c| c.is_passable())
            .map(crate::grid::Cell::coord)
            .ok_or(GameError::CellBlocked(base))?;

        let cost = stats.cost;
        let id = self.spawn_unit(stats, player, spot)?;
        self.spend_resources(player, cost)?;
        info!(%player, unit = id, ?kind, cost, "unit produced");
        Ok(id)
    }

    /// Look up a unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Every unit, in id order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Units owned by `player`, in id order.
    pub fn units_of(&self, player: PlayerId) -> impl Iterator<Item = &Unit> {
        self.units.values().filter(move |u| u.owner() == player)
    }

    /// Ids of `player`'s units, in ascending order.
    #[must_use]
    pub fn unit_ids_of(&self, player: PlayerId) -> Vec<UnitId> {
        self.units_of(player).map(Unit::id).collect()
    }

    /// Number of units `player` owns.
    #[must_use]
    pub fn unit_count(&self, player: PlayerId) -> usize {
        self.units_of(player).count()
    }

    /// The unit standing on `coord`.
    #[must_use]
    pub fn unit_at(&self, coord: HexCoord) -> Option<&Unit> {
        self.grid
            .cell(coord)
            .and_then(crate::grid::Cell::occupant)
            .and_then(|id| self.units.get(&id))
    }

    fn get(&self, id: UnitId) -> Result<&Unit> {
        self.units.get(&id).ok_or(GameError::InvalidUnitId(id))
    }

    // ------------------------------------------------------------------
    // Movement
    // ------------------------------------------------------------------

    /// Movement cost of the cheapest route for `id` to `target`, using
    /// the unit's terrain preferences.
    #[must_use]
    pub fn path_cost(&self, id: UnitId, target: HexCoord) -> Option<Fixed> {
        let unit = self.units.get(&id)?;
        Pathfinder::new(&self.grid)
            .find_path(unit.cell(), target, &unit.stats().movement_profile())
            .map(|p| p.cost())
    }

    /// Validate a move and return the whole points it would cost.
    fn check_move(&self, id: UnitId, target: HexCoord) -> Result<u32> {
        let unit = self.get(id)?;
        if unit.has_moved() {
            return Err(GameError::MoveNotPermitted {
                unit: id,
                target,
                reason: "already moved this turn",
            });
        }
        let cell = self
            .grid
            .cell(target)
            .ok_or(GameError::CellNotFound(target))?;
        if !cell.is_passable() {
            return Err(GameError::CellBlocked(target));
        }
        let cost = self.path_cost(id, target).ok_or(GameError::MoveNotPermitted {
            unit: id,
            target,
            reason: "no path",
        })?;
        let points = ceil_points(cost);
        if points > unit.remaining_movement() {
            return Err(GameError::MoveNotPermitted {
                unit: id,
                target,
                reason: "not enough movement",
            });
        }
        Ok(points)
    }

    /// Whether `id` may move to `target` this turn.
    ///
    /// Requires a passable target, no earlier move this turn, and a path
    /// whose cost, rounded up to whole points, fits the remaining budget.
    #[must_use]
    pub fn can_move_to(&self, id: UnitId, target: HexCoord) -> bool {
        self.check_move(id, target).is_ok()
    }

    /// Move `id` to `target`, spending the rounded-up path cost.
    ///
    /// Entering a resource node credits the owner with the node yield.
    /// Returns the points spent.
    ///
    /// # Errors
    ///
    /// Any reason [`World::can_move_to`] would say no. The board is left
    /// untouched on error.
    pub fn move_unit(&mut self, id: UnitId, target: HexCoord) -> Result<u32> {
        let points = self.check_move(id, target)?;

        let unit = self.units.get_mut(&id).ok_or(GameError::InvalidUnitId(id))?;
        let from = unit.cell;
        let owner = unit.owner;
        unit.cell = target;
        unit.remaining_movement -= points;
        unit.has_moved = true;

        self.grid.set_occupant(from, None);
        self.grid.set_occupant(target, Some(id));

        debug!(unit = id, %from, to = %target, points, "unit moved");
        self.events.push(GameEvent::UnitMoved {
            unit: id,
            from,
            to: target,
            points,
        });

        if self.grid.cell(target).is_some_and(|c| c.resource_node) {
            let amount = self.rules.resource_node_yield;
            self.add_resources(owner, amount, Some(target));
        }

        self.debug_validate();
        Ok(points)
    }

    // ------------------------------------------------------------------
    // Combat
    // ------------------------------------------------------------------

    /// Whether `attacker` may attack `target` right now.
    #[must_use]
    pub fn can_attack(&self, attacker: UnitId, target: UnitId) -> bool {
        let (Some(a), Some(t)) = (self.units.get(&attacker), self.units.get(&target)) else {
            return false;
        };
        a.owner() != t.owner()
            && !a.has_attacked()
            && a.cell().distance(t.cell()) <= a.stats().attack_range
    }

    /// Damage `attacker` would deal to `target` from their current cells.
    #[must_use]
    pub fn damage_against(&self, attacker: &Unit, target: &Unit) -> u32 {
        let attack_bonus = self
            .grid
            .cell(attacker.cell())
            .map_or(0, |c| attacker.stats().affinity.attack_bonus(c.terrain()));
        let defense_bonus = self
            .grid
            .cell(target.cell())
            .map_or(0, crate::grid::Cell::defense_bonus);

        (attacker.stats().attack + attack_bonus)
            .saturating_sub(target.stats().defense + defense_bonus)
            .max(1)
    }

    /// Resolve an attack. A target reduced to zero health is removed
    /// after its cell is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::AttackNotPermitted`] (or
    /// [`GameError::InvalidUnitId`]) without changing anything.
    pub fn attack(&mut self, attacker: UnitId, target: UnitId) -> Result<AttackOutcome> {
        let damage = {
            let a = self.get(attacker)?;
            let t = self.get(target)?;
            if !self.can_attack(attacker, target) {
                return Err(GameError::AttackNotPermitted { attacker, target });
            }
            self.damage_against(a, t)
        };

        if let Some(a) = self.units.get_mut(&attacker) {
            a.has_attacked = true;
        }
        let victim = self
            .units
            .get_mut(&target)
            .ok_or(GameError::InvalidUnitId(target))?;
        let destroyed = victim.take_damage(damage);
        let remaining_health = victim.health();
        let (owner, cell) = (victim.owner(), victim.cell());

        debug!(attacker, target, damage, remaining_health, "attack resolved");
        self.events.push(GameEvent::UnitAttacked {
            attacker,
            target,
            damage,
            remaining_health,
        });

        if destroyed {
            self.grid.set_occupant(cell, None);
            self.units.remove(&target);
            info!(unit = target, %owner, %cell, "unit destroyed");
            self.events.push(GameEvent::UnitDestroyed {
                unit: target,
                owner,
                cell,
            });
        }

        self.debug_validate();
        Ok(AttackOutcome { damage, destroyed })
    }

    // ------------------------------------------------------------------
    // Turn bookkeeping and queries
    // ------------------------------------------------------------------

    /// Restore movement and clear the attack/move latches of `player`'s units.
    pub fn refresh_units(&mut self, player: PlayerId) {
        for unit in self.units.values_mut().filter(|u| u.owner() == player) {
            unit.refresh_turn();
        }
    }

    /// Every living enemy of `player` as a pathfinding threat.
    #[must_use]
    pub fn threats_against(&self, player: PlayerId) -> Vec<Threat> {
        self.units
            .values()
            .filter(|u| u.owner() != player && u.is_alive())
            .map(|u| Threat {
                cell: u.cell(),
                attack_range: u.stats().attack_range,
            })
            .collect()
    }

    /// Living enemies of `id` within `range`, in id order.
    #[must_use]
    pub fn enemies_within(&self, id: UnitId, range: u32) -> Vec<&Unit> {
        let Some(me) = self.units.get(&id) else {
            return Vec::new();
        };
        self.units
            .values()
            .filter(|u| u.owner() != me.owner() && u.is_alive())
            .filter(|u| me.cell().distance(u.cell()) <= range)
            .collect()
    }

    /// Closest enemy of `id` within `range`; lower id wins ties.
    #[must_use]
    pub fn closest_enemy(&self, id: UnitId, range: u32) -> Option<UnitId> {
        let me = self.units.get(&id)?.cell();
        self.enemies_within(id, range)
            .into_iter()
            .min_by_key(|u| (me.distance(u.cell()), u.id()))
            .map(Unit::id)
    }

    /// Closest resource node that is free or already held by `id`.
    /// Row-major order breaks distance ties.
    #[must_use]
    pub fn nearest_resource_node(&self, id: UnitId) -> Option<HexCoord> {
        let me = self.units.get(&id)?.cell();
        self.grid
            .cells()
            .filter(|c| c.resource_node)
            .filter(|c| c.occupant().map_or(true, |o| o == id))
            .min_by_key(|c| me.distance(c.coord()))
            .map(crate::grid::Cell::coord)
    }

    /// A player whose unit stands on an enemy base, if any.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.bases.iter().find_map(|(&owner, &base)| {
            self.unit_at(base)
                .map(Unit::owner)
                .filter(|&occupier| occupier != owner)
        })
    }

    /// Events recorded since the last drain.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take all recorded events.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn record(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hash of everything that affects future decisions.
    ///
    /// Two worlds with equal hashes will play out identically.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.units.len().hash(&mut hasher);
        for (id, unit) in &self.units {
            id.hash(&mut hasher);
            unit.owner().hash(&mut hasher);
            unit.cell().hash(&mut hasher);
            unit.health().hash(&mut hasher);
            unit.remaining_movement().hash(&mut hasher);
            unit.has_attacked().hash(&mut hasher);
            unit.has_moved().hash(&mut hasher);
        }

        for (player, amount) in &self.resources {
            player.hash(&mut hasher);
            amount.hash(&mut hasher);
        }

        for cell in self.grid.cells() {
            cell.coord().hash(&mut hasher);
            cell.terrain().hash(&mut hasher);
            cell.resource_node.hash(&mut hasher);
        }

        hasher.finish()
    }

    /// Check the unit/cell occupancy invariant in both directions.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] describing the first mismatch.
    #[cfg(any(test, feature = "debug-validation"))]
    pub fn validate(&self) -> Result<()> {
        for (id, unit) in &self.units {
            let occupant = self.grid.cell(unit.cell()).and_then(crate::grid::Cell::occupant);
            if occupant != Some(*id) {
                return Err(GameError::InvalidState(format!(
                    "unit {id} at {} but cell holds {occupant:?}",
                    unit.cell()
                )));
            }
            if !unit.is_alive() {
                return Err(GameError::InvalidState(format!("dead unit {id} still registered")));
            }
        }
        for cell in self.grid.cells() {
            if let Some(id) = cell.occupant() {
                match self.units.get(&id) {
                    Some(unit) if unit.cell() == cell.coord() => {}
                    _ => {
                        return Err(GameError::InvalidState(format!(
                            "cell {} claims unit {id}",
                            cell.coord()
                        )))
                    }
                }
            }
        }
        Ok(())
    }

    #[cfg(any(test, feature = "debug-validation"))]
    fn debug_validate(&self) {
        if let Err(e) = self.validate() {
            panic!("world invariant broken: {e}");
        }
    }

    #[cfg(not(any(test, feature = "debug-validation")))]
    #[allow(clippy::unused_self)]
    const fn debug_validate(&self) {}
}
