//! Cost-aware influence map.
//!
//! Every living unit projects influence equal to its attack power scaled
//! by remaining health. Influence spreads outward by movement cost (not
//! hex distance), so it flows easily across plains, slowly over
//! mountains, and not at all across water. It fades linearly to zero at
//! the maximum propagation cost.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use tracing::debug;

use crate::grid::HexGrid;
use crate::hex::HexCoord;
use crate::math::Fixed;
use crate::unit::{PlayerId, Unit};
use crate::world::World;

/// Default maximum movement cost influence travels.
pub const DEFAULT_MAX_PROPAGATION_COST: u32 = 8;

/// Net influence below this marks a danger zone.
pub const DANGER_THRESHOLD: Fixed = Fixed::const_from_int(-5);

/// Friendly and enemy influence fields as seen by one player.
#[derive(Debug, Clone)]
pub struct InfluenceMap {
    friendly: HashMap<HexCoord, Fixed>,
    enemy: HashMap<HexCoord, Fixed>,
    max_cost: Fixed,
}

impl Default for InfluenceMap {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PROPAGATION_COST)
    }
}

impl InfluenceMap {
    /// Empty map that propagates up to `max_cost` movement points.
    ///
    /// # Panics
    ///
    /// Panics if `max_cost` is zero.
    #[must_use]
    pub fn new(max_cost: u32) -> Self {
        assert!(max_cost > 0, "influence propagation cost must be positive");
        Self {
            friendly: HashMap::new(),
            enemy: HashMap::new(),
            max_cost: Fixed::from_num(max_cost),
        }
    }

    /// Rebuild both fields from scratch from `observer`'s point of view.
    pub fn update(&mut self, world: &World, observer: PlayerId) {
        self.friendly.clear();
        self.enemy.clear();

        for unit in world.units().filter(|u| u.is_alive()) {
            let base = base_influence(unit);
            let reached = propagation_costs(world.grid(), unit.cell(), self.max_cost);
            let field = if unit.owner() == observer {
                &mut self.friendly
            } else {
                &mut self.enemy
            };
            for (coord, cost) in reached {
                let falloff = Fixed::ONE - cost / self.max_cost;
                if falloff > Fixed::ZERO {
                    *field.entry(coord).or_insert(Fixed::ZERO) += base * falloff;
                }
            }
        }

        debug!(
            %observer,
            friendly_cells = self.friendly.len(),
            enemy_cells = self.enemy.len(),
            "influence updated"
        );
    }

    /// Friendly influence at `coord`.
    #[must_use]
    pub fn friendly(&self, coord: HexCoord) -> Fixed {
        self.friendly.get(&coord).copied().unwrap_or(Fixed::ZERO)
    }

    /// Enemy influence at `coord`.
    #[must_use]
    pub fn enemy(&self, coord: HexCoord) -> Fixed {
        self.enemy.get(&coord).copied().unwrap_or(Fixed::ZERO)
    }

    /// Friendly minus enemy influence.
    #[must_use]
    pub fn net(&self, coord: HexCoord) -> Fixed {
        self.friendly(coord) - self.enemy(coord)
    }

    /// Net influence is positive.
    #[must_use]
    pub fn is_safe_zone(&self, coord: HexCoord) -> bool {
        self.net(coord) > Fixed::ZERO
    }

    /// Net influence is below [`DANGER_THRESHOLD`].
    #[must_use]
    pub fn is_danger_zone(&self, coord: HexCoord) -> bool {
        self.net(coord) < DANGER_THRESHOLD
    }

    /// Passable cell within `range` of `current` with the highest net
    /// influence. Falls back to `current` when nothing beats it.
    #[must_use]
    pub fn find_safest_nearby_cell(&self, grid: &HexGrid, current: HexCoord, range: u32) -> HexCoord {
        let mut safest = current;
        let mut best = self.net(current);
        for cell in grid.cells_in_range(current, range) {
            if !cell.is_passable() {
                continue;
            }
            let net = self.net(cell.coord());
            if net > best {
                safest = cell.coord();
                best = net;
            }
        }
        safest
    }
}

/// Attack power scaled by remaining health.
fn base_influence(unit: &Unit) -> Fixed {
    let stats = unit.stats();
    if stats.max_health == 0 {
        return Fixed::ZERO;
    }
    Fixed::from_num(stats.attack * unit.health()) / Fixed::from_num(stats.max_health)
}

/// Cheapest movement cost from `source` to every cell within `max_cost`.
///
/// Walks terrain only; units do not block influence.
fn propagation_costs(grid: &HexGrid, source: HexCoord, max_cost: Fixed) -> HashMap<HexCoord, Fixed> {
    let mut best: HashMap<HexCoord, Fixed> = HashMap::new();
    let mut open = BinaryHeap::new();

    if !grid.contains(source) {
        return best;
    }
    best.insert(source, Fixed::ZERO);
    open.push(Reverse((Fixed::ZERO, source)));

    while let Some(Reverse((cost, coord))) = open.pop() {
        if best.get(&coord).is_some_and(|&known| cost > known) {
            continue;
        }
        for neighbor in grid.neighbors(coord) {
            let Some(step) = neighbor.terrain().movement_cost() else {
                continue;
            };
            let next = cost + step;
            if next > max_cost {
                continue;
            }
            let known = best.get(&neighbor.coord()).copied().unwrap_or(Fixed::MAX);
            if next < known {
                best.insert(neighbor.coord(), next);
                open.push(Reverse((next, neighbor.coord())));
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::terrain::Terrain;
    use crate::unit::UnitStats;

    fn at(col: i32, row: i32) -> HexCoord {
        HexCoord::from_offset(col, row)
    }

    #[test]
    fn test_source_gets_full_power() {
        let mut world = World::new(HexGrid::rectangle(12, 1), RulesConfig::default());
        world
            .spawn_unit(UnitStats::infantry(), PlayerId::ONE, at(0, 0))
            .unwrap();
        let mut map = InfluenceMap::default();
        map.update(&world, PlayerId::ONE);

        assert_eq!(map.friendly(at(0, 0)), Fixed::from_num(10));
        assert_eq!(map.enemy(at(0, 0)), Fixed::ZERO);
    }

    #[test]
    fn test_linear_decay_along_plains() {
        let mut world = World::new(HexGrid::rectangle(12, 1), RulesConfig::default());
        world
            .spawn_unit(UnitStats::infantry(), PlayerId::ONE, at(0, 0))
            .unwrap();
        let mut map = InfluenceMap::default();
        map.update(&world, PlayerId::ONE);

        // 10 * (1 - 4/8)
        assert_eq!(map.friendly(at(4, 0)), Fixed::from_num(5));
        for col in 0..7 {
            assert!(map.friendly(at(col, 0)) > map.friendly(at(col + 1, 0)));
        }
        assert_eq!(map.friendly(at(8, 0)), Fixed::ZERO);
        assert_eq!(map.friendly(at(11, 0)), Fixed::ZERO);
    }

    #[test]
    fn test_costly_terrain_slows_spread() {
        let mut world = World::new(HexGrid::rectangle(6, 1), RulesConfig::default());
        world.set_terrain(at(1, 0), Terrain::Mountain).unwrap();
        world
            .spawn_unit(UnitStats::infantry(), PlayerId::ONE, at(0, 0))
            .unwrap();
        let mut map = InfluenceMap::default();
        map.update(&world, PlayerId::ONE);
        // Cost 2 to enter the mountain: 10 * (1 - 2/8)
        assert_eq!(map.friendly(at(1, 0)), Fixed::from_num(15) / Fixed::from_num(2));
    }

    #[test]
    fn test_spread_takes_cheapest_route() {
        // Row 0: source, two mountains, then plains. Row 1 is an all-plains detour.
        let mut world = World::new(HexGrid::rectangle(5, 3), RulesConfig::default());
        world.set_terrain(at(1, 0), Terrain::Mountain).unwrap();
        world.set_terrain(at(2, 0), Terrain::Mountain).unwrap();
        world
            .spawn_unit(UnitStats::infantry(), PlayerId::ONE, at(0, 0))
            .unwrap();
        let mut map = InfluenceMap::default();
        map.update(&world, PlayerId::ONE);

        // Straight along row 0 costs 2 + 2 + 1 = 5; the detour costs 4.
        assert_eq!(map.friendly(at(3, 0)), Fixed::from_num(5));
        assert_eq!(map.friendly(at(2, 1)), Fixed::from_num(25) / Fixed::from_num(4));
        assert_eq!(map.friendly(at(1, 1)), Fixed::from_num(15) / Fixed::from_num(2));
    }

    #[test]
    fn test_water_blocks_spread() {
        let mut world = World::new(HexGrid::rectangle(5, 1), RulesConfig::default());
        world.set_terrain(at(1, 0), Terrain::Water).unwrap();
        world
            .spawn_unit(UnitStats::infantry(), PlayerId::ONE, at(0, 0))
            .unwrap();
        let mut map = InfluenceMap::default();
        map.update(&world, PlayerId::ONE);
        assert_eq!(map.friendly(at(1, 0)), Fixed::ZERO);
        assert_eq!(map.friendly(at(2, 0)), Fixed::ZERO);
    }

    #[test]
    fn test_health_scales_influence() {
        let mut world = World::new(HexGrid::rectangle(5, 5), RulesConfig::default());
        let attacker = world
            .spawn_unit(UnitStats::artillery(), PlayerId::ONE, at(0, 0))
            .unwrap();
        let target = world
            .spawn_unit(UnitStats::infantry(), PlayerId::TWO, at(2, 0))
            .unwrap();
        world.attack(attacker, target).unwrap();
        // Infantry took 15 - 5 = 10 damage: 90% of 10 attack.
        let mut map = InfluenceMap::default();
        map.update(&world, PlayerId::ONE);
        assert_eq!(map.enemy(at(2, 0)), Fixed::from_num(9));
    }

    #[test]
    fn test_zones() {
        let mut world = World::new(HexGrid::rectangle(20, 3), RulesConfig::default());
        world
            .spawn_unit(UnitStats::infantry(), PlayerId::ONE, at(0, 1))
            .unwrap();
        world
            .spawn_unit(UnitStats::artillery(), PlayerId::TWO, at(19, 1))
            .unwrap();
        let mut map = InfluenceMap::default();
        map.update(&world, PlayerId::ONE);

        assert!(map.is_safe_zone(at(0, 1)));
        assert!(map.is_danger_zone(at(19, 1)));
        assert!(!map.is_safe_zone(at(10, 1)));
        assert!(!map.is_danger_zone(at(10, 1)));
    }

    #[test]
    fn test_safest_nearby_cell() {
        let mut world = World::new(HexGrid::rectangle(12, 1), RulesConfig::default());
        world
            .spawn_unit(UnitStats::artillery(), PlayerId::ONE, at(0, 0))
            .unwrap();
        let enemy = world
            .spawn_unit(UnitStats::infantry(), PlayerId::TWO, at(6, 0))
            .unwrap();
        let mut map = InfluenceMap::default();
        map.update(&world, PlayerId::ONE);

        let from = world.unit(enemy).unwrap().cell();
        let mut perspective = InfluenceMap::default();
        perspective.update(&world, PlayerId::TWO);
        // Enemy's own view: safest is further from player one's unit.
        let safest = perspective.find_safest_nearby_cell(world.grid(), from, 2);
        assert_eq!(safest, at(8, 0));

        // Nothing better than standing still when all neighbors are blocked.
        let lonely = World::new(HexGrid::rectangle(1, 1), RulesConfig::default());
        assert_eq!(
            map.find_safest_nearby_cell(lonely.grid(), at(0, 0), 3),
            at(0, 0)
        );
    }
}
