//! Seeded skirmish map generation.
//!
//! Produces a ready-to-play [`World`]: random terrain, two bases in
//! opposite corners, starting infantry beside each base and a handful of
//! resource nodes. The same [`MapConfig`] always yields the same world.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::RulesConfig;
use crate::grid::HexGrid;
use crate::hex::HexCoord;
use crate::terrain::Terrain;
use crate::unit::{PlayerId, UnitKind};
use crate::world::World;

/// Minimum passable neighbors guaranteed around each base.
pub const MIN_BASE_EXITS: usize = 2;

/// Resource nodes placed per map, inclusive lower and exclusive upper bound.
pub const RESOURCE_NODE_RANGE: (i32, i32) = (5, 8);

/// Map configuration for procedural generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Map width in cells.
    pub width: u32,
    /// Map height in cells.
    pub height: u32,
    /// Random seed for deterministic generation.
    pub seed: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            seed: 12345,
        }
    }
}

impl MapConfig {
    /// Map of the given size with the default seed.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Base cells for both players: top-left and bottom-right corners.
    #[must_use]
    pub const fn base_cells(&self) -> [(PlayerId, HexCoord); 2] {
        [
            (PlayerId::ONE, HexCoord::from_offset(0, 0)),
            (
                PlayerId::TWO,
                HexCoord::from_offset(self.width as i32 - 1, self.height as i32 - 1),
            ),
        ]
    }
}

/// Simple deterministic RNG for map generation.
struct MapRng {
    state: u64,
}

impl MapRng {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        }
    }

    fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(0x5_DEEC_E66D).wrapping_add(11);
        // Low bits of a power-of-two LCG cycle quickly.
        self.state >> 16
    }

    fn next_percent(&mut self) -> u64 {
        self.next() % 100
    }

    fn next_range(&mut self, min: i32, max: i32) -> i32 {
        let range = (max - min) as u64;
        if range == 0 {
            return min;
        }
        min + (self.next() % range) as i32
    }
}

/// Terrain for a percentage roll: 10% water, 20% mountain, 30% forest,
/// 40% plains.
const fn roll_terrain(percent: u64) -> Terrain {
    match percent {
        0..=9 => Terrain::Water,
        10..=29 => Terrain::Mountain,
        30..=59 => Terrain::Forest,
        _ => Terrain::Plains,
    }
}

/// Generate a populated world.
///
/// # Panics
///
/// Panics if the map is smaller than 2x2, since both bases need their
/// own corner.
#[must_use]
pub fn generate(config: MapConfig, rules: RulesConfig) -> World {
    assert!(
        config.width >= 2 && config.height >= 2,
        "map must be at least 2x2, got {}x{}",
        config.width,
        config.height
    );

    let mut rng = MapRng::new(config.seed);
    let mut grid = HexGrid::rectangle(config.width, config.height);

    let coords: Vec<HexCoord> = grid.coords().collect();
    for &coord in &coords {
        grid.set_terrain(coord, roll_terrain(rng.next_percent()));
    }

    for (_, base) in config.base_cells() {
        grid.set_terrain(base, Terrain::Plains);
        open_base_exits(&mut grid, base);
    }

    let mut world = World::new(grid, rules);
    for (player, base) in config.base_cells() {
        // Both corners exist: checked by the size assertion.
        if let Err(err) = world.set_base(player, base) {
            debug!(%player, %err, "base placement skipped");
            continue;
        }
        spawn_starting_units(&mut world, player, base);
    }

    place_resource_nodes(&mut world, &mut rng);

    info!(
        seed = config.seed,
        width = config.width,
        height = config.height,
        nodes = world.resource_nodes().len(),
        "map generated"
    );
    world
}

/// Convert impassable neighbors of `base` to plains, in direction order,
/// until at least [`MIN_BASE_EXITS`] are passable.
fn open_base_exits(grid: &mut HexGrid, base: HexCoord) {
    let mut passable = 0;
    for neighbor in base.neighbors() {
        let Some(cell) = grid.cell(neighbor) else {
            continue;
        };
        if cell.terrain().is_passable() {
            passable += 1;
        } else if passable < MIN_BASE_EXITS {
            grid.set_terrain(neighbor, Terrain::Plains);
            passable += 1;
        }
    }
}

fn spawn_starting_units(world: &mut World, player: PlayerId, base: HexCoord) {
    let mut spawned = 0;
    for neighbor in base.neighbors() {
        if spawned >= world.rules().starting_units {
            break;
        }
        let free = world
            .grid()
            .cell(neighbor)
            .is_some_and(|c| c.is_passable());
        if free && world.spawn_unit(UnitKind::Infantry.stats(), player, neighbor).is_ok() {
            spawned += 1;
        }
    }
    debug!(%player, spawned, "starting units placed");
}

fn place_resource_nodes(world: &mut World, rng: &mut MapRng) {
    let mut available: Vec<HexCoord> = world
        .grid()
        .cells()
        .filter(|c| !c.is_occupied() && !c.is_base && c.terrain() != Terrain::Water)
        .map(|c| c.coord())
        .collect();

    let count = rng.next_range(RESOURCE_NODE_RANGE.0, RESOURCE_NODE_RANGE.1);
    for _ in 0..count {
        if available.is_empty() {
            break;
        }
        let index = rng.next_range(0, available.len() as i32) as usize;
        let coord = available.remove(index);
        if world.place_resource_node(coord).is_ok() {
            debug!(%coord, "resource node placed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_map() {
        let config = MapConfig::default().with_seed(42);
        let a = generate(config, RulesConfig::default());
        let b = generate(config, RulesConfig::default());
        assert_eq!(a.state_hash(), b.state_hash());

        let terrain_a: Vec<_> = a.grid().cells().map(|c| c.terrain()).collect();
        let terrain_b: Vec<_> = b.grid().cells().map(|c| c.terrain()).collect();
        assert_eq!(terrain_a, terrain_b);
        assert_eq!(a.resource_nodes(), b.resource_nodes());
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = generate(MapConfig::default().with_seed(1), RulesConfig::default());
        let b = generate(MapConfig::default().with_seed(2), RulesConfig::default());
        let terrain_a: Vec<_> = a.grid().cells().map(|c| c.terrain()).collect();
        let terrain_b: Vec<_> = b.grid().cells().map(|c| c.terrain()).collect();
        assert_ne!(terrain_a, terrain_b);
    }

    #[test]
    fn test_bases_in_corners_on_plains() {
        let config = MapConfig::new(8, 6).with_seed(7);
        let world = generate(config, RulesConfig::default());

        let p1 = world.base_of(PlayerId::ONE).unwrap();
        let p2 = world.base_of(PlayerId::TWO).unwrap();
        assert_eq!(p1.to_offset(), (0, 0));
        assert_eq!(p2.to_offset(), (7, 5));
        for base in [p1, p2] {
            let cell = world.grid().cell(base).unwrap();
            assert_eq!(cell.terrain(), Terrain::Plains);
            assert!(cell.is_base);
        }
    }

    #[test]
    fn test_bases_have_exits_and_starting_units() {
        for seed in 0..20 {
            let world = generate(MapConfig::default().with_seed(seed), RulesConfig::default());
            for player in [PlayerId::ONE, PlayerId::TWO] {
                let base = world.base_of(player).unwrap();
                let exits = world
                    .grid()
                    .neighbors(base)
                    .into_iter()
                    .filter(|c| c.terrain().is_passable())
                    .count();
                assert!(exits >= MIN_BASE_EXITS, "seed {seed}: {exits} exits");
                assert_eq!(world.unit_count(player), 2, "seed {seed}");
                for unit in world.units_of(player) {
                    assert!(unit.cell().is_adjacent(base));
                    assert_eq!(unit.stats().kind, UnitKind::Infantry);
                }
            }
            world.validate().unwrap();
        }
    }

    #[test]
    fn test_resource_nodes_placement() {
        for seed in 0..20 {
            let world = generate(MapConfig::default().with_seed(seed), RulesConfig::default());
            let nodes = world.resource_nodes();
            assert!((5..=7).contains(&nodes.len()), "seed {seed}: {}", nodes.len());
            for node in nodes {
                let cell = world.grid().cell(node).unwrap();
                assert!(!cell.is_base);
                assert!(!cell.is_occupied());
                assert_ne!(cell.terrain(), Terrain::Water);
            }
        }
    }

    #[test]
    fn test_terrain_distribution_is_mixed() {
        let world = generate(MapConfig::new(30, 30).with_seed(99), RulesConfig::default());
        for terrain in Terrain::ALL {
            assert!(
                world.grid().cells().any(|c| c.terrain() == terrain),
                "{terrain:?} missing"
            );
        }
    }

    #[test]
    #[should_panic(expected = "at least 2x2")]
    fn test_tiny_map_rejected() {
        let _ = generate(MapConfig::new(1, 1), RulesConfig::default());
    }
}
