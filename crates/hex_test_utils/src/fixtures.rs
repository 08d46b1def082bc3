//! Test fixtures and helpers.
//!
//! Small boards built cell by cell, plus seeded generated matches, for
//! consistent testing across crates.

use fixed::types::I32F32;
use hex_core::config::{AiConfig, RulesConfig};
use hex_core::grid::HexGrid;
use hex_core::hex::HexCoord;
use hex_core::map_generation::{generate, MapConfig};
use hex_core::session::Session;
use hex_core::terrain::Terrain;
use hex_core::unit::{PlayerId, UnitId, UnitKind};
use hex_core::world::World;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real game code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Axial coordinate of an offset (column, row) cell.
#[must_use]
pub const fn at(col: i32, row: i32) -> HexCoord {
    HexCoord::from_offset(col, row)
}

/// All-plains world with default rules and nothing on it.
#[must_use]
pub fn plains_world(width: u32, height: u32) -> World {
    World::new(HexGrid::rectangle(width, height), RulesConfig::default())
}

/// Generated match with default rules and AI.
#[must_use]
pub fn generated_session(seed: u64) -> Session {
    let world = generate(MapConfig::default().with_seed(seed), RulesConfig::default());
    Session::new(world, AiConfig::default())
}

/// Step-by-step board setup addressed by offset coordinates.
///
/// Every method panics on an invalid placement: fixtures are expected
/// to be correct.
///
/// # Example
///
/// ```
/// use hex_core::terrain::Terrain;
/// use hex_core::unit::{PlayerId, UnitKind};
/// use hex_test_utils::fixtures::WorldBuilder;
///
/// let (world, units) = WorldBuilder::new(5, 5)
///     .terrain(2, 2, Terrain::Water)
///     .base(PlayerId::ONE, 0, 0)
///     .unit(UnitKind::Infantry, PlayerId::ONE, 1, 0)
///     .build();
/// assert_eq!(units.len(), 1);
/// assert!(world.unit(units[0]).is_some());
/// ```
#[derive(Debug)]
pub struct WorldBuilder {
    grid: HexGrid,
    rules: RulesConfig,
    bases: Vec<(PlayerId, HexCoord)>,
    units: Vec<(UnitKind, PlayerId, HexCoord)>,
    resources: Vec<HexCoord>,
}

impl WorldBuilder {
    /// All-plains board of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            grid: HexGrid::rectangle(width, height),
            rules: RulesConfig::default(),
            bases: Vec::new(),
            units: Vec::new(),
            resources: Vec::new(),
        }
    }

    /// Override the match rules.
    #[must_use]
    pub fn rules(mut self, rules: RulesConfig) -> Self {
        self.rules = rules;
        self
    }

    /// Set the terrain of one cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell is off the board.
    #[must_use]
    pub fn terrain(mut self, col: i32, row: i32, terrain: Terrain) -> Self {
        assert!(
            self.grid.set_terrain(at(col, row), terrain),
            "no cell at offset ({col}, {row})"
        );
        self
    }

    /// Surround a cell with water.
    #[must_use]
    pub fn ring_with_water(mut self, col: i32, row: i32) -> Self {
        for neighbor in at(col, row).neighbors() {
            self.grid.set_terrain(neighbor, Terrain::Water);
        }
        self
    }

    /// Register a player's base.
    #[must_use]
    pub fn base(mut self, player: PlayerId, col: i32, row: i32) -> Self {
        self.bases.push((player, at(col, row)));
        self
    }

    /// Place a unit. Ids are handed out in call order, starting at 1.
    #[must_use]
    pub fn unit(mut self, kind: UnitKind, player: PlayerId, col: i32, row: i32) -> Self {
        self.units.push((kind, player, at(col, row)));
        self
    }

    /// Place a resource node.
    #[must_use]
    pub fn resource(mut self, col: i32, row: i32) -> Self {
        self.resources.push(at(col, row));
        self
    }

    /// Build the world and return it with the ids of the placed units.
    ///
    /// # Panics
    ///
    /// Panics if any placement is rejected by the world.
    #[must_use]
    pub fn build(self) -> (World, Vec<UnitId>) {
        let mut world = World::new(self.grid, self.rules);
        for (player, coord) in self.bases {
            if let Err(err) = world.set_base(player, coord) {
                panic!("base for {player} at {coord}: {err}");
            }
        }
        for coord in self.resources {
            if let Err(err) = world.place_resource_node(coord) {
                panic!("resource node at {coord}: {err}");
            }
        }
        let ids = self
            .units
            .into_iter()
            .map(|(kind, player, coord)| match world.spawn_unit(kind.stats(), player, coord) {
                Ok(id) => id,
                Err(err) => panic!("{kind:?} for {player} at {coord}: {err}"),
            })
            .collect();
        (world, ids)
    }
}
